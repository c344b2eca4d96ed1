//! NB-LDPC systematic encoder.
//!
//! This module implements a systematic encoder for NB-LDPC codes over GF(q)
//! given by an arbitrary parity check matrix H of size M x N. The encoder
//! reduces H to reduced row echelon form by Gaussian elimination with column
//! pivoting. The pivot columns hold the parity symbols, and the remaining
//! K = N - rank(H) columns hold the message symbols. Matrices that do not have
//! full rank are supported: the code dimension is then larger than N - M.
//!
//! To encode a message, the message symbols are placed in their positions and
//! each parity symbol is obtained from its row of the reduced matrix R as
//! ```text
//! x_p = - sum_{c not a pivot} R[i, c] x_c
//! ```
//! so the encoding complexity is O(N^2).

use crate::{
    error::{Error, Result},
    gf::GaloisField,
    graph::TannerGraph,
};
use ndarray::Array2;

mod gauss;

/// NB-LDPC systematic encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    field: GaloisField,
    // rows of the reduced matrix that contain a pivot
    reduced: Array2<usize>,
    pivots: Vec<usize>,
    message_positions: Vec<usize>,
}

impl Encoder {
    /// Creates the systematic encoder of the code of a Tanner graph.
    pub fn new(graph: &TannerGraph) -> Encoder {
        let field = graph.field().clone();
        let mut a = graph.h().to_dense();
        let pivots = gauss::gauss_reduction(&field, &mut a);
        let n = graph.num_vars();
        let message_positions = (0..n)
            .filter(|c| pivots.binary_search(c).is_err())
            .collect::<Vec<_>>();
        let reduced = a.slice(ndarray::s![..pivots.len(), ..]).to_owned();
        tracing::debug!(
            n,
            k = message_positions.len(),
            rank = pivots.len(),
            "built systematic encoder"
        );
        Encoder {
            field,
            reduced,
            pivots,
            message_positions,
        }
    }

    /// Returns the code dimension K (the number of message symbols).
    pub fn dimension(&self) -> usize {
        self.message_positions.len()
    }

    /// Returns the codeword length N.
    pub fn codeword_length(&self) -> usize {
        self.reduced.ncols()
    }

    /// Returns the positions of the codeword that carry the message symbols.
    pub fn message_positions(&self) -> &[usize] {
        &self.message_positions
    }

    /// Encodes a message into a codeword.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the message length is not the
    /// code dimension, and [`Error::InvalidParameter`] if some message symbol
    /// is not an element of the field.
    ///
    /// # Examples
    /// ```
    /// # use nb_ldpc::{construction::build_parity_check_matrix, encoder::Encoder,
    /// #     gf::GaloisField, graph::TannerGraph};
    /// let h = build_parity_check_matrix(20, 10, 3, 16, 0).unwrap();
    /// let graph = TannerGraph::new(GaloisField::new(16).unwrap(), h).unwrap();
    /// let encoder = Encoder::new(&graph);
    /// let message = (0..encoder.dimension()).map(|j| j % 16).collect::<Vec<_>>();
    /// let codeword = encoder.encode(&message).unwrap();
    /// assert!(graph.is_codeword(&codeword));
    /// ```
    pub fn encode(&self, message: &[usize]) -> Result<Vec<usize>> {
        if message.len() != self.dimension() {
            return Err(Error::DimensionMismatch(format!(
                "message has length {} but the code dimension is {}",
                message.len(),
                self.dimension()
            )));
        }
        if let Some(x) = message.iter().find(|&&x| !self.field.contains(x)) {
            return Err(Error::InvalidParameter(format!(
                "message symbol {x} is not an element of GF({})",
                self.field.order()
            )));
        }
        let mut codeword = vec![0; self.codeword_length()];
        for (&pos, &x) in self.message_positions.iter().zip(message.iter()) {
            codeword[pos] = x;
        }
        for (row, &pivot) in self.reduced.rows().into_iter().zip(self.pivots.iter()) {
            let sum = self
                .message_positions
                .iter()
                .fold(0, |acc, &c| self.field.add(acc, self.field.mul(row[c], codeword[c])));
            codeword[pivot] = self.field.neg(sum);
        }
        Ok(codeword)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        construction::build_parity_check_matrix,
        rand::{Rng, SeedableRng},
        sparse::SparseMatrix,
    };
    use rand::Rng as _;

    #[test]
    fn encode_binary() {
        let h = SparseMatrix::from_dense(&ndarray::arr2(&[
            [1, 0, 1, 1, 1, 0, 1, 0, 1],
            [1, 1, 0, 0, 1, 1, 0, 1, 0],
            [1, 1, 1, 0, 0, 1, 1, 0, 1],
        ]));
        let graph = TannerGraph::new(GaloisField::new(2).unwrap(), h).unwrap();
        let encoder = Encoder::new(&graph);
        assert_eq!(encoder.dimension(), 6);
        assert_eq!(encoder.message_positions(), &[3, 4, 5, 6, 7, 8]);
        let codeword = encoder.encode(&[1, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(codeword, vec![1, 1, 0, 1, 0, 0, 0, 0, 0]);
        assert!(graph.is_codeword(&codeword));
    }

    #[test]
    fn encode_random() {
        for &(n, k, q) in &[(12, 6, 4), (30, 15, 8), (20, 8, 7)] {
            let h = build_parity_check_matrix(n, k, 3, q, 11).unwrap();
            let graph = TannerGraph::new(GaloisField::new(q).unwrap(), h).unwrap();
            let encoder = Encoder::new(&graph);
            assert!(encoder.dimension() >= k);
            let mut rng = Rng::seed_from_u64(1);
            for _ in 0..10 {
                let message = (0..encoder.dimension())
                    .map(|_| rng.gen_range(0..q))
                    .collect::<Vec<_>>();
                let codeword = encoder.encode(&message).unwrap();
                assert!(graph.is_codeword(&codeword));
                for (&pos, &x) in encoder.message_positions().iter().zip(message.iter()) {
                    assert_eq!(codeword[pos], x);
                }
            }
        }
    }

    #[test]
    fn rank_deficient() {
        // The second row is 2 times the first row.
        let h = SparseMatrix::from_dense(&ndarray::arr2(&[[0, 1, 2, 3], [0, 2, 3, 1], [1, 0, 0, 1]]));
        let graph = TannerGraph::new(GaloisField::new(4).unwrap(), h).unwrap();
        let encoder = Encoder::new(&graph);
        assert_eq!(encoder.dimension(), 2);
        assert_eq!(encoder.message_positions(), &[2, 3]);
        for message in [[1, 0], [0, 1], [3, 2]] {
            assert!(graph.is_codeword(&encoder.encode(&message).unwrap()));
        }
    }

    #[test]
    fn invalid_messages() {
        let h = build_parity_check_matrix(12, 6, 3, 4, 0).unwrap();
        let graph = TannerGraph::new(GaloisField::new(4).unwrap(), h).unwrap();
        let encoder = Encoder::new(&graph);
        let k = encoder.dimension();
        assert!(matches!(
            encoder.encode(&vec![0; k + 1]),
            Err(Error::DimensionMismatch(_))
        ));
        let mut message = vec![0; k];
        message[0] = 4;
        assert!(matches!(
            encoder.encode(&message),
            Err(Error::InvalidParameter(_))
        ));
    }
}
