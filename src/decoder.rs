//! NB-LDPC message passing decoders.
//!
//! This module provides iterative message passing decoders for non-binary LDPC
//! codes over GF(q). The decoders work on the [`TannerGraph`] of the code and
//! exchange messages that are length-q vectors. Two arithmetic rules are
//! implemented in [`arithmetic`]: the sum-product algorithm (belief
//! propagation) in the probability domain, and the min-max algorithm in the
//! log domain.
//!
//! Decoding is initialized with one probability vector per variable node (see
//! [`initial_probabilities`](crate::simulation::modulation::initial_probabilities)).
//! After each iteration the hard decision on the variable node marginals is
//! checked against all the parity checks, and decoding stops as soon as they
//! are satisfied.

use crate::{
    error::{Error, Result},
    graph::TannerGraph,
};

pub mod arithmetic;
pub mod factory;
pub mod flooding;

pub use factory::DecoderImplementation;

/// Generic NB-LDPC decoder.
///
/// This trait is used to form decoder trait objects, abstracting over the
/// arithmetic used by the decoder.
pub trait LdpcDecoder: std::fmt::Debug + Send {
    /// Decodes a codeword.
    ///
    /// The parameters are the initial probability vectors of the variable
    /// nodes and the maximum number of iterations to perform. If decoding is
    /// successful, the function returns an `Ok` containing the hard decision
    /// on the decoded codeword and the number of iterations used in decoding.
    /// If decoding is not successful, the function returns an
    /// [`Error::NonConvergence`] containing the hard decision on the final
    /// marginals and the number of iterations used (which is equal to
    /// `max_iterations`).
    ///
    /// # Errors
    ///
    /// Besides [`Error::NonConvergence`], an [`Error::DimensionMismatch`] is
    /// returned before any iteration is run if the number of probability
    /// vectors differs from the codeword length, if some vector does not have
    /// length q, or if some vector has no probability mass or has negative or
    /// non-finite entries.
    fn decode(&mut self, probabilities: &[Vec<f64>], max_iterations: usize)
        -> Result<DecoderOutput>;

    /// Decodes a codeword, reporting the progress of each iteration.
    ///
    /// This works as [`LdpcDecoder::decode`], but calls `observer` after each
    /// iteration.
    fn decode_observed(
        &mut self,
        probabilities: &[Vec<f64>],
        max_iterations: usize,
        observer: &mut dyn FnMut(&IterationReport),
    ) -> Result<DecoderOutput>;
}

/// NB-LDPC decoder output.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DecoderOutput {
    /// Decoded codeword.
    ///
    /// Contains the hard decision symbols of the decoded codeword.
    pub codeword: Vec<usize>,
    /// Convergence flag.
    ///
    /// This is `true` if the codeword satisfies all the parity checks.
    pub converged: bool,
    /// Number of iterations.
    ///
    /// Number of iterations used in decoding.
    pub iterations: usize,
}

/// Progress report of a decoder iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// Iteration number, starting by 1.
    pub iteration: usize,
    /// Number of parity checks satisfied by the hard decision.
    pub satisfied_checks: usize,
    /// Sum of the absolute changes of the finite entries of the variable node
    /// marginals during this iteration.
    pub marginal_change: f64,
    /// Number of outgoing messages and marginals that could not be updated
    /// because their values degenerated (no mass, or not a number). These keep
    /// their previous values.
    pub degenerate_messages: usize,
}

/// Decodes a codeword.
///
/// Builds a decoder of the given implementation for the graph and runs it.
/// See [`LdpcDecoder::decode`].
///
/// # Errors
///
/// See [`LdpcDecoder::decode`].
///
/// # Examples
/// ```
/// # use nb_ldpc::{construction::build_parity_check_matrix, gf::GaloisField,
/// #     graph::TannerGraph, decoder::{decode, DecoderImplementation},
/// #     simulation::{channel::simulate_channel, modulation::initial_probabilities}};
/// let h = build_parity_check_matrix(6, 3, 3, 4, 0).unwrap();
/// let graph = TannerGraph::new(GaloisField::new(4).unwrap(), h).unwrap();
/// let samples = simulate_channel(6, 0.0, 0.0, 4, &mut rand::thread_rng()).unwrap();
/// let probabilities = initial_probabilities(&samples, 0.0, 4).unwrap();
/// let output = decode(&graph, &probabilities, 20, DecoderImplementation::SumProduct).unwrap();
/// assert!(output.converged);
/// assert_eq!(output.codeword, vec![0; 6]);
/// assert_eq!(output.iterations, 1);
/// ```
pub fn decode(
    graph: &TannerGraph,
    probabilities: &[Vec<f64>],
    max_iterations: usize,
    implementation: DecoderImplementation,
) -> Result<DecoderOutput> {
    implementation
        .build_decoder(graph.clone())
        .decode(probabilities, max_iterations)
}

// Message store.
//
// Holds the outgoing messages of each node of one kind. The messages of a node
// are stored contiguously, one length-q vector per slot of the node.
#[derive(Debug, Clone, PartialEq, Default)]
struct SentMessages {
    q: usize,
    per_source: Box<[Box<[f64]>]>,
}

impl SentMessages {
    fn from_degrees<I>(q: usize, degrees: I) -> SentMessages
    where
        I: Iterator<Item = usize>,
    {
        SentMessages {
            q,
            per_source: degrees
                .map(|d| vec![0.0; d * q].into_boxed_slice())
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    fn message(&self, source: usize, slot: usize) -> &[f64] {
        &self.per_source[source][slot * self.q..(slot + 1) * self.q]
    }
}

fn check_probabilities(graph: &TannerGraph, probabilities: &[Vec<f64>]) -> Result<()> {
    let q = graph.field().order();
    if probabilities.len() != graph.num_vars() {
        return Err(Error::DimensionMismatch(format!(
            "{} probability vectors given for {} variable nodes",
            probabilities.len(),
            graph.num_vars()
        )));
    }
    for (v, p) in probabilities.iter().enumerate() {
        if p.len() != q {
            return Err(Error::DimensionMismatch(format!(
                "probability vector {v} has length {} instead of {q}",
                p.len()
            )));
        }
        if p.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err(Error::DimensionMismatch(format!(
                "probability vector {v} has negative or non-finite entries"
            )));
        }
        if p.iter().sum::<f64>() <= 0.0 {
            return Err(Error::DimensionMismatch(format!(
                "probability vector {v} has no probability mass"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{gf::GaloisField, sparse::SparseMatrix};

    fn graph() -> TannerGraph {
        let h = SparseMatrix::from_dense(&ndarray::arr2(&[[1, 2, 3], [0, 1, 1]]));
        TannerGraph::new(GaloisField::new(4).unwrap(), h).unwrap()
    }

    #[test]
    fn valid_probabilities() {
        let p = vec![vec![0.25; 4], vec![1.0, 0.0, 0.0, 0.0], vec![2.0, 1.0, 0.0, 0.0]];
        assert_eq!(check_probabilities(&graph(), &p), Ok(()));
    }

    #[test]
    fn invalid_probabilities() {
        let g = graph();
        let cases = [
            vec![vec![0.25; 4]; 2],
            vec![vec![0.25; 4], vec![0.25; 4], vec![0.5; 2]],
            vec![vec![0.25; 4], vec![0.0; 4], vec![0.25; 4]],
            vec![vec![0.25; 4], vec![0.5, 0.5, -0.5, 0.5], vec![0.25; 4]],
            vec![vec![0.25; 4], vec![f64::NAN, 0.5, 0.5, 0.5], vec![0.25; 4]],
        ];
        for p in cases.iter() {
            assert!(matches!(
                check_probabilities(&g, p),
                Err(Error::DimensionMismatch(_))
            ));
        }
    }

    #[test]
    fn message_store_layout() {
        let mut store = SentMessages::from_degrees(4, [2, 1].into_iter());
        store.per_source[0][4..8].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(store.message(0, 1), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(store.message(0, 0), &[0.0; 4]);
        assert_eq!(store.message(1, 0), &[0.0; 4]);
    }
}
