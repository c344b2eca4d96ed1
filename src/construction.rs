//! # Pseudorandom NB-LDPC parity check matrix construction
//!
//! This module builds random parity check matrices over GF(q) column by
//! column. Each column receives `weight` nonzero entries in distinct rows, with
//! coefficients drawn uniformly from the nonzero elements of the field. The
//! way in which rows are chosen is given by the [`FillPolicy`]:
//!
//! - [`FillPolicy::Random`] chooses the rows uniformly at random.
//! - [`FillPolicy::Balanced`] chooses the rows with the smallest weight so
//!   far, breaking ties at random, as in the MacKay-Neal construction. This
//!   keeps the row weights within one of each other.

use crate::{
    error::{Error, Result},
    gf::GaloisField,
    rand::{Rng, *},
    sparse::SparseMatrix,
};
use rand::{seq::IteratorRandom, Rng as _};

/// Row selection policy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FillPolicy {
    /// Rows are selected uniformly at random.
    #[default]
    Random,
    /// The rows with the smallest weight are selected, with random tie
    /// breaking.
    Balanced,
}

/// Construction parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Config {
    /// Codeword length N (number of columns).
    pub n: usize,
    /// Code dimension K. The matrix has N - K rows.
    pub k: usize,
    /// Column weight. Must be greater than 2.
    pub weight: usize,
    /// Field order q.
    pub q: usize,
    /// Row selection policy.
    pub fill_policy: FillPolicy,
}

impl Config {
    /// Checks that the parameters admit a valid construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMatrix`] if `n <= k`, if `weight <= 2` or if
    /// `weight` exceeds the number of rows `n - k`, and
    /// [`Error::UnsupportedField`] if GF(q) is not supported.
    pub fn check(&self) -> Result<GaloisField> {
        if self.n <= self.k {
            return Err(Error::MalformedMatrix(format!(
                "N = {} must be greater than K = {}",
                self.n, self.k
            )));
        }
        if self.weight <= 2 {
            return Err(Error::MalformedMatrix(format!(
                "column weight {} must be greater than 2",
                self.weight
            )));
        }
        if self.weight > self.n - self.k {
            return Err(Error::MalformedMatrix(format!(
                "column weight {} exceeds the number of rows {}",
                self.weight,
                self.n - self.k
            )));
        }
        GaloisField::new(self.q)
    }

    /// Runs the construction.
    ///
    /// The random `seed` is used to obtain repeatable results.
    ///
    /// # Errors
    ///
    /// See [`Config::check`].
    ///
    /// # Examples
    /// ```
    /// # use nb_ldpc::construction::{Config, FillPolicy};
    /// let conf = Config { n: 12, k: 6, weight: 3, q: 8, fill_policy: FillPolicy::Balanced };
    /// let h = conf.run(42).unwrap();
    /// assert_eq!(h.num_rows(), 6);
    /// assert!((0..12).all(|c| h.col_weight(c) == 3));
    /// ```
    pub fn run(&self, seed: u64) -> Result<SparseMatrix> {
        let field = self.check()?;
        let nrows = self.n - self.k;
        let mut h = SparseMatrix::new(nrows, self.n);
        let mut rng = Rng::seed_from_u64(seed);
        for col in 0..self.n {
            let rows = match self.fill_policy {
                FillPolicy::Random => (0..nrows).choose_multiple(&mut rng, self.weight),
                FillPolicy::Balanced => least_loaded_rows(&h, self.weight, &mut rng),
            };
            for row in rows {
                h.insert(row, col, rng.gen_range(field.nonzero_elements()));
            }
        }
        tracing::debug!(
            n = self.n,
            k = self.k,
            weight = self.weight,
            q = self.q,
            policy = ?self.fill_policy,
            seed,
            "built parity check matrix"
        );
        Ok(h)
    }
}

// Selects `count` rows of minimum weight. Rows having the weight of the last
// selected row are chosen at random.
fn least_loaded_rows(h: &SparseMatrix, count: usize, rng: &mut Rng) -> Vec<usize> {
    let mut rows = (0..h.num_rows()).collect::<Vec<_>>();
    rows.sort_unstable_by_key(|&r| h.row_weight(r));
    let cut_weight = h.row_weight(rows[count - 1]);
    let sure = rows
        .iter()
        .take_while(|&&r| h.row_weight(r) < cut_weight)
        .count();
    let tied = rows[sure..]
        .iter()
        .take_while(|&&r| h.row_weight(r) == cut_weight)
        .copied()
        .choose_multiple(rng, count - sure);
    rows.truncate(sure);
    rows.extend(tied);
    rows
}

/// Builds a random parity check matrix.
///
/// This uses [`FillPolicy::Random`]. The matrix has size `(n - k) x n`, each
/// column has exactly `weight` nonzero entries, and the coefficients are drawn
/// from the nonzero elements of GF(q).
///
/// # Errors
///
/// See [`Config::check`].
///
/// # Examples
/// ```
/// # use nb_ldpc::construction::build_parity_check_matrix;
/// # use nb_ldpc::error::Error;
/// let h = build_parity_check_matrix(6, 3, 3, 4, 0).unwrap();
/// assert_eq!(h.num_entries(), 18);
/// assert!(matches!(
///     build_parity_check_matrix(6, 3, 2, 4, 0),
///     Err(Error::MalformedMatrix(_))
/// ));
/// ```
pub fn build_parity_check_matrix(
    n: usize,
    k: usize,
    weight: usize,
    q: usize,
    seed: u64,
) -> Result<SparseMatrix> {
    Config {
        n,
        k,
        weight,
        q,
        fill_policy: FillPolicy::Random,
    }
    .run(seed)
}
