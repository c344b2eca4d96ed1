//! Error types.
//!
//! This module contains the [`Error`] type shared by the field arithmetic,
//! graph construction, channel model and decoders, together with a
//! [`Result`] alias.

use crate::decoder::DecoderOutput;
use thiserror::Error;

/// NB-LDPC error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The additive identity was used as the operand of a multiplicative
    /// inversion (or as a divisor).
    #[error("the additive identity has no multiplicative inverse")]
    InvalidFieldOperand,
    /// The requested field order is not supported.
    ///
    /// Only binary extension fields GF(2^k) with k ≤ 16 and prime fields are
    /// supported.
    #[error("unsupported field order q = {0}")]
    UnsupportedField(usize),
    /// The parity check matrix or its construction parameters are invalid.
    #[error("malformed parity check matrix: {0}")]
    MalformedMatrix(String),
    /// The decoder inputs do not agree with the dimensions of the code.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// A numerical parameter is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An alist could not be parsed.
    #[error("invalid alist: {0}")]
    Alist(String),
    /// The decoder reached the maximum number of iterations without finding
    /// a codeword.
    ///
    /// This contains the hard decision on the final marginals, which does not
    /// satisfy all the parity checks.
    #[error("decoder did not converge after {} iterations", .0.iterations)]
    NonConvergence(DecoderOutput),
}

/// A [`Result`](std::result::Result) type with error [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
