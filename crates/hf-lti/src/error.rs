//! Error types for LTI analysis operations.

use thiserror::Error;

/// Result type for LTI analysis operations.
pub type LtiResult<T> = Result<T, LtiError>;

/// Errors that can occur while building or analyzing transfer functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LtiError {
    /// Invalid argument provided to an analysis function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Polynomial coefficients are unusable (empty, non-finite, all zero).
    #[error("Invalid polynomial: {what}")]
    InvalidPolynomial { what: String },

    /// Numerator degree exceeds denominator degree.
    #[error("Improper transfer function: numerator degree {num_degree} > denominator degree {den_degree}")]
    Improper {
        num_degree: usize,
        den_degree: usize,
    },

    /// A denominator (or magnitude) vanishes where a finite value is required.
    #[error("Degenerate model: {what}")]
    Degenerate { what: String },

    /// Lower-level numeric failure.
    #[error(transparent)]
    Numeric(#[from] hf_core::HfError),
}
