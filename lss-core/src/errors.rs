//! Error types for sky-map and spectrum calculations.
//!
//! [`LssError`] covers the failure modes of the numerical layers: invalid
//! HEALPix resolutions, coordinates outside their domain, arrays of the wrong
//! shape, singular matrices, configuration problems and data access.
//!
//! # Error Categories
//!
//! | Variant | Use Case |
//! |---------|----------|
//! | [`InvalidResolution`](LssError::InvalidResolution) | nside not a power of two, npix not `12 nside²` |
//! | [`MathError`](LssError::MathError) | Out-of-domain angles, non-finite inputs, invalid mask weights |
//! | [`ShapeMismatch`](LssError::ShapeMismatch) | Paired arrays of different length, non-square matrices |
//! | [`Singular`](LssError::Singular) | Matrix inversion failed |
//! | [`Config`](LssError::Config) | Missing or malformed YAML sections |
//! | [`DataError`](LssError::DataError) | File I/O and parsing |
//!
//! Nothing here is recovered from inside the workspace: every error travels
//! unmodified to the caller.

use thiserror::Error;

/// Classification of mathematical errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MathErrorKind {
    /// Input value is invalid for the operation.
    InvalidInput,
    /// Result or input is NaN or infinity.
    NotFinite,
    /// Value outside valid domain (e.g. colatitude > π).
    OutOfRange,
}

#[derive(Error, Debug)]
pub enum LssError {
    #[error("Invalid HEALPix resolution: {message}")]
    InvalidResolution { message: String },

    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },

    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Singular matrix in {context}")]
    Singular { context: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data error ({file_type} - {operation}): {message}")]
    DataError {
        file_type: String,
        operation: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, LssError>`.
pub type LssResult<T> = Result<T, LssError>;

impl LssError {
    pub fn invalid_resolution(message: impl Into<String>) -> Self {
        Self::InvalidResolution {
            message: message.into(),
        }
    }

    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    pub fn shape_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }

    pub fn singular(context: &str) -> Self {
        Self::Singular {
            context: context.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn data_error(file_type: &str, operation: &str, reason: &str) -> Self {
        Self::DataError {
            file_type: file_type.to_string(),
            operation: operation.to_string(),
            message: reason.to_string(),
        }
    }

    /// Checks that two paired arrays have the same length.
    pub fn ensure_same_len(context: &str, expected: usize, actual: usize) -> LssResult<()> {
        if expected != actual {
            return Err(Self::shape_mismatch(context, expected, actual));
        }
        Ok(())
    }
}
