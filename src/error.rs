//! Error types for Proyectar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Proyectar operations.
///
/// Provides detailed context about failures including dimension mismatches,
/// invalid hyperparameters and singular normal-equation systems.
///
/// # Examples
///
/// ```
/// use proyectar::error::ProyectarError;
///
/// let err = ProyectarError::DimensionMismatch {
///     expected: "4x4".to_string(),
///     actual: "4x3".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum ProyectarError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A least-squares system was singular (non-invertible).
    SingularSystem {
        /// Which solve failed
        context: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for ProyectarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProyectarError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            ProyectarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            ProyectarError::SingularSystem { context } => {
                write!(f, "Singular system: {context}")
            }
            ProyectarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ProyectarError {}

impl From<&str> for ProyectarError {
    fn from(msg: &str) -> Self {
        ProyectarError::Other(msg.to_string())
    }
}

impl From<String> for ProyectarError {
    fn from(msg: String) -> Self {
        ProyectarError::Other(msg)
    }
}

impl ProyectarError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for ProyectarError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, ProyectarError>;
