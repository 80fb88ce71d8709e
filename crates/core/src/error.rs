//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic data failures (validation, malformed
/// fields). Transport concerns belong to the catalog fetcher.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A code was invalid (e.g. empty after trimming).
    #[error("invalid code: {0}")]
    InvalidCode(String),

    /// A field received from the backend could not be interpreted
    /// (unparseable price, stock or quantity).
    #[error("data quality: {field} {value:?}: {reason}")]
    DataQuality {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_code(msg: impl Into<String>) -> Self {
        Self::InvalidCode(msg.into())
    }

    pub fn data_quality(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataQuality {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::DataQuality { .. })
    }
}
