//! Error types for gateway and schema manager operations.
//!
//! Validation failures (bad ids, bad descriptors) are kept apart from
//! failures reported by the database driver, so callers can tell "nothing
//! was sent" from "the engine refused".

use rowgate_core::ValidationError;
use thiserror::Error;

/// Errors that can occur during gateway and schema manager operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Row id is not a positive integer. No statement was issued.
    #[error("invalid row id {0}: must be a positive integer")]
    InvalidId(i64),

    /// The database driver reported a failure.
    #[error("database error: {0}")]
    Driver(#[from] rusqlite::Error),

    /// One or more table descriptors failed validation.
    #[error("invalid table descriptor: {}", join_errors(.0))]
    InvalidSchema(Vec<ValidationError>),

    /// A value read from the database could not be represented.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// A live table cannot be brought to its declared shape without
    /// destructive changes.
    #[error("cannot converge table {table}: {message}")]
    Convergence { table: String, message: String },
}

impl GatewayError {
    /// Returns `true` for errors raised before any statement was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidId(_) | GatewayError::InvalidSchema(_)
        )
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`GatewayError`].
pub type Result<T> = std::result::Result<T, GatewayError>;
