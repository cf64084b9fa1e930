//! Service Layer Error Types
//!
//! Controller operations fail with `ControllerError`: storage failures are
//! wrapped unchanged, credential failures get their own variants. A rejected
//! login is not an error (see `LoginOutcome`).

use crate::db::DatabaseError;
use thiserror::Error;

/// Controller operation errors
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Storage adapter or data context failure
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// A mandatory argument was absent or empty
    #[error("Parameter {name} is required")]
    MissingParameter { name: &'static str },

    /// Secret hashing or verification could not run
    #[error("Hashing failed: {0}")]
    Hashing(String),

    /// Token could not be issued or is invalid
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ControllerError {
    /// Create a missing parameter error
    pub fn missing_parameter(name: &'static str) -> Self {
        Self::MissingParameter { name }
    }

    /// Create a hashing error
    pub fn hashing(reason: impl Into<String>) -> Self {
        Self::Hashing(reason.into())
    }

    /// Whether the failure was caused by the caller's input
    ///
    /// The HTTP layer answers these with 400 instead of 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. }
                | Self::Database(
                    DatabaseError::MissingParameter { .. }
                        | DatabaseError::UnknownField { .. }
                        | DatabaseError::MissingField { .. }
                        | DatabaseError::InvalidValue { .. }
                )
        )
    }
}
