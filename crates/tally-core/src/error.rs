//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Missing or invalid input, caught before the store is touched
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// Identifier that can never name a stored record
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A blocking store task was cancelled or panicked
    #[error("Task error: {0}")]
    Task(String),
}

impl Error {
    /// Validation failure attributed to a single input field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    /// Whether this error is an expected client-side outcome rather than a store failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidIdentifier(_) | Self::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
