//! Error types for the notebridge backend.
//!
//! This module provides custom error types using `thiserror`. Every variant maps
//! onto one HTTP status class, see [`NotebridgeError::status_code`].

use thiserror::Error;

/// Errors that can occur in the notebridge service.
#[derive(Error, Debug)]
pub enum NotebridgeError {
    /// Bad or missing input, duplicate unique fields, invalid state transitions
    #[error("{0}")]
    Validation(String),

    /// Missing or wrong credentials
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Authenticated, but not allowed to touch this resource
    #[error("{0}")]
    Forbidden(String),

    /// Unknown id
    #[error("{0}")]
    NotFound(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Error checking a connection out of the pool
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Remote object store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with NotebridgeError
pub type Result<T> = std::result::Result<T, NotebridgeError>;

impl NotebridgeError {
    /// HTTP status code this error is reported with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Database(_)
            | Self::Pool(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Other(_) => 500,
        }
    }

    /// Short label for the variant, used as a metric tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "database",
            Self::Pool(_) => "pool",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }

    /// True for errors caused by the caller rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Shorthand constructors used throughout the services.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Caller may not act on the resource.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// No row with the requested id.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// True when `err` is SQLite rejecting a UNIQUE/constraint violation.
#[must_use]
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl From<anyhow::Error> for NotebridgeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
