//! Error types at the engine's boundaries.
//!
//! Queries never fail; only collaborators and configuration do.

use thiserror::Error;

/// Failure reported by a [`crate::UserDirectory`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("user directory rejected the session token")]
    Unauthorized,

    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    #[error("malformed user record: {0}")]
    Malformed(String),
}

/// Failure of a permission session refresh.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("failed to fetch current user: {0}")]
    Directory(#[from] DirectoryError),
}

/// Failure while loading engine configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse fallback overrides: {0}")]
    Parse(String),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
