//! KV store error types

use thiserror::Error;

/// Result type alias for KV store operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Errors specific to KV store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KvError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Key expired: {0}")]
    KeyExpired(String),

    #[error("Type mismatch for key {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl KvError {
    /// Returns true if the key was never present (or already reclaimed)
    pub fn is_not_found(&self) -> bool {
        matches!(self, KvError::KeyNotFound(_))
    }

    /// Returns true if the key is present but its TTL has passed
    pub fn is_expired(&self) -> bool {
        matches!(self, KvError::KeyExpired(_))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, KvError::TypeMismatch { .. })
    }
}
