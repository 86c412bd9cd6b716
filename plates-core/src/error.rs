//! Error types for the plates record store

use thiserror::Error;

/// Result type alias using plates' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the plates crates
#[derive(Debug, Error)]
pub enum Error {
    // ============ Configuration Errors ============
    /// Store coordinates are missing or unusable
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ Record Errors ============
    /// Record rejected before reaching the store
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // ============ Store Errors ============
    /// Write rejected because the file changed since it was read
    #[error("Conflict writing {path}: {message}")]
    Conflict {
        /// Path of the file that was being written
        path: String,
        /// Diagnostic text returned by the store
        message: String,
    },

    /// Store answered with a non-success status
    #[error("Store error {status}: {message}")]
    Store {
        /// HTTP status code
        status: u16,
        /// Diagnostic text returned by the store
        message: String,
    },

    // ============ Transport Errors ============
    /// HTTP request failed before a store response was obtained
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ============ Decoding Errors ============
    /// Store payload could not be turned into text or a record
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 transport encoding was malformed
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ============ System Errors ============
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============ Generic Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new conflict error
    pub fn conflict(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store(status: u16, message: impl Into<String>) -> Self {
        Self::Store {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a version mismatch on write
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if this error happened before the store produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Status code reported by the store, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Store { status, .. } => Some(*status),
            Self::Conflict { .. } => Some(409),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_distinct_from_store_error() {
        let conflict = Error::conflict("plates/AB12CDE.json", "sha mismatch");
        let store = Error::store(422, "sha wasn't supplied");

        assert!(conflict.is_conflict());
        assert!(!store.is_conflict());
        assert_eq!(store.status(), Some(422));
        assert!(!store.is_transport());
    }

    #[test]
    fn test_error_display() {
        let err = Error::store(500, "boom");
        assert_eq!(err.to_string(), "Store error 500: boom");
    }
}
