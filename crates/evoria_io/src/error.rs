//! Error types for `evoria_io`.
//!
//! Trimmed to the kinds a repository layer over an in-memory or
//! JSON-file-backed store can actually raise; no network or archival
//! format has a counterpart here.

use thiserror::Error;

/// Main error type for `evoria_io` operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system errors.
    #[error("file system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON parsing errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors (malformed or inconsistent records).
    #[error("validation error: {0}")]
    Validation(String),

    /// Not found errors.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    Context { context: String, source: Box<IoError> },
}

/// Result type alias for `evoria_io` operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context { context: context.into(), source: Box::new(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IoError::not_found("species abc");
        assert_eq!(err.to_string(), "resource not found: species abc");
    }

    #[test]
    fn error_context() {
        let err = IoError::validation("bad payload").with_context("loading species");
        assert!(err.to_string().contains("loading species"));
    }
}
