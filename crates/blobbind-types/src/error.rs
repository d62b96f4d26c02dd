use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid blob path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid etag: {0}")]
    InvalidETag(String),
}
