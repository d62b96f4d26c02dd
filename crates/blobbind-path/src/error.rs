//! Error types for path template operations.

use blobbind_types::TypeError;
use thiserror::Error;

/// Errors that can occur while compiling, describing or resolving templates.
///
/// A template that does not match a blob is not an error; matching returns
/// `None` in that case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The pattern is syntactically or semantically invalid.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The same parameter name (ignoring case) was declared twice.
    #[error("duplicate binding parameter: {name}")]
    DuplicateParameter { name: String },

    /// A resolution template references a capture or metadata key that the
    /// triggering blob does not provide.
    #[error("no value for named parameter '{name}'")]
    UnresolvedBindingParameter { name: String },

    /// The fully substituted path is not a valid `container/object` path.
    #[error(transparent)]
    InvalidPath(#[from] TypeError),
}

impl PathError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for template operations.
pub type Result<T> = std::result::Result<T, PathError>;
