/// Errors from blob store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The named container does not exist.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// The named blob does not exist in its container.
    #[error("blob not found: {container}/{name}")]
    ObjectNotFound { container: String, name: String },

    /// A continuation cursor was presented with a different query than the
    /// one that produced it, or is otherwise unrecognised.
    #[error("invalid continuation token: {0}")]
    InvalidContinuationToken(String),

    /// An argument was rejected before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StoreError {
    pub(crate) fn object_not_found(container: &str, name: &str) -> Self {
        Self::ObjectNotFound {
            container: container.to_string(),
            name: name.to_string(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
