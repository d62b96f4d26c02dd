use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A concrete blob address: a container name plus an object name.
///
/// The textual form is `container/object`, where the object name may itself
/// contain further `/` separators (`photos/2024/cat.png`). Both parts must
/// be non-empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobPath {
    container: String,
    name: String,
}

impl BlobPath {
    /// Create a path from its parts, validating that neither is empty and
    /// that the container name contains no `/`.
    pub fn new(container: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        let container = container.into();
        let name = name.into();
        if container.is_empty() {
            return Err(TypeError::InvalidPath {
                path: format!("{container}/{name}"),
                reason: "container name must not be empty".into(),
            });
        }
        if container.contains('/') {
            return Err(TypeError::InvalidPath {
                path: format!("{container}/{name}"),
                reason: "container name must not contain '/'".into(),
            });
        }
        if name.is_empty() {
            return Err(TypeError::InvalidPath {
                path: format!("{container}/{name}"),
                reason: "object name must not be empty".into(),
            });
        }
        Ok(Self { container, name })
    }

    /// Parse `container/object`, splitting at the first `/`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (container, name) = s.split_once('/').ok_or_else(|| TypeError::InvalidPath {
            path: s.to_string(),
            reason: "expected 'container/object'".into(),
        })?;
        Self::new(container, name)
    }

    /// The container part.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// The object name within the container.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobPath({self})")
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

impl FromStr for BlobPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
