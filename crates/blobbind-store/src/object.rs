use blobbind_types::{BlobPath, ETag, Metadata, TypeError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System properties maintained by the store for every blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobProperties {
    /// Size of the content in bytes.
    pub content_length: u64,
    /// Changes on every successful write.
    pub etag: ETag,
    /// Time of the last successful write.
    pub last_modified: DateTime<Utc>,
}

/// A stored blob: its address, content, system properties and metadata.
///
/// Blobs are returned by value. A `BlobObject` is a snapshot of one version;
/// later writes to the same name do not affect it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobObject {
    /// Name of the owning container.
    pub container: String,
    /// `/`-separated name within the container.
    pub name: String,
    /// The blob content.
    pub content: Bytes,
    /// Store-maintained properties.
    pub properties: BlobProperties,
    /// User metadata.
    pub metadata: Metadata,
}

impl BlobObject {
    /// The `container/name` address of this blob.
    pub fn path(&self) -> Result<BlobPath, TypeError> {
        BlobPath::new(self.container.as_str(), self.name.as_str())
    }

    /// Content length in bytes.
    pub fn len(&self) -> u64 {
        self.properties.content_length
    }

    /// Returns `true` if the blob has no content.
    pub fn is_empty(&self) -> bool {
        self.properties.content_length == 0
    }

    /// The blob's current ETag.
    pub fn etag(&self) -> ETag {
        self.properties.etag
    }
}
