use blobbind_types::Metadata;
use bytes::Bytes;

use crate::error::StoreResult;
use crate::listing::{ListingCursor, ListingQuery, ListingSegment};
use crate::object::BlobObject;
use crate::properties::ServiceProperties;

/// The blob storage surface that trigger matching and binding need.
///
/// All implementations must satisfy these invariants:
/// - Listings are in ascending byte order of blob name.
/// - A cursor is only accepted by the query that produced it.
/// - Each call is atomic with respect to every other call.
/// - A failed call leaves the store unchanged.
pub trait BlobStore: Send + Sync {
    /// Create a container. Returns `true` if it did not exist before.
    fn create_container(&self, name: &str) -> StoreResult<bool>;

    /// Delete a container and every blob in it. Returns `true` if it
    /// existed.
    fn delete_container(&self, name: &str) -> StoreResult<bool>;

    /// Returns `true` if the container exists.
    fn container_exists(&self, name: &str) -> StoreResult<bool>;

    /// Names of all containers in ascending order.
    fn container_names(&self) -> StoreResult<Vec<String>>;

    /// Read a container's metadata.
    fn container_metadata(&self, name: &str) -> StoreResult<Metadata>;

    /// Replace a container's metadata wholesale.
    fn set_container_metadata(&self, name: &str, metadata: Metadata) -> StoreResult<()>;

    /// Create or overwrite a blob.
    ///
    /// On overwrite, content, length, ETag and last-modified are replaced.
    /// Metadata is replaced only when `metadata` is `Some`; otherwise the
    /// previous version's metadata is kept.
    fn put_object(
        &self,
        container: &str,
        name: &str,
        content: Bytes,
        metadata: Option<Metadata>,
    ) -> StoreResult<BlobObject>;

    /// Read a blob.
    fn get_object(&self, container: &str, name: &str) -> StoreResult<BlobObject>;

    /// Delete a blob. Returns `true` if it existed.
    fn delete_object(&self, container: &str, name: &str) -> StoreResult<bool>;

    /// Replace a blob's metadata wholesale, leaving its content untouched.
    fn set_metadata(&self, container: &str, name: &str, metadata: Metadata) -> StoreResult<()>;

    /// Produce one page of a listing.
    ///
    /// Pass `None` to start from the beginning, or the cursor from the
    /// previous page to continue. The cursor must have been issued for an
    /// identical `query`.
    fn list_segmented(
        &self,
        query: &ListingQuery,
        cursor: Option<&ListingCursor>,
    ) -> StoreResult<ListingSegment>;

    /// Read the account-level service properties.
    fn service_properties(&self) -> StoreResult<ServiceProperties>;

    /// Replace the account-level service properties.
    fn set_service_properties(&self, properties: ServiceProperties) -> StoreResult<()>;

    /// Drain every page of a listing.
    ///
    /// Default implementation feeds each returned cursor back into
    /// `list_segmented` until the listing is exhausted. Pages are each
    /// atomic, but the sequence as a whole is not a snapshot.
    fn list_all(&self, query: &ListingQuery) -> StoreResult<Vec<BlobObject>> {
        let mut blobs = Vec::new();
        let mut cursor = None;
        loop {
            let segment = self.list_segmented(query, cursor.as_ref())?;
            blobs.extend(segment.blobs().cloned());
            match segment.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(blobs),
            }
        }
    }
}
