use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use blobbind_types::{ETag, Metadata};
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::listing::{build_page, ListingCursor, ListingQuery, ListingSegment};
use crate::object::{BlobObject, BlobProperties};
use crate::properties::ServiceProperties;
use crate::traits::BlobStore;

#[derive(Default)]
struct Container {
    metadata: Metadata,
    objects: BTreeMap<String, BlobObject>,
}

struct StoreState {
    containers: BTreeMap<String, Container>,
    last_etag: ETag,
    service_properties: ServiceProperties,
}

/// In-memory, `BTreeMap`-based blob store.
///
/// Intended for tests and embedding. All state lives behind one `RwLock`;
/// every operation completes within a single acquisition and never blocks
/// on anything else while holding it. Blobs are cloned on read, content is
/// shared (`Bytes`).
pub struct InMemoryBlobStore {
    state: RwLock<StoreState>,
    config: StoreConfig,
}

impl InMemoryBlobStore {
    /// Create a new empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: RwLock::new(StoreState {
                containers: BTreeMap::new(),
                last_etag: ETag::from_sequence(0),
                service_properties: ServiceProperties::default(),
            }),
            config,
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of blobs in a container, or `None` if it does not exist.
    pub fn object_count(&self, container: &str) -> Option<usize> {
        self.read()
            .containers
            .get(container)
            .map(|entry| entry.objects.len())
    }

    /// Total number of blobs across all containers.
    pub fn len(&self) -> usize {
        self.read()
            .containers
            .values()
            .map(|entry| entry.objects.len())
            .sum()
    }

    /// Returns `true` if the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every mutation validates before it writes, so a panicking holder can
    // never leave half-applied state behind; poisoning is safe to ignore.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn page_size(&self, query: &ListingQuery) -> StoreResult<usize> {
        match query.max_results {
            None => Ok(self.config.max_page_size),
            Some(0) => Err(StoreError::InvalidArgument(
                "max_results must be at least 1".into(),
            )),
            Some(n) if n > self.config.max_page_size => Err(StoreError::InvalidArgument(format!(
                "max_results {n} exceeds the limit of {}",
                self.config.max_page_size
            ))),
            Some(n) => Ok(n),
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn create_container(&self, name: &str) -> StoreResult<bool> {
        let mut state = self.write();
        if state.containers.contains_key(name) {
            return Ok(false);
        }
        state.containers.insert(name.to_string(), Container::default());
        debug!(container = %name, "created container");
        Ok(true)
    }

    fn delete_container(&self, name: &str) -> StoreResult<bool> {
        let existed = self.write().containers.remove(name).is_some();
        if existed {
            debug!(container = %name, "deleted container");
        }
        Ok(existed)
    }

    fn container_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.read().containers.contains_key(name))
    }

    fn container_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.read().containers.keys().cloned().collect())
    }

    fn container_metadata(&self, name: &str) -> StoreResult<Metadata> {
        self.read()
            .containers
            .get(name)
            .map(|entry| entry.metadata.clone())
            .ok_or_else(|| StoreError::ContainerNotFound(name.to_string()))
    }

    fn set_container_metadata(&self, name: &str, metadata: Metadata) -> StoreResult<()> {
        let mut state = self.write();
        let entry = state
            .containers
            .get_mut(name)
            .ok_or_else(|| StoreError::ContainerNotFound(name.to_string()))?;
        entry.metadata = metadata;
        Ok(())
    }

    fn put_object(
        &self,
        container: &str,
        name: &str,
        content: Bytes,
        metadata: Option<Metadata>,
    ) -> StoreResult<BlobObject> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument("blob name must not be empty".into()));
        }

        let mut guard = self.write();
        let state = &mut *guard;
        let entry = state
            .containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let metadata = match metadata {
            Some(metadata) => metadata,
            None => entry
                .objects
                .get(name)
                .map(|previous| previous.metadata.clone())
                .unwrap_or_default(),
        };

        state.last_etag = state.last_etag.next();
        let blob = BlobObject {
            container: container.to_string(),
            name: name.to_string(),
            properties: BlobProperties {
                content_length: content.len() as u64,
                etag: state.last_etag,
                last_modified: Utc::now(),
            },
            content,
            metadata,
        };
        entry.objects.insert(name.to_string(), blob.clone());

        debug!(
            container = %container,
            blob = %name,
            etag = %blob.properties.etag,
            size = blob.properties.content_length,
            "put blob"
        );
        Ok(blob)
    }

    fn get_object(&self, container: &str, name: &str) -> StoreResult<BlobObject> {
        let state = self.read();
        let entry = state
            .containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        entry
            .objects
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::object_not_found(container, name))
    }

    fn delete_object(&self, container: &str, name: &str) -> StoreResult<bool> {
        let mut state = self.write();
        let entry = state
            .containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        Ok(entry.objects.remove(name).is_some())
    }

    fn set_metadata(&self, container: &str, name: &str, metadata: Metadata) -> StoreResult<()> {
        let mut state = self.write();
        let blob = state
            .containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?
            .objects
            .get_mut(name)
            .ok_or_else(|| StoreError::object_not_found(container, name))?;
        blob.metadata = metadata;
        Ok(())
    }

    fn list_segmented(
        &self,
        query: &ListingQuery,
        cursor: Option<&ListingCursor>,
    ) -> StoreResult<ListingSegment> {
        let page_size = self.page_size(query)?;
        let (container, prefix) = query.target()?;
        if let Some(cursor) = cursor {
            if let Err(e) = cursor.validate(query) {
                warn!(container = %container, prefix = %prefix, error = %e, "rejected listing cursor");
                return Err(e);
            }
        }

        let state = self.read();
        let entry = state
            .containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let after = cursor.map(ListingCursor::last_key);
        let start = match after {
            Some(last) => Bound::Excluded(last),
            None => Bound::Included(prefix),
        };
        let blobs = entry
            .objects
            .range::<str, _>((start, Bound::Unbounded))
            .map(|(_, blob)| blob)
            .take_while(|blob| blob.name.starts_with(prefix));

        let segment = build_page(query, container, prefix, blobs, after, page_size);
        debug!(
            container = %container,
            prefix = %prefix,
            flat = query.flat,
            items = segment.items.len(),
            more = segment.next_cursor.is_some(),
            "listed segment"
        );
        Ok(segment)
    }

    fn service_properties(&self) -> StoreResult<ServiceProperties> {
        Ok(self.read().service_properties.clone())
    }

    fn set_service_properties(&self, properties: ServiceProperties) -> StoreResult<()> {
        self.write().service_properties = properties;
        debug!("replaced service properties");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("InMemoryBlobStore")
            .field("container_count", &state.containers.len())
            .field(
                "object_count",
                &state
                    .containers
                    .values()
                    .map(|entry| entry.objects.len())
                    .sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingItem;
    use crate::properties::{CorsRule, LoggingProperties, RetentionPolicy};
    use proptest::prelude::*;

    fn meta(pairs: &[(&str, &str)]) -> Metadata {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    fn store_with(container: &str, names: &[&str]) -> InMemoryBlobStore {
        let store = InMemoryBlobStore::new();
        store.create_container(container).unwrap();
        for name in names {
            store
                .put_object(container, name, Bytes::from_static(b"x"), None)
                .unwrap();
        }
        store
    }

    fn drain(store: &InMemoryBlobStore, query: &ListingQuery) -> (Vec<String>, usize) {
        let mut keys = Vec::new();
        let mut pages = 0;
        let mut cursor: Option<ListingCursor> = None;
        loop {
            let segment = store.list_segmented(query, cursor.as_ref()).unwrap();
            pages += 1;
            if let Some(max) = query.max_results {
                assert!(segment.items.len() <= max);
            }
            keys.extend(segment.items.iter().map(|i| i.key().to_string()));
            match segment.next_cursor {
                Some(next) => cursor = Some(next),
                None => return (keys, pages),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Containers
    // -----------------------------------------------------------------------

    #[test]
    fn create_container_is_idempotent() {
        let store = InMemoryBlobStore::new();
        assert!(store.create_container("c").unwrap());
        assert!(!store.create_container("c").unwrap());
        assert!(store.container_exists("c").unwrap());
    }

    #[test]
    fn container_names_are_case_sensitive() {
        let store = InMemoryBlobStore::new();
        store.create_container("Data").unwrap();
        store.create_container("data").unwrap();
        assert_eq!(store.container_names().unwrap(), vec!["Data", "data"]);
    }

    #[test]
    fn delete_container_reports_existence() {
        let store = store_with("c", &["a"]);
        assert!(store.delete_container("c").unwrap());
        assert!(!store.delete_container("c").unwrap());
        assert!(matches!(
            store.get_object("c", "a"),
            Err(StoreError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn container_metadata_round_trips() {
        let store = store_with("c", &[]);
        store
            .set_container_metadata("c", meta(&[("Owner", "ops")]))
            .unwrap();
        let read = store.container_metadata("c").unwrap();
        assert_eq!(read.get("owner").map(String::as_str), Some("ops"));
        assert!(store.container_metadata("missing").is_err());
    }

    // -----------------------------------------------------------------------
    // Blobs
    // -----------------------------------------------------------------------

    #[test]
    fn put_requires_container() {
        let store = InMemoryBlobStore::new();
        let err = store
            .put_object("missing", "a", Bytes::new(), None)
            .unwrap_err();
        assert_eq!(err, StoreError::ContainerNotFound("missing".into()));
        assert!(store.is_empty());
    }

    #[test]
    fn put_rejects_empty_name() {
        let store = store_with("c", &[]);
        let err = store.put_object("c", "", Bytes::new(), None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn put_and_get() {
        let store = store_with("c", &[]);
        let put = store
            .put_object("c", "dir/a.txt", Bytes::from_static(b"hello"), Some(meta(&[("m1", "v1")])))
            .unwrap();
        let got = store.get_object("c", "dir/a.txt").unwrap();
        assert_eq!(put, got);
        assert_eq!(got.len(), 5);
        assert_eq!(got.content, Bytes::from_static(b"hello"));
        assert_eq!(got.metadata.get("M1").map(String::as_str), Some("v1"));
        assert_eq!(got.path().unwrap().to_string(), "c/dir/a.txt");
    }

    #[test]
    fn overwrite_changes_etag_and_keeps_metadata() {
        let store = store_with("c", &[]);
        let first = store
            .put_object("c", "a", Bytes::from_static(b"one"), Some(meta(&[("k", "v")])))
            .unwrap();
        let second = store
            .put_object("c", "a", Bytes::from_static(b"three"), None)
            .unwrap();
        assert_ne!(first.etag(), second.etag());
        assert!(second.etag() > first.etag());
        assert_eq!(second.len(), 5);
        assert_eq!(second.metadata, first.metadata);
        assert_eq!(store.object_count("c"), Some(1));
    }

    #[test]
    fn overwrite_with_metadata_replaces_it() {
        let store = store_with("c", &[]);
        store
            .put_object("c", "a", Bytes::new(), Some(meta(&[("old", "1")])))
            .unwrap();
        let blob = store
            .put_object("c", "a", Bytes::new(), Some(meta(&[("new", "2")])))
            .unwrap();
        assert!(blob.metadata.get("old").is_none());
        assert_eq!(blob.metadata.get("new").map(String::as_str), Some("2"));
    }

    #[test]
    fn get_missing_blob() {
        let store = store_with("c", &[]);
        let err = store.get_object("c", "nope").unwrap_err();
        assert_eq!(
            err,
            StoreError::ObjectNotFound {
                container: "c".into(),
                name: "nope".into()
            }
        );
        assert!(matches!(
            store.get_object("x", "nope"),
            Err(StoreError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn blob_names_are_case_sensitive() {
        let store = store_with("c", &["Blob"]);
        assert!(store.get_object("c", "blob").is_err());
        assert!(store.get_object("c", "Blob").is_ok());
    }

    #[test]
    fn set_metadata_replaces_wholesale() {
        let store = store_with("c", &["a"]);
        let before = store.get_object("c", "a").unwrap();
        store.set_metadata("c", "a", meta(&[("x", "1")])).unwrap();
        let after = store.get_object("c", "a").unwrap();
        assert_eq!(after.metadata, meta(&[("X", "1")]));
        assert_eq!(after.content, before.content);

        let err = store.set_metadata("c", "missing", Metadata::new()).unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound { .. }));
    }

    #[test]
    fn delete_object() {
        let store = store_with("c", &["a"]);
        assert!(store.delete_object("c", "a").unwrap());
        assert!(!store.delete_object("c", "a").unwrap());
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[test]
    fn paging_yields_every_blob_once_in_order() {
        let names: Vec<String> = (1..=10).map(|i| format!("b{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let store = store_with("c", &refs);

        let query = ListingQuery::container("c").with_max_results(3);
        let (keys, pages) = drain(&store, &query);

        let mut expected = names.clone();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(pages, 4);
    }

    #[test]
    fn cursor_with_changed_prefix_is_rejected() {
        let store = store_with("c", &["a1", "a2", "a3", "b1"]);
        let query = ListingQuery::container("c").with_prefix("a").with_max_results(1);
        let first = store.list_segmented(&query, None).unwrap();
        let cursor = first.next_cursor.unwrap();

        let changed = ListingQuery::container("c").with_prefix("b").with_max_results(1);
        let err = store.list_segmented(&changed, Some(&cursor)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidContinuationToken(_)));
    }

    #[test]
    fn cursor_with_changed_mode_or_bound_is_rejected() {
        let store = store_with("c", &["a", "b", "c"]);
        let query = ListingQuery::container("c").with_max_results(1);
        let cursor = store.list_segmented(&query, None).unwrap().next_cursor.unwrap();

        let hierarchical = query.clone().hierarchical();
        assert!(store.list_segmented(&hierarchical, Some(&cursor)).is_err());
        let bigger = ListingQuery::container("c").with_max_results(2);
        assert!(store.list_segmented(&bigger, Some(&cursor)).is_err());
        let other_container = ListingQuery::container("d").with_max_results(1);
        assert!(store.list_segmented(&other_container, Some(&cursor)).is_err());
    }

    #[test]
    fn flat_listing_filters_by_prefix() {
        let store = store_with("c", &["logs/a", "logs/b/c", "logz", "other"]);
        let query = ListingQuery::container("c").with_prefix("logs/");
        let segment = store.list_segmented(&query, None).unwrap();
        let keys: Vec<&str> = segment.items.iter().map(ListingItem::key).collect();
        assert_eq!(keys, vec!["logs/a", "logs/b/c"]);
        assert!(segment.next_cursor.is_none());
    }

    #[test]
    fn hierarchical_listing_pages_through_markers() {
        let store = store_with("c", &["a", "d/1", "d/2", "d/3", "e/x/y", "f"]);
        let query = ListingQuery::container("c").hierarchical().with_max_results(2);
        let (keys, _) = drain(&store, &query);
        assert_eq!(keys, vec!["a", "d/", "e/", "f"]);

        let first = store.list_segmented(&query, None).unwrap();
        assert!(matches!(
            &first.items[1],
            ListingItem::Directory { container, prefix } if container == "c" && prefix == "d/"
        ));
    }

    #[test]
    fn hierarchical_relisting_expands_directory() {
        let store = store_with("c", &["d/1", "d/sub/2", "d/sub/3"]);
        let query = ListingQuery::container("c").with_prefix("d/").hierarchical();
        let (keys, _) = drain(&store, &query);
        assert_eq!(keys, vec!["d/1", "d/sub/"]);

        let deeper = ListingQuery::container("c").with_prefix("d/sub/").hierarchical();
        let (keys, _) = drain(&store, &deeper);
        assert_eq!(keys, vec!["d/sub/2", "d/sub/3"]);
    }

    #[test]
    fn account_scope_lists_named_container() {
        let store = store_with("c", &["in/1", "in/2", "out/1"]);
        let query = ListingQuery::account("c/in/");
        let segment = store.list_segmented(&query, None).unwrap();
        let keys: Vec<&str> = segment.items.iter().map(ListingItem::key).collect();
        assert_eq!(keys, vec!["in/1", "in/2"]);

        let missing = ListingQuery::account("nope/");
        assert!(matches!(
            store.list_segmented(&missing, None),
            Err(StoreError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn listing_missing_container_fails() {
        let store = InMemoryBlobStore::new();
        let err = store
            .list_segmented(&ListingQuery::container("x"), None)
            .unwrap_err();
        assert_eq!(err, StoreError::ContainerNotFound("x".into()));
    }

    #[test]
    fn page_bound_is_validated() {
        let store = InMemoryBlobStore::with_config(StoreConfig { max_page_size: 10 });
        store.create_container("c").unwrap();
        let zero = ListingQuery::container("c").with_max_results(0);
        assert!(matches!(
            store.list_segmented(&zero, None),
            Err(StoreError::InvalidArgument(_))
        ));
        let huge = ListingQuery::container("c").with_max_results(11);
        assert!(store.list_segmented(&huge, None).is_err());
    }

    #[test]
    fn unbounded_query_uses_configured_page_size() {
        let store = InMemoryBlobStore::with_config(StoreConfig { max_page_size: 2 });
        store.create_container("c").unwrap();
        for name in ["a", "b", "c"] {
            store.put_object("c", name, Bytes::new(), None).unwrap();
        }
        let query = ListingQuery::container("c");
        let first = store.list_segmented(&query, None).unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.next_cursor.is_some());
    }

    #[test]
    fn list_all_drains_pages() {
        let store = store_with("c", &["a", "b", "c", "d", "e"]);
        let blobs = store
            .list_all(&ListingQuery::container("c").with_max_results(2))
            .unwrap();
        let names: Vec<&str> = blobs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn listing_resumes_after_concurrent_insert() {
        let store = store_with("c", &["a", "c"]);
        let query = ListingQuery::container("c").with_max_results(1);
        let first = store.list_segmented(&query, None).unwrap();
        store.put_object("c", "b", Bytes::new(), None).unwrap();
        let second = store
            .list_segmented(&query, first.next_cursor.as_ref())
            .unwrap();
        assert_eq!(second.items[0].key(), "b");
    }

    // -----------------------------------------------------------------------
    // Service properties
    // -----------------------------------------------------------------------

    #[test]
    fn service_properties_round_trip() {
        let store = InMemoryBlobStore::new();
        assert_eq!(store.service_properties().unwrap(), ServiceProperties::default());

        let props = ServiceProperties {
            logging: Some(LoggingProperties {
                version: "1.0".into(),
                delete: true,
                read: false,
                write: true,
                retention: RetentionPolicy {
                    enabled: true,
                    days: Some(7),
                },
            }),
            cors: vec![CorsRule {
                allowed_origins: vec!["*".into()],
                allowed_methods: vec!["GET".into()],
                max_age_seconds: 60,
                ..Default::default()
            }],
            default_service_version: Some("2019-07-07".into()),
            ..Default::default()
        };
        store.set_service_properties(props.clone()).unwrap();
        assert_eq!(store.service_properties().unwrap(), props);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_writes_never_tear_listed_blobs() {
        let store = store_with("c", &[]);
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..500usize {
                    let content = Bytes::from(vec![0u8; i]);
                    let len = i.to_string();
                    let metadata = meta(&[("len", len.as_str())]);
                    store.put_object("c", "hot", content, Some(metadata)).unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..500 {
                    let segment = store
                        .list_segmented(&ListingQuery::container("c"), None)
                        .unwrap();
                    for blob in segment.blobs() {
                        let recorded: u64 = blob.metadata.get("len").unwrap().parse().unwrap();
                        assert_eq!(recorded, blob.len());
                        assert_eq!(blob.content.len() as u64, blob.len());
                    }
                }
            });
        });
    }

    proptest! {
        #[test]
        fn any_page_size_visits_each_name_once(
            names in proptest::collection::btree_set("[a-c/]{1,5}", 1..30),
            page in 1usize..7,
        ) {
            let store = InMemoryBlobStore::new();
            store.create_container("c").unwrap();
            for name in &names {
                store.put_object("c", name, Bytes::new(), None).unwrap();
            }
            let query = ListingQuery::container("c").with_max_results(page);
            let (keys, _) = drain(&store, &query);
            let expected: Vec<String> = names.into_iter().collect();
            prop_assert_eq!(keys, expected);
        }
    }
}
