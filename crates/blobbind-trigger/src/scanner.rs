//! Scanning existing blobs for trigger matches.

use blobbind_store::{BlobStore, ListingCursor, ListingQuery, StoreError};
use tracing::{debug, info};

use crate::config::TriggerConfig;
use crate::error::TriggerResult;
use crate::registry::TriggerRegistry;
use crate::trigger::{BlobTrigger, TriggerInvocation};

/// Walks a store page by page and binds every blob a trigger applies to.
///
/// Listings are narrowed to the trigger's literal container and object
/// prefix where it has them. Each page is a consistent view, but the scan
/// as a whole is not a snapshot. System containers are never scanned.
pub struct BlobScanner<'a, S: BlobStore + ?Sized> {
    store: &'a S,
    page_size: usize,
    system_containers: Vec<String>,
}

impl<'a, S: BlobStore + ?Sized> BlobScanner<'a, S> {
    /// A scanner that skips the default system containers.
    pub fn new(store: &'a S, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            system_containers: TriggerConfig::default().system_containers,
        }
    }

    /// A scanner using the configured page size and system containers.
    pub fn from_config(store: &'a S, config: &TriggerConfig) -> Self {
        Self {
            store,
            page_size: config.scan_page_size.max(1),
            system_containers: config.system_containers.clone(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn is_system_container(&self, container: &str) -> bool {
        self.system_containers.iter().any(|c| c.as_str() == container)
    }

    /// All current blobs that `trigger` matches, in container then name
    /// order.
    pub fn scan(&self, trigger: &BlobTrigger) -> TriggerResult<Vec<TriggerInvocation>> {
        let containers = match trigger.template().literal_container() {
            Some(name) => vec![name.to_string()],
            None => self.store.container_names()?,
        };
        let containers: Vec<String> = containers
            .into_iter()
            .filter(|c| {
                let skip = self.is_system_container(c);
                if skip {
                    debug!(trigger = %trigger.name(), container = %c, "skipping system container");
                }
                !skip
            })
            .collect();
        let prefix = trigger.template().literal_object_prefix();

        let mut invocations = Vec::new();
        for container in &containers {
            let query = ListingQuery::container(container.as_str())
                .with_prefix(prefix.as_str())
                .with_max_results(self.page_size);
            self.scan_container(trigger, &query, &mut invocations)?;
        }
        info!(
            trigger = %trigger.name(),
            containers = containers.len(),
            matched = invocations.len(),
            "scanned existing blobs"
        );
        Ok(invocations)
    }

    /// Scan for every trigger in `registry`, also skipping the registry's
    /// own system containers.
    pub fn scan_registry(&self, registry: &TriggerRegistry) -> TriggerResult<Vec<TriggerInvocation>> {
        let mut invocations = Vec::new();
        for trigger in registry.triggers() {
            invocations.extend(
                self.scan(trigger)?
                    .into_iter()
                    .filter(|i| !registry.is_system_container(&i.blob().container)),
            );
        }
        Ok(invocations)
    }

    fn scan_container(
        &self,
        trigger: &BlobTrigger,
        query: &ListingQuery,
        out: &mut Vec<TriggerInvocation>,
    ) -> TriggerResult<()> {
        let mut cursor: Option<ListingCursor> = None;
        let mut pages = 0usize;
        loop {
            let segment = match self.store.list_segmented(query, cursor.as_ref()) {
                Ok(segment) => segment,
                // Deleted between listing containers and scanning it.
                Err(StoreError::ContainerNotFound(name)) => {
                    debug!(trigger = %trigger.name(), container = %name, "container vanished during scan");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            pages += 1;
            out.extend(segment.blobs().filter_map(|blob| trigger.bind(blob)));
            match segment.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!(trigger = %trigger.name(), pages, "finished container scan");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HOSTS_CONTAINER;
    use crate::error::TriggerError;
    use blobbind_store::InMemoryBlobStore;
    use bytes::Bytes;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn seeded() -> InMemoryBlobStore {
        let store = InMemoryBlobStore::new();
        for container in ["images", "docs"] {
            store.create_container(container).unwrap();
        }
        for name in ["a.png", "b.jpg", "cats/c.png", "d.png", "e.png"] {
            store
                .put_object("images", name, Bytes::new(), None)
                .unwrap();
        }
        store
            .put_object("docs", "readme.png", Bytes::new(), None)
            .unwrap();
        store
    }

    fn names(invocations: &[TriggerInvocation]) -> Vec<String> {
        invocations
            .iter()
            .map(|i| format!("{}/{}", i.blob().container, i.blob().name))
            .collect()
    }

    #[test]
    fn scan_pages_through_literal_container() {
        init_tracing();
        let store = seeded();
        let trigger = BlobTrigger::new("png", "images/{name}.png").unwrap();
        let scanner = BlobScanner::new(&store, 2);

        let found = scanner.scan(&trigger).unwrap();
        assert_eq!(names(&found), vec!["images/a.png", "images/d.png", "images/e.png"]);
        assert_eq!(found[1].binding_data().get("name"), Some("d"));
    }

    #[test]
    fn scan_every_container_when_container_is_a_parameter() {
        let store = seeded();
        let trigger = BlobTrigger::new("any", "{container}/{name}.png").unwrap();
        let found = BlobScanner::new(&store, 1).scan(&trigger).unwrap();
        assert_eq!(
            names(&found),
            vec!["docs/readme.png", "images/a.png", "images/d.png", "images/e.png"]
        );
    }

    #[test]
    fn scan_uses_literal_prefix() {
        let store = seeded();
        let trigger = BlobTrigger::new("cats", "images/cats/{name}").unwrap();
        let found = BlobScanner::new(&store, 10).scan(&trigger).unwrap();
        assert_eq!(names(&found), vec!["images/cats/c.png"]);
    }

    #[test]
    fn missing_literal_container_yields_nothing() {
        let store = seeded();
        let trigger = BlobTrigger::new("none", "absent/{name}").unwrap();
        assert!(BlobScanner::new(&store, 10).scan(&trigger).unwrap().is_empty());
    }

    #[test]
    fn page_size_above_store_limit_is_an_error() {
        let store = seeded();
        let trigger = BlobTrigger::new("png", "images/{name}").unwrap();
        let err = BlobScanner::new(&store, usize::MAX).scan(&trigger).unwrap_err();
        assert!(matches!(
            err,
            TriggerError::Store(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn scan_skips_system_containers() {
        let store = seeded();
        store.create_container(HOSTS_CONTAINER).unwrap();
        store
            .put_object(HOSTS_CONTAINER, "lease.png", Bytes::new(), None)
            .unwrap();
        let scanner = BlobScanner::new(&store, 10);

        let any = BlobTrigger::new("any", "{container}/{name}.png").unwrap();
        let found = scanner.scan(&any).unwrap();
        assert_eq!(found.len(), 4);
        assert!(names(&found).iter().all(|n| !n.starts_with(HOSTS_CONTAINER)));

        let hosts = BlobTrigger::new("hosts", "azure-webjobs-hosts/{name}").unwrap();
        assert!(scanner.scan(&hosts).unwrap().is_empty());
    }

    #[test]
    fn configured_system_containers_are_skipped() {
        let store = seeded();
        let config = TriggerConfig::from_toml_str("system_containers = [\"docs\"]").unwrap();
        let scanner = BlobScanner::from_config(&store, &config);
        assert_eq!(scanner.page_size(), 1000);

        let any = BlobTrigger::new("any", "{container}/{name}.png").unwrap();
        let found = scanner.scan(&any).unwrap();
        assert_eq!(names(&found), vec!["images/a.png", "images/d.png", "images/e.png"]);
    }

    #[test]
    fn scan_registry_skips_system_containers() {
        let store = seeded();
        let mut registry = TriggerRegistry::new();
        registry.prepare_store(&store).unwrap();
        store
            .put_object(HOSTS_CONTAINER, "lease.png", Bytes::new(), None)
            .unwrap();
        registry.register_pattern("any", "{container}/{name}.png").unwrap();
        registry.register_pattern("docs", "docs/{name}").unwrap();

        let scanner = BlobScanner::from_config(&store, registry.config());
        let found = scanner.scan_registry(&registry).unwrap();
        let triggers: Vec<_> = found.iter().map(|i| i.trigger_name()).collect();
        assert_eq!(triggers, vec!["any", "any", "any", "any", "docs"]);
        assert!(names(&found).iter().all(|n| !n.starts_with(HOSTS_CONTAINER)));
    }
}
