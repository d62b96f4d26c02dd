use serde::{Deserialize, Serialize};

/// Largest page a listing returns when the caller sets no bound.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 5000;

/// Configuration for an [`InMemoryBlobStore`](crate::InMemoryBlobStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound for `max_results` and the page size used when a listing
    /// query sets none.
    pub max_page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.max_page_size, 5000);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, StoreConfig::default());
    }
}
