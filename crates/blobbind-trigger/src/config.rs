use serde::{Deserialize, Serialize};

use crate::error::{TriggerError, TriggerResult};

/// Container the host keeps its own bookkeeping in.
pub const HOSTS_CONTAINER: &str = "azure-webjobs-hosts";

/// Configuration for trigger dispatch and scanning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Page size used when scanning existing blobs.
    pub scan_page_size: usize,
    /// Containers created by [`TriggerRegistry::prepare_store`] before any
    /// trigger runs.
    ///
    /// [`TriggerRegistry::prepare_store`]: crate::TriggerRegistry::prepare_store
    pub system_containers: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            scan_page_size: 1000,
            system_containers: vec![HOSTS_CONTAINER.to_string()],
        }
    }
}

impl TriggerConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> TriggerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| TriggerError::Config(e.to_string()))?;
        if config.scan_page_size == 0 {
            return Err(TriggerError::Config(
                "scan_page_size must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}
