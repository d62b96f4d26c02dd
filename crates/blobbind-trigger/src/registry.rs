//! Registered triggers and blob event dispatch.

use blobbind_store::{BlobObject, BlobStore};
use tracing::{debug, info};

use crate::config::TriggerConfig;
use crate::error::{TriggerError, TriggerResult};
use crate::trigger::{BlobTrigger, TriggerInvocation};

/// The set of triggers a host listens with.
///
/// Triggers are kept in registration order, and dispatch reports matches in
/// that order.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    triggers: Vec<BlobTrigger>,
    config: TriggerConfig,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TriggerConfig) -> Self {
        Self {
            triggers: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Add a trigger. Names are unique, compared case-insensitively.
    pub fn register(&mut self, trigger: BlobTrigger) -> TriggerResult<()> {
        if self.get(trigger.name()).is_some() {
            return Err(TriggerError::DuplicateTrigger(trigger.name().to_string()));
        }
        info!(
            trigger = %trigger.name(),
            pattern = %trigger.template().pattern(),
            "registered blob trigger"
        );
        self.triggers.push(trigger);
        Ok(())
    }

    /// Compile and add a trigger in one step.
    pub fn register_pattern(&mut self, name: &str, pattern: &str) -> TriggerResult<()> {
        self.register(BlobTrigger::new(name, pattern)?)
    }

    pub fn get(&self, name: &str) -> Option<&BlobTrigger> {
        self.triggers
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn triggers(&self) -> &[BlobTrigger] {
        &self.triggers
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Every trigger that applies to `blob`, with its binding data.
    ///
    /// Blobs in a system container never fire triggers.
    pub fn dispatch(&self, blob: &BlobObject) -> Vec<TriggerInvocation> {
        if self.is_system_container(&blob.container) {
            debug!(container = %blob.container, blob = %blob.name, "skipping system container");
            return Vec::new();
        }
        let invocations: Vec<_> = self.triggers.iter().filter_map(|t| t.bind(blob)).collect();
        debug!(
            container = %blob.container,
            blob = %blob.name,
            matched = invocations.len(),
            "dispatched blob event"
        );
        invocations
    }

    /// Returns `true` for containers the host reserves for itself.
    pub fn is_system_container(&self, container: &str) -> bool {
        self.config
            .system_containers
            .iter()
            .any(|c| c.as_str() == container)
    }

    /// Create the configured system containers. Returns how many were new.
    pub fn prepare_store<S: BlobStore + ?Sized>(&self, store: &S) -> TriggerResult<usize> {
        let mut created = 0;
        for name in &self.config.system_containers {
            if store.create_container(name)? {
                info!(container = %name, "created system container");
                created += 1;
            }
        }
        Ok(created)
    }
}
