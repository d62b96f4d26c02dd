//! Blob trigger dispatch for blobbind.
//!
//! Ties the path-template engine to the blob store: a [`BlobTrigger`]
//! decides whether a new or changed blob concerns it and captures binding
//! data; declared input bindings are then resolved to further blobs. This is
//! the main entry point for hosts embedding blobbind.
//!
//! # Flow
//!
//! 1. Register triggers in a [`TriggerRegistry`] (invalid patterns are
//!    rejected and never registered).
//! 2. For each blob event, [`TriggerRegistry::dispatch`] returns one
//!    [`TriggerInvocation`] per matching trigger; or a [`BlobScanner`] walks
//!    existing blobs page by page and does the same.
//! 3. [`BlobTrigger::bind_inputs`] resolves every declared input against
//!    the invocation and reports a [`BindStatus`] per parameter.

pub mod config;
pub mod error;
pub mod registry;
pub mod scanner;
pub mod status;
pub mod trigger;

pub use config::TriggerConfig;
pub use error::{TriggerError, TriggerResult};
pub use registry::TriggerRegistry;
pub use scanner::BlobScanner;
pub use status::{BindOutcome, BindStatus};
pub use trigger::{BlobTrigger, InputBinding, TriggerInvocation};

// Re-export key types
pub use blobbind_path::{BindingContract, BindingData, PathTemplate, TemplateResolver};
pub use blobbind_store::{BlobObject, BlobStore, InMemoryBlobStore, ListingQuery};
pub use blobbind_types::{BlobPath, Metadata};
