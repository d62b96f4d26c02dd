//! In-memory blob storage for blobbind.
//!
//! This crate emulates the parts of a cloud blob service that trigger
//! matching depends on: containers of named blobs with metadata, and
//! segmented listing whose pages are order-stable and resumable through
//! continuation cursors.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Listings are produced in ascending byte order of blob name.
//! 2. A continuation cursor is only valid for the query that produced it.
//! 3. Every call is atomic: readers see a blob wholly before or wholly after
//!    a write, never a mix of both.
//! 4. A failed call leaves the store unchanged.
//! 5. Service properties are stored and returned verbatim.

pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod object;
pub mod properties;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use listing::{ListingCursor, ListingItem, ListingQuery, ListingScope, ListingSegment};
pub use memory::InMemoryBlobStore;
pub use object::{BlobObject, BlobProperties};
pub use properties::{CorsRule, LoggingProperties, MetricsProperties, RetentionPolicy, ServiceProperties};
pub use traits::BlobStore;
