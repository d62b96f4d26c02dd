//! Foundation types for blobbind.
//!
//! This crate provides the small value types shared by the path-template
//! engine, the in-memory blob store, and the trigger dispatcher. Every other
//! blobbind crate depends on `blobbind-types`.
//!
//! # Key Types
//!
//! - [`CaseInsensitiveMap`] — Map with case-insensitive keys that keeps the
//!   original key casing and insertion order for enumeration
//! - [`Metadata`] — Blob and container metadata (`CaseInsensitiveMap<String>`)
//! - [`ETag`] — Opaque entity tag, changes on every write
//! - [`BlobPath`] — A concrete `container/object` address

pub mod error;
pub mod etag;
pub mod map;
pub mod path;

pub use error::TypeError;
pub use etag::ETag;
pub use map::{CaseInsensitiveMap, Metadata};
pub use path::BlobPath;
