//! Blob path templates for blobbind.
//!
//! A path template is a pattern such as `input/{folder}/{name}.txt` that
//! describes which blobs a trigger applies to. Templates are compiled once
//! into an immutable sequence of literal and parameter pieces and can then be
//! matched against any number of concrete blob paths concurrently.
//!
//! # Modules
//!
//! - [`error`] — Error types for template operations
//! - [`syntax`] — Placeholder syntax and the shared pattern tokenizer
//! - [`template`] — [`PathTemplate`]: compile and match primary templates
//! - [`binding`] — [`BindingData`] produced by a successful match
//! - [`contract`] — [`BindingContract`]: names and types a handler may bind
//! - [`resolver`] — [`TemplateResolver`]: substitute captures and metadata
//!   into dependent templates
//!
//! # Placeholder Syntax
//!
//! Literal text interspersed with `{identifier}` tokens. Identifiers are
//! ASCII: a letter or `_`, then letters, digits or `_`.
//! Resolution templates additionally accept `{metadata.<key>}`, which is
//! looked up in the triggering blob's metadata.

pub mod binding;
pub mod contract;
pub mod error;
pub mod resolver;
pub mod syntax;
pub mod template;

pub use binding::BindingData;
pub use contract::{BindingContract, BindingType};
pub use error::{PathError, Result};
pub use resolver::{resolve, TemplateResolver};
pub use syntax::{Placeholder, METADATA_PREFIX};
pub use template::PathTemplate;
