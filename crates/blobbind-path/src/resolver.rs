//! Resolution of dependent templates against a matched blob.
//!
//! A handler triggered by one blob frequently needs a second one whose path
//! is derived from the first, e.g. `thumbnails/{name}` or
//! `archive/{metadata.owner}/{name}`. A [`TemplateResolver`] substitutes
//! binding data and the triggering blob's metadata into such a pattern to
//! produce a concrete [`BlobPath`]. Fetching that blob is left to the caller.

use std::fmt;

use blobbind_types::{BlobPath, Metadata};
use tracing::debug;

use crate::binding::BindingData;
use crate::error::{PathError, Result};
use crate::syntax::{tokenize, Placeholder, Token};

/// A compiled resolution template.
///
/// Unlike [`PathTemplate`](crate::PathTemplate), placeholders here are
/// substitution points rather than capture points: `metadata.<key>` is
/// allowed, and a name may appear more than once or next to another
/// placeholder, because substitution has no capture boundary to infer.
#[derive(Clone, PartialEq, Eq)]
pub struct TemplateResolver {
    pattern: String,
    tokens: Vec<Token>,
}

impl TemplateResolver {
    /// Compile a resolution template.
    pub fn compile(pattern: &str) -> Result<Self> {
        let tokens = tokenize(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
        })
    }

    /// The original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholders in the order they appear.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Parameter(p) => Some(p),
            Token::Literal(_) => None,
        })
    }

    /// Substitute every placeholder and parse the result as a blob path.
    ///
    /// Unqualified names are looked up in `binding`; `metadata.<key>` names
    /// in `metadata`. Both lookups ignore case. A placeholder with no value
    /// fails with [`PathError::UnresolvedBindingParameter`].
    pub fn resolve(&self, binding: &BindingData, metadata: &Metadata) -> Result<BlobPath> {
        let mut resolved = String::with_capacity(self.pattern.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => resolved.push_str(text),
                Token::Parameter(placeholder) => {
                    let value = match placeholder {
                        Placeholder::Capture(name) => binding.get(name),
                        Placeholder::Metadata(_) => {
                            metadata.get(placeholder.key()).map(String::as_str)
                        }
                    };
                    let value = value.ok_or_else(|| PathError::UnresolvedBindingParameter {
                        name: placeholder.name(),
                    })?;
                    resolved.push_str(value);
                }
            }
        }

        let path = BlobPath::parse(&resolved)?;
        debug!(pattern = %self.pattern, path = %path, "resolved dependent path");
        Ok(path)
    }
}

impl fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplateResolver({:?})", self.pattern)
    }
}

/// Compile `pattern` and resolve it in one step.
pub fn resolve(pattern: &str, binding: &BindingData, metadata: &Metadata) -> Result<BlobPath> {
    TemplateResolver::compile(pattern)?.resolve(binding, metadata)
}
