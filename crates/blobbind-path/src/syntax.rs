//! Placeholder syntax shared by primary and resolution templates.
//!
//! Tokenizing rules:
//! - `{` opens a placeholder and `}` closes it; nesting is not allowed
//! - Every `{` must be closed and every `}` must have been opened
//! - Placeholder names must be non-empty ASCII identifiers
//!   (`[A-Za-z_][A-Za-z0-9_]*`)
//! - `metadata.<key>` names a metadata lookup rather than a capture
//!
//! Higher-level rules (uniqueness, adjacency, reserved forms) are applied by
//! [`PathTemplate`](crate::PathTemplate) and
//! [`TemplateResolver`](crate::TemplateResolver).

use std::fmt;

use crate::error::{PathError, Result};

/// Prefix that marks a metadata-derived placeholder (`{metadata.key}`).
pub const METADATA_PREFIX: &str = "metadata.";

/// A named substitution point inside a template.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// An unqualified name, captured from (or substituted by) binding data.
    Capture(String),
    /// `metadata.<key>`: substituted from the triggering blob's metadata.
    /// Holds the whole placeholder text as written, prefix included.
    Metadata(String),
}

impl Placeholder {
    /// The placeholder text as written between the braces.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Returns `true` for the `metadata.<key>` form.
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata(_))
    }

    /// The lookup key: the capture name, or the metadata key without its
    /// prefix.
    pub fn key(&self) -> &str {
        match self {
            Self::Capture(name) => name,
            Self::Metadata(text) => text.get(METADATA_PREFIX.len()..).unwrap_or(""),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(name) | Self::Metadata(name) => f.write_str(name),
        }
    }
}

/// One lexical piece of a template pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Parameter(Placeholder),
}

/// Split a pattern into literal and placeholder tokens.
///
/// Adjacent literal text is always merged into a single token, so a
/// `Literal` is never followed by another `Literal`.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(PathError::invalid(pattern, "nested '{' in placeholder"));
                        }
                        other => name.push(other),
                    }
                }
                if !closed {
                    return Err(PathError::invalid(pattern, "unbalanced '{': missing '}'"));
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Parameter(parse_placeholder(pattern, &name)?));
            }
            '}' => {
                return Err(PathError::invalid(pattern, "unbalanced '}': missing '{'"));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

fn parse_placeholder(pattern: &str, name: &str) -> Result<Placeholder> {
    if name.is_empty() {
        return Err(PathError::invalid(pattern, "placeholder name must not be empty"));
    }

    let is_metadata = name.len() > METADATA_PREFIX.len()
        && name.is_char_boundary(METADATA_PREFIX.len())
        && name[..METADATA_PREFIX.len()].eq_ignore_ascii_case(METADATA_PREFIX);

    if is_metadata {
        validate_identifier(pattern, &name[METADATA_PREFIX.len()..])?;
        return Ok(Placeholder::Metadata(name.to_string()));
    }

    validate_identifier(pattern, name)?;
    Ok(Placeholder::Capture(name.to_string()))
}

fn validate_identifier(pattern: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| PathError::invalid(pattern, "placeholder name must not be empty"))?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(PathError::invalid(
            pattern,
            format!("placeholder {name:?} must start with a letter or '_'"),
        ));
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(PathError::invalid(
            pattern,
            format!("placeholder {name:?} contains forbidden character {bad:?}"),
        ));
    }
    Ok(())
}
