//! Primary (matching) path templates.
//!
//! A [`PathTemplate`] is compiled once from a pattern such as
//! `images/{folder}/{name}.png` and then matched against concrete blob
//! addresses. Compilation splits the pattern at its first `/` into a
//! container part and an object part, and the object part into
//! `/`-delimited components. Each component is a run of literal and
//! parameter pieces; a parameter never spans a `/`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binding::BindingData;
use crate::contract::BindingContract;
use crate::error::{PathError, Result};
use crate::syntax::{tokenize, Placeholder, Token};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Parameter(String),
}

/// A compiled, immutable blob path template.
///
/// Safe to share across threads; matching never mutates the template.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    pattern: String,
    container: Vec<Piece>,
    object: Vec<Vec<Piece>>,
    names: Vec<String>,
}

impl PathTemplate {
    /// Compile a primary template.
    ///
    /// Fails with [`PathError::InvalidPattern`] when braces are unbalanced, a
    /// parameter name is empty or malformed, a name repeats (ignoring case),
    /// two parameters are adjacent with no literal between them, the
    /// reserved `metadata.<key>` form is used, or the pattern does not have
    /// the shape `container/object`.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobbind_path::PathTemplate;
    ///
    /// let template = PathTemplate::compile("container/{name}").unwrap();
    /// let data = template.matches("container", "foo.txt").unwrap();
    /// assert_eq!(data.get("name"), Some("foo.txt"));
    ///
    /// assert!(PathTemplate::compile("container/{a}{b}").is_err());
    /// ```
    pub fn compile(pattern: &str) -> Result<Self> {
        let tokens = tokenize(pattern)?;

        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut previous_was_parameter = false;
        let mut components: Vec<Vec<Piece>> = vec![Vec::new()];

        for token in tokens {
            match token {
                Token::Literal(text) => {
                    previous_was_parameter = false;
                    let mut parts = text.split('/');
                    if let Some(first) = parts.next() {
                        push_literal(&mut components, first);
                    }
                    for part in parts {
                        components.push(Vec::new());
                        push_literal(&mut components, part);
                    }
                }
                Token::Parameter(Placeholder::Metadata(text)) => {
                    return Err(PathError::invalid(
                        pattern,
                        format!(
                            "'{text}' is only allowed in resolution templates, \
                             not in trigger paths"
                        ),
                    ));
                }
                Token::Parameter(Placeholder::Capture(name)) => {
                    if previous_was_parameter {
                        return Err(PathError::invalid(
                            pattern,
                            format!("parameter '{name}' directly follows another parameter"),
                        ));
                    }
                    if !seen.insert(name.to_lowercase()) {
                        return Err(PathError::invalid(
                            pattern,
                            format!("parameter '{name}' is declared more than once"),
                        ));
                    }
                    previous_was_parameter = true;
                    names.push(name.clone());
                    if let Some(current) = components.last_mut() {
                        current.push(Piece::Parameter(name));
                    }
                }
            }
        }

        if components.len() < 2 {
            return Err(PathError::invalid(
                pattern,
                "path must be in the form 'container/blob'",
            ));
        }
        if components.iter().any(Vec::is_empty) {
            return Err(PathError::invalid(pattern, "path segments must not be empty"));
        }

        let container = components.remove(0);
        debug!(
            pattern,
            parameters = names.len(),
            depth = components.len(),
            "compiled path template"
        );

        Ok(Self {
            pattern: pattern.to_string(),
            container,
            object: components,
            names,
        })
    }

    /// Match a concrete blob address against this template.
    ///
    /// Returns `None` when the blob does not satisfy the template. That is
    /// the expected outcome for most blobs, not an error.
    ///
    /// A container name that is empty or contains `/` never matches, so no
    /// capture spans a separator.
    pub fn matches(&self, container: &str, object: &str) -> Option<BindingData> {
        if container.is_empty() || container.contains('/') {
            return None;
        }
        let mut data = BindingData::new();

        if !match_component(&self.container, container, &mut data) {
            return None;
        }

        let parts: Vec<&str> = object.split('/').collect();
        if parts.len() != self.object.len() {
            return None;
        }
        for (pieces, text) in self.object.iter().zip(parts) {
            if !match_component(pieces, text, &mut data) {
                return None;
            }
        }
        Some(data)
    }

    /// Parameter names in declaration order (container part first).
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns `true` if the template declares at least one parameter.
    pub fn has_parameters(&self) -> bool {
        !self.names.is_empty()
    }

    /// Describe the values a handler bound to this template may receive.
    pub fn binding_contract(&self) -> Result<BindingContract> {
        BindingContract::build(self.parameter_names())
    }

    /// The original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The container part of the pattern (before the first `/`).
    pub fn container_part(&self) -> String {
        render(&self.container)
    }

    /// The object part of the pattern (after the first `/`).
    pub fn object_part(&self) -> String {
        self.object
            .iter()
            .map(|pieces| render(pieces))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The longest literal prefix of the object part.
    ///
    /// Every blob name this template can match starts with this text, so it
    /// can narrow a listing before matching.
    pub fn literal_object_prefix(&self) -> String {
        let mut prefix = String::new();
        for (i, pieces) in self.object.iter().enumerate() {
            if i > 0 {
                prefix.push('/');
            }
            for piece in pieces {
                match piece {
                    Piece::Literal(text) => prefix.push_str(text),
                    Piece::Parameter(_) => return prefix,
                }
            }
        }
        prefix
    }

    /// The literal container name, if the container part has no parameters.
    pub fn literal_container(&self) -> Option<&str> {
        match self.container.as_slice() {
            [Piece::Literal(name)] => Some(name.as_str()),
            _ => None,
        }
    }
}

fn push_literal(components: &mut [Vec<Piece>], text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(current) = components.last_mut() {
        current.push(Piece::Literal(text.to_string()));
    }
}

fn render(pieces: &[Piece]) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            Piece::Literal(text) => text.clone(),
            Piece::Parameter(name) => format!("{{{name}}}"),
        })
        .collect()
}

/// Match one `/`-free component, binding its parameters into `data`.
fn match_component(pieces: &[Piece], text: &str, data: &mut BindingData) -> bool {
    let mut captures = Vec::new();
    if !match_pieces(pieces, text, &mut captures) {
        return false;
    }
    let names = pieces.iter().filter_map(|piece| match piece {
        Piece::Parameter(name) => Some(name),
        Piece::Literal(_) => None,
    });
    for (name, value) in names.zip(captures) {
        data.insert(name.clone(), value);
    }
    true
}

/// Backtracking matcher over a single component.
///
/// Leaves `captures` untouched when it returns `false`. Parameters take the
/// shortest non-empty text after which the rest of the component matches.
fn match_pieces<'t>(pieces: &[Piece], text: &'t str, captures: &mut Vec<&'t str>) -> bool {
    match pieces.split_first() {
        None => text.is_empty(),
        Some((Piece::Literal(literal), rest)) => text
            .strip_prefix(literal.as_str())
            .is_some_and(|remaining| match_pieces(rest, remaining, captures)),
        Some((Piece::Parameter(_), rest)) => match rest.first() {
            None => {
                if text.is_empty() {
                    return false;
                }
                captures.push(text);
                true
            }
            Some(Piece::Literal(next)) => {
                for (idx, _) in text.char_indices().skip(1) {
                    if !text[idx..].starts_with(next.as_str()) {
                        continue;
                    }
                    captures.push(&text[..idx]);
                    if match_pieces(rest, &text[idx..], captures) {
                        return true;
                    }
                    captures.pop();
                }
                false
            }
            // Adjacent parameters are rejected by `compile`.
            Some(Piece::Parameter(_)) => false,
        },
    }
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathTemplate({:?})", self.pattern)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl FromStr for PathTemplate {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::compile(s)
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = PathError;

    fn try_from(pattern: String) -> Result<Self> {
        Self::compile(&pattern)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.pattern
    }
}
