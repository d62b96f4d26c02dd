use std::fmt;

use blobbind_types::CaseInsensitiveMap;
use serde::{Deserialize, Serialize};

/// Named string captures produced by matching a blob path against a
/// [`PathTemplate`](crate::PathTemplate).
///
/// Names are case-insensitive and enumerate in template declaration order.
/// The key set of binding data produced by a match is exactly the
/// template's parameter-name set.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingData(CaseInsensitiveMap<String>);

impl BindingData {
    /// Create empty binding data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name, value.into())
    }

    /// The value bound under `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bound names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Consume into the underlying case-insensitive map.
    pub fn into_inner(self) -> CaseInsensitiveMap<String> {
        self.0
    }
}

impl fmt::Debug for BindingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BindingData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (k, v) in iter {
            data.insert(k, v);
        }
        data
    }
}
