//! Case-insensitive string-keyed map.
//!
//! Metadata keys, binding-data names and contract names are all compared
//! without regard to case, while the casing a caller first used is kept for
//! enumeration and display. Keys are normalised (lower-cased) at the map
//! boundary; the normalised form is never exposed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Blob and container metadata: string values under case-insensitive keys.
pub type Metadata = CaseInsensitiveMap<String>;

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// An insertion-ordered map whose keys compare case-insensitively.
///
/// Equality ignores insertion order and key casing; two maps are equal when
/// they hold the same normalised keys mapped to equal values.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Vec<(String, V)>", into = "Vec<(String, V)>")]
#[serde(bound(
    serialize = "V: Serialize + Clone",
    deserialize = "V: Deserialize<'de>"
))]
pub struct CaseInsensitiveMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> CaseInsensitiveMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value, replacing any value stored under the same key in any
    /// casing. The casing of the first insertion is kept.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let normalized = normalize(&key);
        match self.index.get(&normalized) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(normalized, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index
            .get(&normalize(key))
            .map(|&pos| &self.entries[pos].1)
    }

    /// Look up an entry by key, returning the stored key casing alongside
    /// the value.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &V)> {
        self.index.get(&normalize(key)).map(|&pos| {
            let (k, v) = &self.entries[pos];
            (k.as_str(), v)
        })
    }

    /// Returns `true` if the key is present in any casing.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&normalize(key))
    }

    /// Remove an entry by key, ignoring case.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = self.index.remove(&normalize(key))?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Iterate entries in insertion order with their original key casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order with their original casing.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for CaseInsensitiveMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl<V: Eq> Eq for CaseInsensitiveMap<V> {}

impl<V: fmt::Debug> fmt::Debug for CaseInsensitiveMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> From<Vec<(String, V)>> for CaseInsensitiveMap<V> {
    fn from(entries: Vec<(String, V)>) -> Self {
        entries.into_iter().collect()
    }
}

impl<V> From<CaseInsensitiveMap<V>> for Vec<(String, V)> {
    fn from(map: CaseInsensitiveMap<V>) -> Self {
        map.entries
    }
}

impl<V> IntoIterator for CaseInsensitiveMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
