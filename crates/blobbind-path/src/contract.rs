//! Binding contracts: the names and types a trigger advertises to handlers.

use std::fmt;

use blobbind_types::CaseInsensitiveMap;
use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};

/// The type of a value a handler may bind to.
///
/// Every capture originates from path text or metadata text, so the only
/// type is `String`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingType {
    String,
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
        }
    }
}

/// Case-insensitive mapping from binding name to [`BindingType`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingContract(CaseInsensitiveMap<BindingType>);

impl BindingContract {
    /// Build a contract from parameter names.
    ///
    /// Fails with [`PathError::DuplicateParameter`] if a name appears twice
    /// (ignoring case). Templates compiled by [`PathTemplate`] never contain
    /// duplicates, but names may come from any source.
    ///
    /// [`PathTemplate`]: crate::PathTemplate
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut contract = CaseInsensitiveMap::new();
        for name in names {
            if contract.contains_key(name) {
                return Err(PathError::DuplicateParameter {
                    name: name.to_string(),
                });
            }
            contract.insert(name, BindingType::String);
        }
        Ok(Self(contract))
    }

    /// The type bound under `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<BindingType> {
        self.0.get(name).copied()
    }

    /// Returns `true` if `name` is part of the contract.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of names in the contract.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the contract is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(name, type)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, BindingType)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}
