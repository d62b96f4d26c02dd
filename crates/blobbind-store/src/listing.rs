//! Segmented listing: queries, cursors, and page construction.
//!
//! A listing is a walk over the blobs of one container in ascending byte
//! order of name. In hierarchical mode every blob whose name continues past
//! the prefix with a further `/` is folded into a single directory marker
//! for that next level. Because all names under a marker sort contiguously
//! right after the marker's own key, the folded sequence is still ordered,
//! and a page can resume strictly after whatever key it returned last.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::object::BlobObject;

/// Where a listing looks for blobs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingScope {
    /// Account-wide: the prefix has the form `container/objectprefix`.
    Account,
    /// A single container: the prefix is an object-name prefix.
    Container(String),
}

/// The signature of a listing call.
///
/// Every page of one listing sequence must be requested with an identical
/// query; the cursor carries a copy to enforce this.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingQuery {
    pub scope: ListingScope,
    pub prefix: String,
    pub flat: bool,
    pub max_results: Option<usize>,
}

impl ListingQuery {
    /// A flat, unbounded listing of one container.
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            scope: ListingScope::Container(name.into()),
            prefix: String::new(),
            flat: true,
            max_results: None,
        }
    }

    /// A flat, unbounded account-level listing of `container/objectprefix`.
    pub fn account(prefix: impl Into<String>) -> Self {
        Self {
            scope: ListingScope::Account,
            prefix: prefix.into(),
            flat: true,
            max_results: None,
        }
    }

    /// Only list names starting with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Expand one level below the prefix, folding deeper names into
    /// directory markers.
    pub fn hierarchical(mut self) -> Self {
        self.flat = false;
        self
    }

    /// Bound each page to at most `max` entries.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Resolve the scope and prefix into a container name and an
    /// object-name prefix.
    pub fn target(&self) -> StoreResult<(&str, &str)> {
        match &self.scope {
            ListingScope::Container(name) => Ok((name.as_str(), self.prefix.as_str())),
            ListingScope::Account => {
                let (container, prefix) = self
                    .prefix
                    .split_once('/')
                    .unwrap_or((self.prefix.as_str(), ""));
                if container.is_empty() {
                    return Err(StoreError::InvalidArgument(
                        "account-level listing requires a container name in the prefix".into(),
                    ));
                }
                Ok((container, prefix))
            }
        }
    }
}

/// Opaque continuation cursor returned with a non-final page.
///
/// Immutable and self-contained: it records the query that produced it and
/// the last key that query returned. Pass it back unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingCursor {
    query: ListingQuery,
    last_key: String,
}

impl ListingCursor {
    pub(crate) fn new(query: ListingQuery, last_key: String) -> Self {
        Self { query, last_key }
    }

    /// The query this cursor belongs to.
    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    /// The last key returned before this cursor was issued.
    pub fn last_key(&self) -> &str {
        &self.last_key
    }

    /// Check that this cursor may continue `query`.
    pub fn validate(&self, query: &ListingQuery) -> StoreResult<()> {
        if self.query != *query {
            return Err(StoreError::InvalidContinuationToken(
                "cursor was issued for a different query".into(),
            ));
        }
        let (_, prefix) = query.target()?;
        if !self.last_key.starts_with(prefix) {
            return Err(StoreError::InvalidContinuationToken(format!(
                "cursor key {:?} is outside prefix {prefix:?}",
                self.last_key
            )));
        }
        Ok(())
    }
}

/// One entry of a listing page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingItem {
    /// A stored blob.
    Blob(BlobObject),
    /// A synthetic directory marker standing for every blob under `prefix`.
    /// `prefix` ends with `/`.
    Directory { container: String, prefix: String },
}

impl ListingItem {
    /// The ordering key: blob name or directory prefix.
    pub fn key(&self) -> &str {
        match self {
            Self::Blob(blob) => &blob.name,
            Self::Directory { prefix, .. } => prefix,
        }
    }

    /// Returns `true` for directory markers.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// The blob, if this entry is one.
    pub fn as_blob(&self) -> Option<&BlobObject> {
        match self {
            Self::Blob(blob) => Some(blob),
            Self::Directory { .. } => None,
        }
    }
}

/// A single page of listing results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSegment {
    pub items: Vec<ListingItem>,
    /// `None` once the listing is exhausted.
    pub next_cursor: Option<ListingCursor>,
}

impl ListingSegment {
    /// Blobs on this page, skipping directory markers.
    pub fn blobs(&self) -> impl Iterator<Item = &BlobObject> {
        self.items.iter().filter_map(ListingItem::as_blob)
    }
}

/// Build one page from blobs sorted by name.
///
/// `blobs` must already be restricted to names starting with `prefix` and
/// be in ascending order. `page_size` is at least one.
pub(crate) fn build_page<'a>(
    query: &ListingQuery,
    container: &'a str,
    prefix: &'a str,
    blobs: impl Iterator<Item = &'a BlobObject> + 'a,
    after: Option<&str>,
    page_size: usize,
) -> ListingSegment {
    let mut entries = fold(container, prefix, query.flat, blobs)
        .skip_while(|item| after.is_some_and(|last| item.key() <= last));

    let items: Vec<ListingItem> = entries.by_ref().take(page_size).collect();
    let next_cursor = match (entries.next(), items.last()) {
        (Some(_), Some(last)) => Some(ListingCursor::new(query.clone(), last.key().to_string())),
        _ => None,
    };

    ListingSegment { items, next_cursor }
}

/// Turn a sorted run of blobs into listing entries, folding deeper levels
/// into directory markers in hierarchical mode.
fn fold<'a>(
    container: &'a str,
    prefix: &'a str,
    flat: bool,
    blobs: impl Iterator<Item = &'a BlobObject> + 'a,
) -> impl Iterator<Item = ListingItem> + 'a {
    let mut last_marker: Option<String> = None;
    blobs.filter_map(move |blob| {
        if flat {
            return Some(ListingItem::Blob(blob.clone()));
        }
        let rest = &blob.name[prefix.len()..];
        match rest.find('/') {
            None => Some(ListingItem::Blob(blob.clone())),
            Some(pos) => {
                let marker = &blob.name[..prefix.len() + pos + 1];
                if last_marker.as_deref() == Some(marker) {
                    return None;
                }
                last_marker = Some(marker.to_string());
                Some(ListingItem::Directory {
                    container: container.to_string(),
                    prefix: marker.to_string(),
                })
            }
        }
    })
}
