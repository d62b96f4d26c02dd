use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque entity tag attached to every stored blob.
///
/// ETags are drawn from a store-wide counter, so every successful write
/// produces a tag strictly greater than any tag issued before it. Callers
/// should treat the value as opaque and only compare for equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ETag(u64);

impl ETag {
    /// Create an ETag from a raw sequence number.
    pub const fn from_sequence(seq: u64) -> Self {
        Self(seq)
    }

    /// The raw sequence number.
    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// The tag that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ETag({self})")
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl FromStr for ETag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim_matches('"')
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidETag(s.to_string()))?;
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| TypeError::InvalidETag(format!("{s}: {e}")))
    }
}
