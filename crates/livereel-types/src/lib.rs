//! # livereel-types: Core types for `livereel`
//!
//! This crate contains the small shared types used across the livereel
//! workspace:
//! - Identifiers ([`ChainId`], [`SegmentKey`])
//! - Seek semantics ([`Whence`])
//!
//! Both identifiers are string newtypes rather than integers: a chain is
//! named once per recording session, and a segment key is the opaque
//! URL-like locator handed to the segment provider. Neither is ever reused
//! within a live chain.

use std::fmt::{self, Display};

/// Identifier for one logical chain (one recording/timeshift session).
///
/// Fixed at chain creation and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique key of one segment within a chain.
///
/// Assigned at append time, unique for the lifetime of the chain, and
/// treated as fully opaque by the chain itself: only the segment provider
/// interprets it (typically as a URL or file path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentKey(String);

impl SegmentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SegmentKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SegmentKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Origin for a chain-level seek.
///
/// `Set` and `Cur` follow the usual SEEK_SET/SEEK_CUR meaning, applied to
/// the logical stream spanning all segments. `End` is deliberately *not*
/// "end of chain": on a live, still-growing chain the only stable end is
/// the end of the segment currently being consumed, so `End` is resolved
/// relative to the end of the current segment before the boundary walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Offset from the start of the logical stream.
    Set,
    /// Offset from the current read position.
    Cur,
    /// Offset from the end of the current segment.
    End,
}

impl Display for Whence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Whence::Set => "SEEK_SET",
            Whence::Cur => "SEEK_CUR",
            Whence::End => "SEEK_END",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_display_roundtrip() {
        let id = ChainId::from("live-tuner0-20260830");
        assert_eq!(id.as_str(), "live-tuner0-20260830");
        assert_eq!(id.to_string(), "live-tuner0-20260830");
    }

    #[test]
    fn segment_keys_compare_by_value() {
        let a = SegmentKey::from("myth://host/1011_1.ts");
        let b = SegmentKey::new(String::from("myth://host/1011_1.ts"));
        assert_eq!(a, b);
    }

    #[test]
    fn whence_display_names() {
        assert_eq!(Whence::Set.to_string(), "SEEK_SET");
        assert_eq!(Whence::Cur.to_string(), "SEEK_CUR");
        assert_eq!(Whence::End.to_string(), "SEEK_END");
    }
}
