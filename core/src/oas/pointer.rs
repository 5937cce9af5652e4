#![deny(missing_docs)]

//! # Pointers
//!
//! Canonical identity of a node inside the document graph. Two nodes are the same entity
//! iff their pointers are equal after `$ref` normalization.

use crate::oas::ref_utils::{decode_pointer_segment, encode_pointer_segment};
use std::fmt;

/// A decoded JSON Pointer rooted at the document (`#/components/schemas/Pet`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    /// The document root (`#`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a pointer from raw (unescaped) segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a local fragment such as `#/components/schemas/Pet`.
    ///
    /// Returns `None` for anchors (`#foo`) and non-fragment strings.
    pub fn parse(fragment: &str) -> Option<Self> {
        let rest = fragment.strip_prefix('#')?;
        if rest.is_empty() {
            return Some(Self::root());
        }
        let rest = rest.strip_prefix('/')?;
        Some(Self {
            segments: rest.split('/').map(decode_pointer_segment).collect(),
        })
    }

    /// Returns a new pointer one level deeper.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns the enclosing pointer, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self {
            segments: head.to_vec(),
        })
    }

    /// Last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Decoded segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True at the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for segment in &self.segments {
            write!(f, "/{}", encode_pointer_segment(segment))?;
        }
        Ok(())
    }
}
