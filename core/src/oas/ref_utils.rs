#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Shared helpers for splitting `$ref` strings and treating them as local pointers with
//! respect to OAS 3.2 `$self`.
//!
//! These utilities never fetch external documents, but allow absolute or relative
//! references to be treated as local when the document part matches the current
//! document's `$self` URI.

use percent_encoding::percent_decode_str;
use std::path::Path;
use url::Url;

/// Where the document part of a `$ref` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    /// `#/...` within the current document.
    Local,
    /// A relative document path such as `common.yaml#/...`.
    Relative,
    /// An absolute URI such as `https://example.com/api.yaml#/...`.
    Remote,
}

/// A `$ref` split into its document part and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedReference<'a> {
    /// Document part before `#` (empty for local references).
    pub document: &'a str,
    /// Fragment after `#`, if any.
    pub fragment: Option<&'a str>,
    /// Classification of the document part.
    pub kind: ReferenceKind,
}

/// Splits a `$ref` at the first `#`.
pub(crate) fn parse_reference(ref_str: &str) -> ParsedReference<'_> {
    let (document, fragment) = match ref_str.split_once('#') {
        Some((doc, frag)) => (doc, Some(frag)),
        None => (ref_str, None),
    };

    let kind = if document.is_empty() {
        ReferenceKind::Local
    } else if document.contains("://") {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Relative
    };

    ParsedReference {
        document,
        fragment,
        kind,
    }
}

/// Normalizes a `$ref` to a local JSON Pointer (e.g. `#/components/...`) if it targets the
/// current document as identified by `$self`.
///
/// Returns `None` if the reference is external or lacks a fragment.
pub(crate) fn normalize_ref_to_local(ref_str: &str, self_uri: Option<&str>) -> Option<String> {
    if ref_str.starts_with("#/") || ref_str == "#" {
        return Some(ref_str.to_string());
    }

    let parsed = parse_reference(ref_str);
    match parsed.kind {
        ReferenceKind::Local => parsed.fragment.map(|frag| format!("#{}", frag)),
        ReferenceKind::Relative | ReferenceKind::Remote => {
            let frag = parsed.fragment?;
            let self_uri = self_uri?;
            if ref_doc_matches_self(parsed.document, self_uri) {
                return Some(format!("#{}", frag));
            }
            None
        }
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a raw key as a JSON Pointer segment.
pub(crate) fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn ref_doc_matches_self(ref_doc: &str, self_uri: &str) -> bool {
    if ref_doc == self_uri {
        return true;
    }

    if let (Ok(ref_url), Ok(self_url)) = (Url::parse(ref_doc), Url::parse(self_uri)) {
        return ref_url.scheme() == self_url.scheme()
            && ref_url.host() == self_url.host()
            && ref_url.port() == self_url.port()
            && ref_url.path() == self_url.path();
    }

    // If `$self` is an absolute-path reference (e.g. "/api/openapi"), compare path.
    if self_uri.starts_with('/') {
        if let Ok(ref_url) = Url::parse(ref_doc) {
            return ref_url.path() == self_uri;
        }
    }

    if !self_uri.contains("://") && !ref_doc.contains("://") {
        return Path::new(ref_doc) == Path::new(self_uri);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_kinds() {
        assert_eq!(
            parse_reference("#/components/schemas/Pet").kind,
            ReferenceKind::Local
        );
        assert_eq!(
            parse_reference("common.yaml#/Pet").kind,
            ReferenceKind::Relative
        );
        let remote = parse_reference("https://example.com/api.yaml#/components");
        assert_eq!(remote.kind, ReferenceKind::Remote);
        assert_eq!(remote.document, "https://example.com/api.yaml");
        assert_eq!(remote.fragment, Some("/components"));
    }

    #[test]
    fn test_normalize_ref_local_passthrough() {
        let normalized = normalize_ref_to_local("#/components/schemas/User", None).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_self_absolute_match() {
        let self_uri = Some("https://example.com/openapi.yaml");
        let ref_str = "https://example.com/openapi.yaml#/components/schemas/User";
        let normalized = normalize_ref_to_local(ref_str, self_uri).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_self_path_match() {
        let self_uri = Some("/api/openapi.yaml");
        let ref_str = "https://example.com/api/openapi.yaml#/components/schemas/User";
        let normalized = normalize_ref_to_local(ref_str, self_uri).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_external_reference_is_not_local() {
        assert!(normalize_ref_to_local("other.yaml#/components/schemas/User", None).is_none());
        assert!(normalize_ref_to_local(
            "https://elsewhere.com/api.yaml#/components/schemas/User",
            Some("https://example.com/api.yaml")
        )
        .is_none());
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        let decoded = decode_pointer_segment(encoded);
        assert_eq!(decoded, "User Profile/details");
    }

    #[test]
    fn test_encode_pointer_segment() {
        assert_eq!(encode_pointer_segment("/pets/{id}"), "~1pets~1{id}");
        assert_eq!(encode_pointer_segment("a~b"), "a~0b");
    }
}
