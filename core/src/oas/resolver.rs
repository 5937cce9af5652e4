#![deny(missing_docs)]

//! # Pointer Resolver
//!
//! Resolves `$ref` strings against the raw document graph.
//!
//! The resolver never inlines. It answers with the canonical [`Pointer`] of the target so
//! callers can emit a reference instead of recursing, which keeps cyclic graphs finite.
//! Only references into the same document are supported; anything else is reported as
//! unresolvable together with the location that referenced it.

use crate::error::{AppError, AppResult};
use crate::oas::pointer::Pointer;
use crate::oas::ref_utils::normalize_ref_to_local;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pointer lookup over one decoded document.
#[derive(Debug, Clone, Copy)]
pub struct PointerResolver<'a> {
    root: &'a Value,
    self_uri: Option<&'a str>,
}

impl<'a> PointerResolver<'a> {
    /// Creates a resolver over `root`. `self_uri` is the document's `$self`, if declared.
    pub fn new(root: &'a Value, self_uri: Option<&'a str>) -> Self {
        Self { root, self_uri }
    }

    /// The document's `$self` URI, if declared.
    pub fn self_uri(&self) -> Option<&'a str> {
        self.self_uri
    }

    /// Maps a `$ref` to the canonical pointer of its target.
    ///
    /// `from` is the location holding the reference and is only used for error reporting.
    pub fn canonical(&self, reference: &str, from: &Pointer) -> AppResult<Pointer> {
        let unresolvable = || AppError::UnresolvableReference {
            reference: reference.to_string(),
            location: from.to_string(),
        };

        let local = normalize_ref_to_local(reference, self.self_uri).ok_or_else(unresolvable)?;
        let pointer = Pointer::parse(&local).ok_or_else(unresolvable)?;
        if self.lookup(&pointer).is_none() {
            return Err(unresolvable());
        }
        Ok(pointer)
    }

    /// Resolves a `$ref` and returns the target pointer with its raw value.
    pub fn resolve(&self, reference: &str, from: &Pointer) -> AppResult<(Pointer, &'a Value)> {
        let pointer = self.canonical(reference, from)?;
        let value = self
            .lookup(&pointer)
            .ok_or_else(|| AppError::UnresolvableReference {
                reference: reference.to_string(),
                location: from.to_string(),
            })?;
        tracing::trace!(reference, target = %pointer, "resolved reference");
        Ok((pointer, value))
    }

    /// Resolves a `$ref` and decodes the target into a typed model.
    ///
    /// Reference chains (a target that is itself a Reference Object) are followed until a
    /// concrete object is reached.
    pub fn resolve_as<T: DeserializeOwned>(
        &self,
        reference: &str,
        from: &Pointer,
    ) -> AppResult<(Pointer, T)> {
        let mut current = reference.to_string();
        let mut location = from.clone();
        let mut seen = Vec::new();

        loop {
            let (pointer, value) = self.resolve(&current, &location)?;
            if seen.contains(&pointer) {
                return Err(AppError::UnresolvableReference {
                    reference: current,
                    location: location.to_string(),
                });
            }
            match value.get("$ref").and_then(Value::as_str) {
                Some(next) => {
                    seen.push(pointer.clone());
                    current = next.to_string();
                    location = pointer;
                }
                None => {
                    let item = serde_json::from_value(value.clone()).map_err(|e| {
                        AppError::Parse(format!("Invalid object at {}: {}", pointer, e))
                    })?;
                    return Ok((pointer, item));
                }
            }
        }
    }

    /// Looks up a pointer in the document. Array segments are decimal indices.
    pub fn lookup(&self, pointer: &Pointer) -> Option<&'a Value> {
        pointer
            .segments()
            .iter()
            .try_fold(self.root, |node, segment| match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "openapi": "3.1.0",
            "components": {
                "schemas": {
                    "Pet": {"type": "object"},
                    "Alias": {"$ref": "#/components/schemas/Pet"},
                    "a/b": {"type": "string"}
                },
                "parameters": {
                    "Limit": {"name": "limit", "in": "query"}
                }
            },
            "paths": {"/pets": {"get": {"parameters": [{"name": "q", "in": "query"}]}}}
        })
    }

    #[test]
    fn test_resolve_returns_canonical_pointer() {
        let raw = doc();
        let resolver = PointerResolver::new(&raw, None);
        let (ptr, value) = resolver
            .resolve("#/components/schemas/Pet", &Pointer::root())
            .unwrap();
        assert_eq!(ptr.to_string(), "#/components/schemas/Pet");
        assert_eq!(value, &json!({"type": "object"}));
    }

    #[test]
    fn test_escaped_and_array_segments() {
        let raw = doc();
        let resolver = PointerResolver::new(&raw, None);
        assert!(resolver
            .resolve("#/components/schemas/a~1b", &Pointer::root())
            .is_ok());
        let (_, value) = resolver
            .resolve("#/paths/~1pets/get/parameters/0", &Pointer::root())
            .unwrap();
        assert_eq!(value["name"], json!("q"));
    }

    #[test]
    fn test_missing_target_reports_both_locations() {
        let raw = doc();
        let resolver = PointerResolver::new(&raw, None);
        let from = Pointer::parse("#/components/schemas/Pet/properties/owner").unwrap();
        let err = resolver
            .resolve("#/components/schemas/Owner", &from)
            .unwrap_err();
        match err {
            AppError::UnresolvableReference {
                reference,
                location,
            } => {
                assert_eq!(reference, "#/components/schemas/Owner");
                assert_eq!(location, "#/components/schemas/Pet/properties/owner");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_external_reference_is_unresolvable() {
        let raw = doc();
        let resolver = PointerResolver::new(&raw, None);
        assert!(resolver
            .resolve("common.yaml#/components/schemas/Pet", &Pointer::root())
            .is_err());
    }

    #[test]
    fn test_self_uri_makes_absolute_reference_local() {
        let raw = doc();
        let resolver = PointerResolver::new(&raw, Some("https://example.com/api.yaml"));
        let (ptr, _) = resolver
            .resolve(
                "https://example.com/api.yaml#/components/schemas/Pet",
                &Pointer::root(),
            )
            .unwrap();
        assert_eq!(ptr.to_string(), "#/components/schemas/Pet");
    }

    #[test]
    fn test_resolve_as_follows_chains() {
        let raw = doc();
        let resolver = PointerResolver::new(&raw, None);
        let (ptr, value): (Pointer, Value) = resolver
            .resolve_as("#/components/schemas/Alias", &Pointer::root())
            .unwrap();
        assert_eq!(ptr.to_string(), "#/components/schemas/Pet");
        assert_eq!(value, json!({"type": "object"}));
    }
}
