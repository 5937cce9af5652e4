#![deny(missing_docs)]

//! # Document Loading
//!
//! Decodes YAML or JSON text into a [`LoadedDocument`]: the raw graph used for pointer
//! resolution plus the typed model the transformer walks.

use crate::error::{AppError, AppResult};
use crate::oas::models::OpenApiDocument;
use crate::oas::resolver::PointerResolver;
use serde_json::{Map, Number, Value};

/// A decoded OpenAPI 3.x document.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// The decoded graph, in declaration order.
    pub raw: Value,
    /// Typed view of `raw`.
    pub spec: OpenApiDocument,
}

impl LoadedDocument {
    /// A resolver bound to this document and its `$self` URI.
    pub fn resolver(&self) -> PointerResolver<'_> {
        PointerResolver::new(&self.raw, self.spec.self_uri.as_deref())
    }
}

/// Decodes YAML or JSON text into a document.
///
/// JSON is accepted as YAML. Mapping keys that YAML reads as numbers or booleans (status
/// codes such as `200:`) are kept as strings.
pub fn load_document(text: &str) -> AppResult<LoadedDocument> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI document: {}", e)))?;
    load_document_value(yaml_to_json(yaml))
}

/// Builds a document from an already decoded JSON value.
pub fn load_document_value(mut raw: Value) -> AppResult<LoadedDocument> {
    let version = match raw.get("openapi") {
        Some(Value::String(v)) => v.clone(),
        // `openapi: 3.1` reads as a YAML float.
        Some(other) => other.to_string(),
        None => {
            let legacy = raw
                .get("swagger")
                .and_then(Value::as_str)
                .map(|v| format!("swagger {}", v))
                .unwrap_or_else(|| "missing".to_string());
            return Err(AppError::UnsupportedVersion(legacy));
        }
    };
    if !version.starts_with("3.") {
        return Err(AppError::UnsupportedVersion(version));
    }
    if let Some(map) = raw.as_object_mut() {
        map.insert("openapi".to_string(), Value::String(version));
    }

    let spec: OpenApiDocument = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::Parse(format!("Invalid OpenAPI document: {}", e)))?;

    tracing::debug!(version = %spec.openapi, title = ?spec.info.title, "loaded document");
    Ok(LoadedDocument { raw, spec })
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
