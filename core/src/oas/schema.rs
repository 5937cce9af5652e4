#![deny(missing_docs)]

//! # Schema Nodes
//!
//! A closed variant model of the OpenAPI Schema Object. Raw JSON is classified once at load
//! time; the transformer then matches exhaustively over [`SchemaNode`].
//!
//! Classification never fails. Shapes that carry no recognized keyword degrade to
//! [`SchemaNode::Unknown`] so newer schema keywords stay forward compatible.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Keywords that make an otherwise composed schema carry its own structure.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "type",
    "properties",
    "additionalProperties",
    "items",
    "enum",
    "const",
];

const COMPOSITION_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf", "discriminator"];

/// Descriptive and modifier keywords shared by every schema kind.
///
/// `title`, `description`, `format`, `deprecated`, `default` and `example` only feed
/// comments; `nullable` and `readOnly` affect the emitted type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMeta {
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `format`
    pub format: Option<String>,
    /// `deprecated`
    pub deprecated: bool,
    /// `nullable`, `x-nullable`, or `"null"` inside a type list.
    pub nullable: bool,
    /// `readOnly`
    pub read_only: bool,
    /// `writeOnly`
    pub write_only: bool,
    /// `default`, kept even when it is JSON `null`.
    pub default: Option<Value>,
    /// `example`, or the first entry of `examples`.
    pub example: Option<Value>,
}

/// Scalar `type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

impl ScalarKind {
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

/// The three states of `additionalProperties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AdditionalProperties {
    /// Keyword not present; the configured default decides.
    #[default]
    Absent,
    /// `true` or `false`.
    Allowed(bool),
    /// A schema every extra value must satisfy.
    Schema(Box<SchemaNode>),
}

/// `discriminator` with its mapping in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    /// `propertyName`
    pub property_name: String,
    /// `mapping`: literal value -> schema name or reference.
    pub mapping: IndexMap<String, String>,
}

/// `$ref`
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSchema {
    /// Raw `$ref` string.
    pub reference: String,
    /// Sibling keywords.
    pub meta: SchemaMeta,
}

/// One or more scalar types.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    /// Declared scalar kinds in declaration order (never empty).
    pub kinds: Vec<ScalarKind>,
    /// Shared keywords.
    pub meta: SchemaMeta,
}

/// `type: array`
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    /// `items`
    pub items: Option<Box<SchemaNode>>,
    /// `minItems`
    pub min_items: Option<u64>,
    /// `maxItems`
    pub max_items: Option<u64>,
    /// Shared keywords.
    pub meta: SchemaMeta,
}

/// `type: object`, or any schema with `properties` / `additionalProperties`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    /// `properties` in declaration order.
    pub properties: IndexMap<String, SchemaNode>,
    /// `required`
    pub required: Vec<String>,
    /// `additionalProperties`
    pub additional_properties: AdditionalProperties,
    /// Shared keywords.
    pub meta: SchemaMeta,
}

/// `allOf` / `oneOf` / `anyOf`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedSchema {
    /// `allOf`
    pub all_of: Vec<SchemaNode>,
    /// `oneOf`
    pub one_of: Vec<SchemaNode>,
    /// `anyOf`
    pub any_of: Vec<SchemaNode>,
    /// `discriminator`
    pub discriminator: Option<Discriminator>,
    /// Sibling structural keywords (e.g. `properties` next to `allOf`), intersected last.
    pub base: Option<Box<SchemaNode>>,
    /// Shared keywords.
    pub meta: SchemaMeta,
}

/// `enum` and/or `const`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// Distinct values in first-seen order.
    pub values: Vec<Value>,
    /// Shared keywords.
    pub meta: SchemaMeta,
}

/// One OpenAPI Schema Object.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `$ref`
    Reference(ReferenceSchema),
    /// Scalar types.
    Primitive(PrimitiveSchema),
    /// Arrays.
    Array(ArraySchema),
    /// Objects.
    Object(ObjectSchema),
    /// Combinators.
    Composed(ComposedSchema),
    /// Literal sets.
    Enumerated(EnumSchema),
    /// Anything else, including `{}` and `true`.
    Unknown(SchemaMeta),
}

impl SchemaNode {
    /// Classifies a raw schema value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => classify(map),
            // `false` accepts nothing: an empty enumeration.
            Value::Bool(false) => SchemaNode::Enumerated(EnumSchema {
                values: Vec::new(),
                meta: SchemaMeta::default(),
            }),
            _ => SchemaNode::Unknown(SchemaMeta::default()),
        }
    }

    /// Shared keywords of any variant.
    pub fn meta(&self) -> &SchemaMeta {
        match self {
            SchemaNode::Reference(s) => &s.meta,
            SchemaNode::Primitive(s) => &s.meta,
            SchemaNode::Array(s) => &s.meta,
            SchemaNode::Object(s) => &s.meta,
            SchemaNode::Composed(s) => &s.meta,
            SchemaNode::Enumerated(s) => &s.meta,
            SchemaNode::Unknown(meta) => meta,
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(SchemaNode::from_value(&raw))
    }
}

fn classify(map: &Map<String, Value>) -> SchemaNode {
    let types = declared_types(map);
    let mut meta = read_meta(map);
    if types.iter().any(|t| t == "null") {
        meta.nullable = true;
    }

    if let Some(Value::String(reference)) = map.get("$ref") {
        return SchemaNode::Reference(ReferenceSchema {
            reference: reference.clone(),
            meta,
        });
    }

    if map.contains_key("enum") || map.contains_key("const") {
        return SchemaNode::Enumerated(EnumSchema {
            values: enum_values(map),
            meta,
        });
    }

    if COMPOSITION_KEYWORDS[..3].iter().any(|k| map.contains_key(*k)) {
        return SchemaNode::Composed(ComposedSchema {
            all_of: members(map, "allOf"),
            one_of: members(map, "oneOf"),
            any_of: members(map, "anyOf"),
            discriminator: map.get("discriminator").and_then(read_discriminator),
            base: structural_base(map),
            meta,
        });
    }

    let non_null: Vec<&str> = types
        .iter()
        .map(String::as_str)
        .filter(|t| *t != "null")
        .collect();

    if non_null.len() > 1 && non_null.iter().any(|t| matches!(*t, "array" | "object")) {
        return split_type_list(map, &non_null, meta);
    }

    let is_array = non_null.first() == Some(&"array")
        || (non_null.is_empty() && map.contains_key("items"));
    if is_array {
        return SchemaNode::Array(ArraySchema {
            items: map
                .get("items")
                .map(|items| Box::new(SchemaNode::from_value(items))),
            min_items: map.get("minItems").and_then(Value::as_u64),
            max_items: map.get("maxItems").and_then(Value::as_u64),
            meta,
        });
    }

    let is_object = non_null.first() == Some(&"object")
        || (non_null.is_empty()
            && (map.contains_key("properties") || map.contains_key("additionalProperties")));
    if is_object {
        return SchemaNode::Object(ObjectSchema {
            properties: properties(map),
            required: string_list(map.get("required")),
            additional_properties: additional_properties(map.get("additionalProperties")),
            meta,
        });
    }

    let kinds: Option<Vec<ScalarKind>> = if non_null.is_empty() {
        if types.is_empty() {
            None
        } else {
            Some(vec![ScalarKind::Null])
        }
    } else {
        non_null
            .iter()
            .map(|t| ScalarKind::from_type_name(t))
            .collect()
    };

    match kinds {
        Some(kinds) => SchemaNode::Primitive(PrimitiveSchema { kinds, meta }),
        None => SchemaNode::Unknown(meta),
    }
}

/// `type: [string, array]` and friends become an `anyOf` with one node per type.
fn split_type_list(map: &Map<String, Value>, types: &[&str], meta: SchemaMeta) -> SchemaNode {
    let any_of = types
        .iter()
        .map(|t| {
            let mut single = map.clone();
            single.insert("type".to_string(), Value::String((*t).to_string()));
            for key in ["nullable", "x-nullable", "title", "description"] {
                single.remove(key);
            }
            classify(&single)
        })
        .collect();

    SchemaNode::Composed(ComposedSchema {
        all_of: Vec::new(),
        one_of: Vec::new(),
        any_of,
        discriminator: None,
        base: None,
        meta,
    })
}

fn structural_base(map: &Map<String, Value>) -> Option<Box<SchemaNode>> {
    if !STRUCTURAL_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
        return None;
    }
    let mut base = map.clone();
    for key in COMPOSITION_KEYWORDS {
        base.remove(*key);
    }
    for key in [
        "title",
        "description",
        "nullable",
        "x-nullable",
        "deprecated",
        "default",
        "example",
        "examples",
    ] {
        base.remove(key);
    }
    // A bare `type: object` beside a combinator adds no members of its own.
    let only_object_type =
        base.len() == 1 && base.get("type") == Some(&Value::String("object".to_string()));
    if only_object_type {
        return None;
    }
    Some(Box::new(classify(&base)))
}

fn declared_types(map: &Map<String, Value>) -> Vec<String> {
    match map.get("type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn read_meta(map: &Map<String, Value>) -> SchemaMeta {
    let string = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
    let flag = |key: &str| map.get(key).and_then(Value::as_bool).unwrap_or(false);

    SchemaMeta {
        title: string("title"),
        description: string("description"),
        format: string("format"),
        deprecated: flag("deprecated"),
        nullable: flag("nullable") || flag("x-nullable"),
        read_only: flag("readOnly"),
        write_only: flag("writeOnly"),
        default: map.get("default").cloned(),
        example: map.get("example").cloned().or_else(|| {
            map.get("examples")
                .and_then(Value::as_array)
                .and_then(|examples| examples.first().cloned())
        }),
    }
}

fn enum_values(map: &Map<String, Value>) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::new();
    let declared = map
        .get("enum")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .chain(map.get("const"));
    for value in declared {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
    values
}

fn members(map: &Map<String, Value>, key: &str) -> Vec<SchemaNode> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(SchemaNode::from_value).collect())
        .unwrap_or_default()
}

fn properties(map: &Map<String, Value>) -> IndexMap<String, SchemaNode> {
    map.get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| (name.clone(), SchemaNode::from_value(schema)))
                .collect()
        })
        .unwrap_or_default()
}

fn additional_properties(value: Option<&Value>) -> AdditionalProperties {
    match value {
        None => AdditionalProperties::Absent,
        Some(Value::Bool(allowed)) => AdditionalProperties::Allowed(*allowed),
        Some(schema) => AdditionalProperties::Schema(Box::new(SchemaNode::from_value(schema))),
    }
}

fn read_discriminator(value: &Value) -> Option<Discriminator> {
    let property_name = value.get("propertyName")?.as_str()?.to_string();
    let mapping = value
        .get("mapping")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|target| (k.clone(), target.to_string())))
                .collect()
        })
        .unwrap_or_default();
    Some(Discriminator {
        property_name,
        mapping,
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> SchemaNode {
        SchemaNode::from_value(&value)
    }

    #[test]
    fn test_reference_wins_over_siblings() {
        let n = node(json!({"$ref": "#/components/schemas/Pet", "description": "a pet"}));
        match n {
            SchemaNode::Reference(r) => {
                assert_eq!(r.reference, "#/components/schemas/Pet");
                assert_eq!(r.meta.description.as_deref(), Some("a pet"));
            }
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn test_nullable_sources() {
        assert!(node(json!({"type": "string", "nullable": true})).meta().nullable);
        assert!(node(json!({"type": "string", "x-nullable": true})).meta().nullable);
        let listed = node(json!({"type": ["string", "null"]}));
        assert!(listed.meta().nullable);
        match listed {
            SchemaNode::Primitive(p) => assert_eq!(p.kinds, vec![ScalarKind::String]),
            other => panic!("expected primitive, got {:?}", other),
        }
    }

    #[test]
    fn test_object_keeps_declaration_order() {
        let n = node(json!({
            "properties": {"zeta": {"type": "string"}, "alpha": {"type": "integer"}},
            "required": ["alpha"]
        }));
        match n {
            SchemaNode::Object(o) => {
                let keys: Vec<&String> = o.properties.keys().collect();
                assert_eq!(keys, vec!["zeta", "alpha"]);
                assert_eq!(o.required, vec!["alpha".to_string()]);
                assert_eq!(o.additional_properties, AdditionalProperties::Absent);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_and_const_dedup_by_value_and_type() {
        let n = node(json!({"enum": ["a", 1, "a", "1", null], "const": 1}));
        match n {
            SchemaNode::Enumerated(e) => {
                assert_eq!(e.values, vec![json!("a"), json!(1), json!("1"), Value::Null]);
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_composed_with_sibling_properties() {
        let n = node(json!({
            "allOf": [{"$ref": "#/components/schemas/Base"}],
            "type": "object",
            "properties": {"extra": {"type": "string"}}
        }));
        match n {
            SchemaNode::Composed(c) => {
                assert_eq!(c.all_of.len(), 1);
                assert!(matches!(c.base.as_deref(), Some(SchemaNode::Object(_))));
            }
            other => panic!("expected composed, got {:?}", other),
        }
    }

    #[test]
    fn test_composed_with_bare_object_type_has_no_base() {
        let n = node(json!({"type": "object", "oneOf": [{"type": "string"}]}));
        match n {
            SchemaNode::Composed(c) => assert!(c.base.is_none()),
            other => panic!("expected composed, got {:?}", other),
        }
    }

    #[test]
    fn test_discriminator_mapping_order() {
        let n = node(json!({
            "oneOf": [{"$ref": "#/c/Cat"}, {"$ref": "#/c/Dog"}],
            "discriminator": {"propertyName": "kind", "mapping": {"dog": "#/c/Dog", "cat": "#/c/Cat"}}
        }));
        match n {
            SchemaNode::Composed(c) => {
                let d = c.discriminator.unwrap();
                assert_eq!(d.property_name, "kind");
                let keys: Vec<&String> = d.mapping.keys().collect();
                assert_eq!(keys, vec!["dog", "cat"]);
            }
            other => panic!("expected composed, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_type_list_splits_into_any_of() {
        let n = node(json!({"type": ["string", "array"], "items": {"type": "integer"}}));
        match n {
            SchemaNode::Composed(c) => {
                assert_eq!(c.any_of.len(), 2);
                assert!(matches!(c.any_of[0], SchemaNode::Primitive(_)));
                assert!(matches!(c.any_of[1], SchemaNode::Array(_)));
            }
            other => panic!("expected composed, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_boolean_schemas() {
        assert!(matches!(node(json!({})), SchemaNode::Unknown(_)));
        assert!(matches!(node(json!(true)), SchemaNode::Unknown(_)));
        assert!(matches!(node(json!({"type": "file"})), SchemaNode::Unknown(_)));
        match node(json!(false)) {
            SchemaNode::Enumerated(e) => assert!(e.values.is_empty()),
            other => panic!("expected empty enum, got {:?}", other),
        }
    }

    #[test]
    fn test_array_bounds() {
        match node(json!({"type": "array", "items": {"type": "integer"}, "minItems": 2, "maxItems": 2})) {
            SchemaNode::Array(a) => {
                assert_eq!(a.min_items, Some(2));
                assert_eq!(a.max_items, Some(2));
                assert!(a.items.is_some());
            }
            other => panic!("expected array, got {:?}", other),
        }
    }
}
