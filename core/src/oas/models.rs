#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Typed view over the parts of an OpenAPI 3.x document the transformer walks.
//!
//! Every map that carries user-declared names keeps declaration order (`IndexMap`), and
//! every object that may be replaced by a `$ref` is wrapped in [`RefOr`]. Specification
//! extensions (`x-...`) are dropped while deserializing.

use crate::oas::schema::SchemaNode;
use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A Reference Object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reference {
    /// The raw `$ref` string.
    #[serde(rename = "$ref")]
    pub reference: String,
    /// Optional summary override.
    #[serde(default)]
    pub summary: Option<String>,
    /// Optional description override.
    #[serde(default)]
    pub description: Option<String>,
}

/// Either a Reference Object or an inline item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{ "$ref": "..." }`
    Ref(Reference),
    /// The inline object.
    Item(T),
}

/// A name-keyed map that ignores specification extensions.
///
/// Used for the Paths, Webhooks and Responses objects, where `x-` keys sit beside
/// user-declared names.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<T>(pub IndexMap<String, T>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<T> Entries<T> {
    /// Entries in declaration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, T> {
        self.0.iter()
    }

    /// True when no named entries are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &IndexMap<String, T> {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for Entries<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                continue;
            }
            let item = serde_json::from_value::<T>(value)
                .map_err(|e| DeError::custom(format!("Failed to parse '{}': {}", key, e)))?;
            items.insert(key, item);
        }

        Ok(Self(items))
    }
}

/// HTTP methods a Path Item may declare, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl Method {
    /// Lowercase method name as it appears in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// URL path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// The `in` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

/// Media Type Object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MediaType {
    /// Schema of the payload.
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Example payload.
    #[serde(default)]
    pub example: Option<Value>,
}

/// Content map keyed by media type.
pub type Content = IndexMap<String, MediaType>;

/// Parameter Object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Parameter schema.
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Alternative to `schema`.
    #[serde(default)]
    pub content: Option<Content>,
    /// Example value.
    #[serde(default)]
    pub example: Option<Value>,
}

/// Request Body Object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RequestBody {
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Payload per media type.
    #[serde(default)]
    pub content: Content,
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
}

/// Header Object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Header {
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the header is always present.
    #[serde(default)]
    pub required: bool,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Header schema.
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Alternative to `schema`.
    #[serde(default)]
    pub content: Option<Content>,
}

/// Response Object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Response {
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Response headers.
    #[serde(default)]
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Payload per media type; `None` when the response has no body.
    #[serde(default)]
    pub content: Option<Content>,
}

/// Operation Object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(default)]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request body.
    #[serde(default)]
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code or `default`.
    #[serde(default)]
    pub responses: Entries<RefOr<Response>>,
}

/// Path Item Object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PathItem {
    /// A path item may reference another path item.
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    /// Summary for all operations.
    #[serde(default)]
    pub summary: Option<String>,
    /// Description for all operations.
    #[serde(default)]
    pub description: Option<String>,
    /// GET
    #[serde(default)]
    pub get: Option<Operation>,
    /// PUT
    #[serde(default)]
    pub put: Option<Operation>,
    /// POST
    #[serde(default)]
    pub post: Option<Operation>,
    /// DELETE
    #[serde(default)]
    pub delete: Option<Operation>,
    /// OPTIONS
    #[serde(default)]
    pub options: Option<Operation>,
    /// HEAD
    #[serde(default)]
    pub head: Option<Operation>,
    /// PATCH
    #[serde(default)]
    pub patch: Option<Operation>,
    /// TRACE
    #[serde(default)]
    pub trace: Option<Operation>,
    /// Parameters shared by every operation on this path.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

impl PathItem {
    /// Declared operations in canonical method order.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::Get, &self.get),
            (Method::Put, &self.put),
            (Method::Post, &self.post),
            (Method::Delete, &self.delete),
            (Method::Options, &self.options),
            (Method::Head, &self.head),
            (Method::Patch, &self.patch),
            (Method::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

/// Components Object. Each collection is `None` when the document omits it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Reusable schemas.
    #[serde(default)]
    pub schemas: Option<IndexMap<String, SchemaNode>>,
    /// Reusable responses.
    #[serde(default)]
    pub responses: Option<IndexMap<String, RefOr<Response>>>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: Option<IndexMap<String, RefOr<Parameter>>>,
    /// Reusable request bodies.
    #[serde(default)]
    pub request_bodies: Option<IndexMap<String, RefOr<RequestBody>>>,
    /// Reusable headers.
    #[serde(default)]
    pub headers: Option<IndexMap<String, RefOr<Header>>>,
    /// Reusable path items.
    #[serde(default)]
    pub path_items: Option<IndexMap<String, RefOr<PathItem>>>,
}

/// Info Object (only the fields used by generated output).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default)]
    pub title: Option<String>,
    /// API version.
    #[serde(default)]
    pub version: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Tag Object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// The root OpenAPI document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OpenApiDocument {
    /// `openapi` version string.
    pub openapi: String,
    /// OAS 3.2 `$self` URI, used to treat absolute references as local.
    #[serde(rename = "$self", default)]
    pub self_uri: Option<String>,
    /// Metadata.
    #[serde(default)]
    pub info: Info,
    /// Paths keyed by URL template; `None` when omitted.
    #[serde(default)]
    pub paths: Option<Entries<PathItem>>,
    /// Webhooks keyed by name; `None` when omitted.
    #[serde(default)]
    pub webhooks: Option<Entries<RefOr<PathItem>>>,
    /// Reusable components; `None` when omitted.
    #[serde(default)]
    pub components: Option<Components>,
    /// Declared tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
}
