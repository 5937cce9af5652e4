#![deny(missing_docs)]

//! # OpenAPI Input Module
//!
//! - **document**: Decoding YAML/JSON into a loaded document.
//! - **models**: Typed Path, Operation and Components objects.
//! - **schema**: Closed variant model of the Schema Object.
//! - **pointer** / **resolver**: Node identity and `$ref` resolution.
//! - **ordering**: Declaration vs. alphabetical ordering of sibling entries.

pub mod document;
pub mod models;
pub mod ordering;
pub mod pointer;
pub(crate) mod ref_utils;
pub mod resolver;
pub mod schema;

pub use document::{load_document, load_document_value, LoadedDocument};
pub use models::OpenApiDocument;
pub use pointer::Pointer;
pub use resolver::PointerResolver;
pub use schema::SchemaNode;
