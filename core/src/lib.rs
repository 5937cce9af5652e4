#![deny(missing_docs)]

//! # Oats Core
//!
//! Transforms OpenAPI 3.x documents into TypeScript type declarations.
//!
//! The pipeline is load ([`oas`]) → transform ([`transform`], producing [`ir`] trees) →
//! render ([`codegen`]). No file, network or process I/O happens here; drivers hand in
//! document text and receive generated text back.

/// Shared error types.
pub mod error;

/// Run configuration.
pub mod config;

/// OpenAPI document model, loading and `$ref` resolution.
pub mod oas;

/// Target-neutral type expressions.
pub mod ir;

/// Document to type-expression transformation.
pub mod transform;

/// TypeScript emission.
pub mod codegen;

pub use codegen::{generate, render_module, GeneratedTypes, SectionName};
pub use config::{Config, ExportStyle};
pub use error::{AppError, AppResult};
pub use ir::TypeExpr;
pub use oas::{load_document, load_document_value, LoadedDocument, Pointer};
pub use transform::{assemble, AssembledDocument};

/// Loads `text` and generates its type module in one step.
pub fn generate_from_str(text: &str, config: &Config) -> AppResult<GeneratedTypes> {
    let doc = load_document(text)?;
    generate(&doc, config)
}
