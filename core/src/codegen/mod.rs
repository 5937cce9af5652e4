#![deny(missing_docs)]

//! # Code Generation
//!
//! Turns an assembled document into TypeScript text.
//!
//! - **render**: `TypeExpr` → type syntax.
//! - **naming**: identifier checks and quoting.
//! - **catalog**: per-tag API catalog files.
//!
//! [`generate`] is the entry point used by drivers: it returns every logical section as
//! text plus the files to write (`types.ts` and, when enabled, the catalog).

pub mod catalog;
pub mod naming;
pub mod render;

use crate::config::{Config, ExportStyle};
use crate::error::AppResult;
use crate::ir::{Member, RecordType, TypeExpr};
use crate::oas::document::LoadedDocument;
use crate::oas::ordering::ordered;
use crate::transform::{assemble, AssembledDocument};
use indexmap::IndexMap;
use render::{render, render_record};
use std::fmt;

/// File name of the generated type module.
pub const TYPES_FILE: &str = "types.ts";

const BANNER: &str = "/**\n * This file was auto-generated by oats.\n * Do not make direct changes to the file.\n */\n";

/// A logical output section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionName {
    /// `paths`
    Paths,
    /// `webhooks`
    Webhooks,
    /// `components`
    Components,
    /// One named operation.
    Operation(String),
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionName::Paths => f.write_str("paths"),
            SectionName::Webhooks => f.write_str("webhooks"),
            SectionName::Components => f.write_str("components"),
            SectionName::Operation(name) => write!(f, "operations[{}]", naming::quote(name)),
        }
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTypes {
    /// Rendered type text per section.
    pub sections: IndexMap<SectionName, String>,
    /// File name (relative to the output directory) → contents.
    pub files: IndexMap<String, String>,
}

impl GeneratedTypes {
    /// Contents of `types.ts`.
    pub fn module(&self) -> Option<&str> {
        self.files.get(TYPES_FILE).map(String::as_str)
    }
}

/// Transforms and renders a document.
pub fn generate(doc: &LoadedDocument, config: &Config) -> AppResult<GeneratedTypes> {
    let assembled = assemble(doc, config)?;

    let mut sections = IndexMap::new();
    sections.insert(SectionName::Paths, render(&assembled.paths));
    sections.insert(SectionName::Webhooks, render(&assembled.webhooks));
    sections.insert(SectionName::Components, render(&assembled.components));
    for (name, entry) in ordered(&assembled.operations, config.alphabetize) {
        sections.insert(SectionName::Operation(name.clone()), render(&entry.ty));
    }

    let mut files = IndexMap::new();
    files.insert(TYPES_FILE.to_string(), render_module(&assembled, config));
    if config.catalog {
        files.extend(catalog::catalog_files(doc, &assembled, config));
    }

    tracing::debug!(
        sections = sections.len(),
        files = files.len(),
        "generated type module"
    );
    Ok(GeneratedTypes { sections, files })
}

/// Joins the sections into one `types.ts` module.
pub fn render_module(assembled: &AssembledDocument, config: &Config) -> String {
    let operations: Vec<Member> = ordered(&assembled.operations, config.alphabetize)
        .into_iter()
        .map(|(name, entry)| {
            Member::new(name.as_str(), entry.ty.clone())
                .readonly(config.immutable_types)
                .doc(entry.doc.clone())
        })
        .collect();
    let operations = TypeExpr::Record(RecordType::closed(operations));

    let mut out = String::from(BANNER);
    out.push('\n');
    out.push_str("export type WithHeaders<Content, Headers> = Content;\n\n");
    out.push_str(&declaration("paths", &assembled.paths, config.export_style));
    out.push_str(&declaration("webhooks", &assembled.webhooks, config.export_style));
    out.push_str(&declaration("components", &assembled.components, config.export_style));
    out.push_str("export type external = Record<string, never>;\n\n");
    out.push_str(&declaration("operations", &operations, config.export_style));
    out
}

/// `export interface name {...}` or `export type name = ...;`, followed by a blank line.
fn declaration(name: &str, expr: &TypeExpr, style: ExportStyle) -> String {
    match (style, expr) {
        (ExportStyle::Interface, TypeExpr::Record(record)) if !record.is_closed_empty() => {
            format!("export interface {} {}\n\n", name, render_record(record, 0))
        }
        _ => format!("export type {} = {};\n\n", name, render(expr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::document::load_document;

    const DOC: &str = r##"
openapi: 3.0.0
info: {title: Pets, version: "1"}
paths:
  /pets:
    get:
      operationId: listPets
      summary: List pets
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {type: array, items: {$ref: "#/components/schemas/Pet"}}
components:
  schemas:
    Pet: {type: object, properties: {id: {type: integer}}, required: [id]}
"##;

    #[test]
    fn test_sections_present() {
        let doc = load_document(DOC).unwrap();
        let out = generate(&doc, &Config::default()).unwrap();
        let names: Vec<String> = out.sections.keys().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["paths", "webhooks", "components", r#"operations["listPets"]"#]
        );
        assert_eq!(out.sections[&SectionName::Webhooks], "Record<string, never>");
        assert_eq!(out.files.len(), 1);
    }

    #[test]
    fn test_export_styles() {
        let doc = load_document(DOC).unwrap();
        let interface = generate(&doc, &Config::default()).unwrap();
        let module = interface.module().unwrap();
        assert!(module.starts_with(BANNER));
        assert!(module.contains("export interface paths {\n"));
        assert!(module.contains("export type webhooks = Record<string, never>;\n"));
        assert!(module.contains("export type external = Record<string, never>;\n"));
        assert!(module.contains("  /** List pets */\n  listPets: {\n"));

        let config = Config {
            export_style: ExportStyle::Type,
            ..Config::default()
        };
        let alias = generate(&doc, &config).unwrap();
        assert!(alias.module().unwrap().contains("export type paths = {\n"));
    }

    #[test]
    fn test_catalog_files_when_enabled() {
        let doc = load_document(DOC).unwrap();
        let config = Config {
            catalog: true,
            ..Config::default()
        };
        let out = generate(&doc, &config).unwrap();
        let names: Vec<&String> = out.files.keys().collect();
        assert_eq!(names, vec!["types.ts", "api/default.ts", "data/default.js"]);
    }
}
