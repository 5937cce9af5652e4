#![deny(missing_docs)]

//! # API Catalog
//!
//! Per-tag companion files for the runtime client: `api/<tag>.ts` declares which
//! operation type each path and method invokes, `data/<tag>.js` carries the runtime
//! data (server name, header and cookie parameter names).

use super::naming::{file_stem, quote};
use super::render::render_doc;
use crate::config::Config;
use crate::oas::document::LoadedDocument;
use crate::oas::models::Method;
use crate::transform::{AssembledDocument, OperationEntry, RouteKind};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Tag used for operations that declare none.
pub const DEFAULT_TAG: &str = "default";

/// Operations of one tag, grouped by path in first-seen order.
#[derive(Debug, Default)]
struct TagGroup<'a> {
    paths: IndexMap<&'a str, Vec<(Method, &'a OperationEntry)>>,
}

/// Builds the catalog files for every tag, keyed by relative file name.
pub fn catalog_files(
    doc: &LoadedDocument,
    assembled: &AssembledDocument,
    config: &Config,
) -> IndexMap<String, String> {
    let server = doc
        .spec
        .info
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TAG);

    let mut files = IndexMap::new();
    let mut stems = HashSet::new();
    for (tag, group) in group_by_tag(assembled) {
        let stem = unique_stem(&tag, &mut stems);
        let description = doc
            .spec
            .tags
            .iter()
            .find(|declared| declared.name == tag)
            .and_then(|declared| declared.description.as_deref())
            .filter(|d| !d.trim().is_empty());
        files.insert(
            format!("api/{}.ts", stem),
            api_file(&group, &stem, &config.runtime_module, description),
        );
        files.insert(format!("data/{}.js", stem), data_file(&group, server));
    }
    tracing::debug!(files = files.len(), "built API catalog");
    files
}

fn group_by_tag(assembled: &AssembledDocument) -> IndexMap<String, TagGroup<'_>> {
    let mut groups: IndexMap<String, TagGroup<'_>> = IndexMap::new();
    for entry in assembled.operations.values() {
        if entry.kind != RouteKind::Path {
            continue;
        }
        let tags: Vec<&str> = if entry.tags.is_empty() {
            vec![DEFAULT_TAG]
        } else {
            entry.tags.iter().map(String::as_str).collect()
        };
        for tag in tags {
            groups
                .entry(tag.to_string())
                .or_default()
                .paths
                .entry(entry.path.as_str())
                .or_default()
                .push((entry.method, entry));
        }
    }
    groups
}

fn unique_stem(tag: &str, taken: &mut HashSet<String>) -> String {
    let base = file_stem(tag);
    let mut stem = base.clone();
    let mut n = 2;
    while !taken.insert(stem.clone()) {
        stem = format!("{}_{}", base, n);
        n += 1;
    }
    stem
}

fn api_file(
    group: &TagGroup<'_>,
    stem: &str,
    runtime_module: &str,
    description: Option<&str>,
) -> String {
    let mut lines = Vec::new();
    if let Some(description) = description {
        lines.push(render_doc(description, 0).trim_end().to_string());
    }
    lines.extend([
        format!("import {{ NewApis, Invokable }} from {}", quote(runtime_module)),
        "import { operations } from \"../types\"".to_string(),
        format!("import data from {}", quote(&format!("../data/{}", stem))),
        String::new(),
        "export type paths = {".to_string(),
    ]);
    for (path, methods) in &group.paths {
        lines.push(format!("  {}: {{", quote(path)));
        for (method, entry) in methods {
            lines.push(format!(
                "    {}: Invokable<operations[{}]>",
                method.as_str(),
                quote(&entry.name)
            ));
        }
        lines.push("  }".to_string());
    }
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push("export default NewApis<paths>(data)".to_string());
    lines.push(String::new());
    lines.join("\n")
}

fn data_file(group: &TagGroup<'_>, server: &str) -> String {
    let mut paths = Map::new();
    for (path, methods) in &group.paths {
        let mut per_method = Map::new();
        for (method, entry) in methods {
            let mut infos = Map::new();
            if !entry.header_params.is_empty() {
                infos.insert("headers".into(), json!(entry.header_params));
            }
            if !entry.cookie_params.is_empty() {
                infos.insert("cookies".into(), json!(entry.cookie_params));
            }
            per_method.insert(method.as_str().to_string(), Value::Object(infos));
        }
        paths.insert(path.to_string(), Value::Object(per_method));
    }
    let data = json!({ "server": server, "paths": paths });
    let body = serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string());
    format!("export default {}\n", body)
}
