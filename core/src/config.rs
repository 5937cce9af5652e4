#![deny(missing_docs)]

//! # Configuration
//!
//! Options that change the shape of the generated types without changing their meaning.
//! A `Config` is immutable for the duration of one transformation run; batch drivers hand
//! every document its own clone.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default ceiling for schema nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default module specifier imported by generated API catalog files.
pub const DEFAULT_RUNTIME_MODULE: &str = "@oats/runtime";

/// Surface form of top-level declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    /// `export interface paths { ... }`
    #[default]
    Interface,
    /// `export type paths = { ... };`
    #[serde(alias = "type-alias")]
    Type,
}

/// Transformation options.
///
/// Keys are camelCase when loaded from a file, matching the CLI flag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Sort components, responses, headers, paths and webhooks by name.
    pub alphabetize: bool,
    /// Mark every record member and every collection as `readonly`.
    pub immutable_types: bool,
    /// Treat objects without an explicit `additionalProperties` as open.
    #[serde(alias = "additionalPropertiesDefault")]
    pub additional_properties: bool,
    /// Do not add `| null` to nullable schemas that declare a `default`.
    pub default_non_nullable: bool,
    /// Synthesize tuples from `minItems` / `maxItems`.
    pub support_array_length: bool,
    /// Declaration form for record sections.
    pub export_style: ExportStyle,
    /// Render path keys as template literal types using path parameter types.
    pub path_params_as_types: bool,
    /// Maximum schema nesting depth before the run fails.
    pub max_depth: usize,
    /// Emit per-tag API catalog files next to the type module.
    pub catalog: bool,
    /// Module specifier imported by API catalog files.
    pub runtime_module: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alphabetize: false,
            immutable_types: false,
            additional_properties: false,
            default_non_nullable: false,
            support_array_length: false,
            export_style: ExportStyle::default(),
            path_params_as_types: false,
            max_depth: DEFAULT_MAX_DEPTH,
            catalog: false,
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
        }
    }
}

impl Config {
    /// Parses a configuration from YAML or JSON text.
    pub fn from_yaml_str(text: &str) -> AppResult<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| AppError::Parse(format!("Failed to parse configuration: {}", e)))
    }

    /// Reads a configuration file (`.yaml`, `.yml` or `.json`).
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
