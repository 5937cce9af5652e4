#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads the configuration, expands the inputs and runs the core generator over every
//! document in parallel. Each document gets its own clone of the configuration; a
//! failing document does not stop the others, but makes the command fail.

use crate::error::{CliError, CliResult};
use crate::fetch::FetchOptions;
use crate::input::{collect_inputs, unique_stems, InputSource};
use oats_core::{generate_from_str, Config, ExportStyle, GeneratedTypes};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for generating types.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// File, directory, glob pattern or http(s) URL. Reads stdin when omitted.
    pub input: Option<String>,

    /// Output directory. Without it a single document's types are printed to stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// YAML or JSON configuration file; flags override its values.
    #[clap(long, env = "OATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit `export type X = ...` instead of interfaces.
    #[clap(short = 't', long)]
    pub export_type: bool,

    /// Mark every generated member and collection as readonly.
    #[clap(long)]
    pub immutable_types: bool,

    /// Treat objects without `additionalProperties` as open.
    #[clap(long)]
    pub additional_properties: bool,

    /// Drop `| null` from nullable schemas that declare a default.
    #[clap(long)]
    pub default_non_nullable: bool,

    /// Build tuples from `minItems` / `maxItems`.
    #[clap(long)]
    pub support_array_length: bool,

    /// Render path keys as template literal types.
    #[clap(long)]
    pub path_params_as_types: bool,

    /// Sort named entries alphabetically.
    #[clap(long)]
    pub alphabetize: bool,

    /// Also emit per-tag API catalog files.
    #[clap(long)]
    pub catalog: bool,

    /// Value of the Authorization header for remote inputs.
    #[clap(long, env = "OATS_AUTH")]
    pub auth: Option<String>,

    /// Request headers for remote inputs, as a JSON object.
    #[clap(long)]
    pub headers_object: Option<String>,

    /// Request header for remote inputs (`key: value`). Repeatable.
    #[clap(short = 'x', long = "header")]
    pub header: Vec<String>,

    /// HTTP method for remote inputs.
    #[clap(short = 'm', long, default_value = "GET")]
    pub http_method: String,
}

impl GenerateArgs {
    /// The configuration file (if any) with flag overrides applied.
    pub fn build_config(&self) -> CliResult<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if self.export_type {
            config.export_style = ExportStyle::Type;
        }
        config.immutable_types |= self.immutable_types;
        config.additional_properties |= self.additional_properties;
        config.default_non_nullable |= self.default_non_nullable;
        config.support_array_length |= self.support_array_length;
        config.path_params_as_types |= self.path_params_as_types;
        config.alphabetize |= self.alphabetize;
        config.catalog |= self.catalog;
        Ok(config)
    }

    /// Request options for URL inputs.
    pub fn fetch_options(&self) -> CliResult<FetchOptions> {
        FetchOptions::from_flags(
            &self.http_method,
            self.auth.as_deref(),
            self.headers_object.as_deref(),
            &self.header,
        )
    }
}

/// One document's result.
#[derive(Debug)]
struct Outcome {
    source: InputSource,
    result: CliResult<GeneratedTypes>,
}

/// Runs generation for every input.
///
/// Returns the text to print on stdout when no output directory was given.
pub fn execute(args: &GenerateArgs) -> CliResult<Option<String>> {
    let inputs = collect_inputs(args.input.as_deref())?;
    if inputs.len() > 1 && args.output.is_none() {
        return Err(CliError::General(format!(
            "{} documents found; --output is required for more than one",
            inputs.len()
        )));
    }
    let config = args.build_config()?;
    let fetch = args.fetch_options()?;
    tracing::debug!(?config, inputs = inputs.len(), "starting generation");

    let outcomes: Vec<Outcome> = inputs
        .into_par_iter()
        .map(|source| {
            let config = config.clone();
            let result = source
                .read(&fetch)
                .and_then(|text| generate_from_str(&text, &config).map_err(CliError::from));
            Outcome { source, result }
        })
        .collect();

    let Some(output) = &args.output else {
        return outcomes
            .into_iter()
            .next()
            .map(|outcome| {
                let generated = outcome.result?;
                if generated.files.len() > 1 {
                    tracing::warn!("catalog files are only written with --output");
                }
                Ok(generated.module().unwrap_or_default().to_string())
            })
            .transpose();
    };

    let sources: Vec<InputSource> = outcomes.iter().map(|o| o.source.clone()).collect();
    let stems = unique_stems(&sources);
    let nested = outcomes.len() > 1;
    let total = outcomes.len();
    let mut failed = 0;

    for (outcome, stem) in outcomes.into_iter().zip(stems) {
        let dir = if nested {
            output.join(&stem)
        } else {
            output.clone()
        };
        let written = outcome
            .result
            .and_then(|generated| write_files(&dir, &generated));
        match written {
            Ok(count) => {
                tracing::info!(input = %outcome.source, dir = %dir.display(), files = count, "wrote types");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(input = %outcome.source, error = %e, "generation failed");
                eprintln!("error: {}: {}", outcome.source, e);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::General(format!(
            "{} of {} documents failed",
            failed, total
        )));
    }
    Ok(None)
}

fn write_files(dir: &Path, generated: &GeneratedTypes) -> CliResult<usize> {
    for (name, contents) in &generated.files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
    }
    Ok(generated.files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PETS: &str = r#"
openapi: 3.0.3
info: {title: Pets, version: "1"}
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      responses:
        "200": {description: ok}
"#;

    fn args(input: &Path, output: Option<PathBuf>) -> GenerateArgs {
        GenerateArgs {
            input: Some(input.to_string_lossy().to_string()),
            output,
            config: None,
            export_type: false,
            immutable_types: false,
            additional_properties: false,
            default_non_nullable: false,
            support_array_length: false,
            path_params_as_types: false,
            alphabetize: false,
            catalog: false,
            auth: None,
            headers_object: None,
            header: Vec::new(),
            http_method: "GET".to_string(),
        }
    }

    #[test]
    fn test_single_input_prints_module() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pets.yaml");
        fs::write(&input, PETS).unwrap();

        let printed = execute(&args(&input, None)).unwrap().unwrap();
        assert!(printed.contains("export interface operations {"));
        assert!(printed.contains("listPets: {"));
    }

    #[test]
    fn test_directory_writes_one_folder_per_document() {
        let dir = tempdir().unwrap();
        let specs = dir.path().join("specs");
        fs::create_dir(&specs).unwrap();
        fs::write(specs.join("pets.yaml"), PETS).unwrap();
        fs::write(specs.join("store.json"), r#"{"openapi": "3.1.0", "info": {"title": "s", "version": "1"}}"#)
            .unwrap();
        let out = dir.path().join("out");

        let mut run = args(&specs, Some(out.clone()));
        run.catalog = true;
        assert!(execute(&run).unwrap().is_none());
        assert!(out.join("pets").join("types.ts").is_file());
        assert!(out.join("pets").join("api").join("pets.ts").is_file());
        assert!(out.join("pets").join("data").join("pets.js").is_file());
        assert!(out.join("store").join("types.ts").is_file());
    }

    #[test]
    fn test_multiple_inputs_need_output() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), PETS).unwrap();
        fs::write(dir.path().join("b.yaml"), PETS).unwrap();
        assert!(execute(&args(dir.path(), None)).is_err());
    }

    #[test]
    fn test_failure_is_reported_after_other_documents() {
        let dir = tempdir().unwrap();
        let specs = dir.path().join("specs");
        fs::create_dir(&specs).unwrap();
        fs::write(specs.join("good.yaml"), PETS).unwrap();
        fs::write(specs.join("old.yaml"), "swagger: \"2.0\"\ninfo: {title: t, version: v}\n").unwrap();
        let out = dir.path().join("out");

        let err = execute(&args(&specs, Some(out.clone()))).unwrap_err();
        assert!(err.to_string().contains("1 of 2 documents failed"));
        assert!(out.join("good").join("types.ts").is_file());
        assert!(!out.join("old").exists());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("oats.yaml");
        fs::write(&config_path, "alphabetize: true\nexportStyle: interface\n").unwrap();

        let mut run = args(dir.path(), None);
        run.config = Some(config_path);
        run.export_type = true;
        run.immutable_types = true;
        let config = run.build_config().unwrap();
        assert!(config.alphabetize);
        assert!(config.immutable_types);
        assert_eq!(config.export_style, ExportStyle::Type);
    }
}
