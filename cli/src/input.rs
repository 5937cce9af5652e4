#![deny(missing_docs)]

//! # Input Discovery
//!
//! Expands the positional INPUT argument into the list of documents to process:
//! stdin, a single file, every OpenAPI-looking file under a directory, the matches of a
//! glob pattern, or a remote URL.

use crate::error::{CliError, CliResult};
use crate::fetch::{fetch, FetchOptions};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up when walking a directory.
const DOCUMENT_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Where one document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input.
    Stdin,
    /// A local file.
    File(PathBuf),
    /// An `http(s)://` URL.
    Url(String),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::Url(url) => f.write_str(url),
        }
    }
}

impl InputSource {
    /// Name used for the per-document output directory.
    pub fn stem(&self) -> String {
        let raw = match self {
            InputSource::Stdin => None,
            InputSource::File(path) => path.file_stem().map(|s| s.to_string_lossy().to_string()),
            InputSource::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|u| u.trim_end_matches('/').rsplit('/').next())
                .map(Path::new)
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().to_string()),
        };
        raw.filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or_else(|| "api".to_string())
    }

    /// Reads the document text.
    pub fn read(&self, options: &FetchOptions) -> CliResult<String> {
        match self {
            InputSource::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
            InputSource::File(path) => Ok(std::fs::read_to_string(path)?),
            InputSource::Url(url) => fetch(url, options),
        }
    }
}

/// Expands the INPUT argument. `None` and `-` mean stdin.
pub fn collect_inputs(input: Option<&str>) -> CliResult<Vec<InputSource>> {
    let Some(input) = input.filter(|i| *i != "-") else {
        return Ok(vec![InputSource::Stdin]);
    };
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(vec![InputSource::Url(input.to_string())]);
    }

    let path = Path::new(input);
    if path.is_dir() {
        return walk_directory(path);
    }
    if path.is_file() {
        return Ok(vec![InputSource::File(path.to_path_buf())]);
    }
    if input.contains(['*', '?', '[']) {
        return expand_glob(input);
    }
    Err(CliError::General(format!("Input not found: {}", input)))
}

fn walk_directory(dir: &Path) -> CliResult<Vec<InputSource>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CliError::General(e.to_string()))?;
        let path = entry.path();
        if entry.file_type().is_file() && has_document_extension(path) {
            files.push(InputSource::File(path.to_path_buf()));
        }
    }
    if files.is_empty() {
        return Err(CliError::General(format!(
            "No .yaml, .yml or .json files under {}",
            dir.display()
        )));
    }
    tracing::debug!(dir = %dir.display(), count = files.len(), "discovered documents");
    Ok(files)
}

fn expand_glob(pattern: &str) -> CliResult<Vec<InputSource>> {
    let entries = glob::glob(pattern)
        .map_err(|e| CliError::General(format!("Invalid glob pattern '{}': {}", pattern, e)))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CliError::General(e.to_string()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(CliError::General(format!("No files match {}", pattern)));
    }
    Ok(files.into_iter().map(InputSource::File).collect())
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Output directory names for `inputs`, suffixing repeated stems.
pub fn unique_stems(inputs: &[InputSource]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let base = input.stem();
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.clone()) {
                stem = format!("{}_{}", base, n);
                n += 1;
            }
            stem
        })
        .collect()
}
