#![deny(missing_docs)]

//! # Naming
//!
//! Identifier checks and string quoting for emitted TypeScript.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// True when `name` can be used as a bare property key.
pub fn is_identifier(name: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    let ident_re =
        IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Invalid regex"));
    ident_re.is_match(name)
}

/// A JSON/TypeScript string literal for `text`.
pub fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// `name` bare when it is an identifier, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// A file-system friendly stem for a tag name.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_key() {
        assert_eq!(property_key("petId"), "petId");
        assert_eq!(property_key("$ref"), "$ref");
        assert_eq!(property_key("/pets/{id}"), "\"/pets/{id}\"");
        assert_eq!(property_key("200"), "\"200\"");
        assert_eq!(property_key("x-rate-limit"), "\"x-rate-limit\"");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("pet store"), "pet_store");
        assert_eq!(file_stem("../etc"), ".._etc");
        assert_eq!(file_stem(""), "_");
    }
}
