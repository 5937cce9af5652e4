#![deny(missing_docs)]

//! # Comments
//!
//! Builds JSDoc text from descriptive keywords. Comments are attached to record members
//! only and never influence type identity.

use crate::oas::models::{Header, Operation, Parameter, Response};
use crate::oas::schema::SchemaMeta;
use serde_json::Value;

/// Comment for a schema: title, `Format:`, `@deprecated`, description, `@default`,
/// `@example`. Returns `None` when there is nothing to say.
pub fn describe(meta: &SchemaMeta) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(title) = non_empty(meta.title.as_deref()) {
        lines.push(title.to_string());
    }
    if let Some(format) = non_empty(meta.format.as_deref()) {
        lines.push(format!("Format: {}", format));
    }
    if meta.deprecated {
        lines.push("@deprecated".to_string());
    }
    push_description(&mut lines, meta.description.as_deref(), meta.title.is_some());
    if let Some(default) = &meta.default {
        lines.push(format!("@default {}", display_value(default)));
    }
    if let Some(example) = &meta.example {
        lines.push(format!("@example {}", display_value(example)));
    }
    join(lines)
}

/// Comment for an operation: summary, `@deprecated`, description.
pub fn describe_operation(op: &Operation) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(summary) = non_empty(op.summary.as_deref()) {
        lines.push(summary.to_string());
    }
    if op.deprecated {
        lines.push("@deprecated".to_string());
    }
    push_description(&mut lines, op.description.as_deref(), op.summary.is_some());
    join(lines)
}

/// Comment for a parameter, falling back to its schema's keywords.
pub fn describe_parameter(param: &Parameter) -> Option<String> {
    let mut lines = Vec::new();
    if param.deprecated {
        lines.push("@deprecated".to_string());
    }
    if let Some(description) = non_empty(param.description.as_deref()) {
        lines.push(description.to_string());
    }
    if let Some(example) = &param.example {
        lines.push(format!("@example {}", display_value(example)));
    }
    if lines.is_empty() {
        return param.schema.as_ref().and_then(|s| describe(s.meta()));
    }
    join(lines)
}

/// Comment for a response entry: description, then the first media-type example.
pub fn describe_response(response: &Response) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(description) = non_empty(response.description.as_deref()) {
        lines.push(description.to_string());
    }
    let example = response
        .content
        .iter()
        .flat_map(|content| content.values())
        .find_map(|media| media.example.as_ref());
    if let Some(example) = example {
        lines.push(format!("@example {}", display_value(example)));
    }
    join(lines)
}

/// Comment for a header, falling back to its schema's keywords.
pub fn describe_header(header: &Header) -> Option<String> {
    let mut lines = Vec::new();
    if header.deprecated {
        lines.push("@deprecated".to_string());
    }
    if let Some(description) = non_empty(header.description.as_deref()) {
        lines.push(description.to_string());
    }
    if lines.is_empty() {
        return header.schema.as_ref().and_then(|s| describe(s.meta()));
    }
    join(lines)
}

fn push_description(lines: &mut Vec<String>, description: Option<&str>, has_heading: bool) {
    if let Some(description) = non_empty(description) {
        if has_heading {
            lines.push(format!("@description {}", description));
        } else {
            lines.push(description.to_string());
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn join(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
