#![deny(missing_docs)]

//! # TypeScript Rendering
//!
//! Prints [`TypeExpr`] trees as TypeScript type syntax. Records are multi-line with
//! two-space indentation; everything else is printed inline.

use super::naming::{property_key, quote};
use crate::ir::{ListBounds, ListType, Literal, MemberKey, Primitive, RecordType, TemplatePart, TypeExpr};
use crate::oas::pointer::Pointer;
use crate::transform::schema::MAX_TUPLE_LENGTH;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Renders `expr` at the top level.
pub fn render(expr: &TypeExpr) -> String {
    render_at(expr, 0)
}

/// Renders `expr` as if it started on a line indented `level` times.
pub fn render_at(expr: &TypeExpr, level: usize) -> String {
    match expr {
        TypeExpr::Primitive(p) => match p {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
        .to_string(),
        TypeExpr::Literal(lit) => render_literal(lit),
        TypeExpr::Reference(pointer) => index_chain(pointer),
        TypeExpr::Operation(name) => format!("operations[{}]", quote(name)),
        TypeExpr::List(list) => render_list(list, level),
        TypeExpr::Record(record) => render_record(record, level),
        TypeExpr::Union(members) => members
            .iter()
            .map(|m| render_at(m, level))
            .collect::<Vec<_>>()
            .join(" | "),
        TypeExpr::Intersection(members) => members
            .iter()
            .map(|m| match m {
                TypeExpr::Union(_) => format!("({})", render_at(m, level)),
                _ => render_at(m, level),
            })
            .collect::<Vec<_>>()
            .join(" & "),
        TypeExpr::Pick { group, keys } => {
            let keys = keys.iter().map(|k| quote(k)).collect::<Vec<_>>().join(" | ");
            format!("Pick<NonNullable<{}>, {}>", index_chain(group), keys)
        }
        TypeExpr::WithHeaders { content, headers } => format!(
            "WithHeaders<{}, {}>",
            render_at(content, level),
            render_record(headers, level)
        ),
        TypeExpr::Never => "never".to_string(),
        TypeExpr::Unknown => "unknown".to_string(),
        TypeExpr::Void => "void".to_string(),
    }
}

/// `components["schemas"]["Pet"]`; the document root itself is `unknown`.
pub fn index_chain(pointer: &Pointer) -> String {
    let mut segments = pointer.segments().iter();
    let Some(first) = segments.next() else {
        return "unknown".to_string();
    };
    let mut out = first.clone();
    for segment in segments {
        let _ = write!(out, "[{}]", quote(segment));
    }
    out
}

/// A JSDoc block for `text` at `level`, ending with a newline.
pub fn render_doc(text: &str, level: usize) -> String {
    let pad = INDENT.repeat(level);
    let escaped = text.replace("*/", "*\\/");
    let lines: Vec<&str> = escaped.lines().collect();
    if lines.len() == 1 {
        return format!("{}/** {} */\n", pad, lines[0]);
    }
    let mut out = format!("{}/**\n", pad);
    for line in lines {
        if line.is_empty() {
            let _ = writeln!(out, "{} *", pad);
        } else {
            let _ = writeln!(out, "{} * {}", pad, line);
        }
    }
    let _ = writeln!(out, "{} */", pad);
    out
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::String(s) => quote(s),
        Literal::Number(n) => n.to_string(),
        Literal::Boolean(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

fn render_list(list: &ListType, level: usize) -> String {
    let element = render_at(&list.element, level);
    let prefix = if list.readonly { "readonly " } else { "" };
    let needs_parens = match &*list.element {
        TypeExpr::Union(_) | TypeExpr::Intersection(_) => true,
        TypeExpr::List(inner) => inner.readonly,
        _ => false,
    };
    let array = if needs_parens {
        format!("({})[]", element)
    } else {
        format!("{}[]", element)
    };

    match list.bounds {
        ListBounds::Exact(n) | ListBounds::AtLeast(n) if n > MAX_TUPLE_LENGTH => {
            format!("{}{}", prefix, array)
        }
        ListBounds::Unbounded => format!("{}{}", prefix, array),
        ListBounds::Exact(n) => {
            let items = vec![element.as_str(); n as usize].join(", ");
            format!("{}[{}]", prefix, items)
        }
        ListBounds::AtLeast(n) => {
            let mut items = vec![element.clone(); n as usize];
            items.push(format!("...{}", array));
            format!("{}[{}]", prefix, items.join(", "))
        }
    }
}

/// Multi-line object type, or `Record<string, never>` for a closed empty record.
pub fn render_record(record: &RecordType, level: usize) -> String {
    if record.is_closed_empty() {
        return "Record<string, never>".to_string();
    }
    let pad = INDENT.repeat(level + 1);
    let mut out = String::from("{\n");

    for member in &record.members {
        if let Some(doc) = member.doc.as_deref().filter(|d| !d.trim().is_empty()) {
            out.push_str(&render_doc(doc, level + 1));
        }
        let readonly = if member.readonly { "readonly " } else { "" };
        let key = match &member.key {
            MemberKey::Name(name) => {
                let optional = if member.optional { "?" } else { "" };
                format!("{}{}", property_key(name), optional)
            }
            MemberKey::Template(parts) => format!("[path: `{}`]", render_template(parts, level)),
        };
        let _ = writeln!(
            out,
            "{}{}{}: {};",
            pad,
            readonly,
            key,
            render_at(&member.ty, level + 1)
        );
    }

    if let Some(catch_all) = &record.catch_all {
        let readonly = if record.catch_all_readonly { "readonly " } else { "" };
        let _ = writeln!(
            out,
            "{}{}[key: string]: {};",
            pad,
            readonly,
            render_at(catch_all, level + 1)
        );
    }

    out.push_str(&INDENT.repeat(level));
    out.push('}');
    out
}

fn render_template(parts: &[TemplatePart], level: usize) -> String {
    parts
        .iter()
        .map(|part| match part {
            TemplatePart::Text(text) => text
                .replace('\\', "\\\\")
                .replace('`', "\\`")
                .replace("${", "\\${"),
            TemplatePart::Param(ty) => format!("${{{}}}", render_at(ty, level)),
        })
        .collect()
}
