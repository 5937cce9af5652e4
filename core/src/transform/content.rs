#![deny(missing_docs)]

//! # Content Transformer
//!
//! Folds a content map (media type → Media Type Object) into one union. Media types are
//! visited in declaration order; they are never alphabetized.

use super::schema::transform_schema;
use super::TransformContext;
use crate::error::AppResult;
use crate::ir::TypeExpr;
use crate::oas::models::Content;
use crate::oas::pointer::Pointer;

/// What the content map belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRole {
    /// A request body or parameter.
    Request,
    /// A response or header.
    Response,
}

/// Transforms the content map found at `container/content`.
///
/// A response map where no entry declares a schema (including an empty map) is `Never`.
/// Otherwise an empty map is `Void` and a schema-less entry contributes `Unknown`.
pub fn transform_content(
    content: &Content,
    container: &Pointer,
    role: ContentRole,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    if role == ContentRole::Response && content.values().all(|media| media.schema.is_none()) {
        return Ok(TypeExpr::Never);
    }
    if content.is_empty() {
        return Ok(TypeExpr::Void);
    }

    let base = container.child("content");
    let mut variants = Vec::with_capacity(content.len());
    for (media_type, media) in content {
        let ty = match &media.schema {
            Some(schema) => {
                let schema_ptr = base.child(media_type.as_str()).child("schema");
                transform_schema(schema, &schema_ptr, ctx)?
            }
            None => TypeExpr::Unknown,
        };
        variants.push(ty);
    }
    Ok(TypeExpr::union(variants))
}
