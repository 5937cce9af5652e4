#![deny(missing_docs)]

//! # Schema Transformer
//!
//! The recursive core: Schema Object × configuration × pointer → [`TypeExpr`].
//!
//! A `$ref` always becomes [`TypeExpr::Reference`] and is never expanded in place, so
//! cyclic graphs terminate. The only other recursion bound is the nesting ceiling
//! enforced by [`TransformContext::nested`].

use super::comments::describe;
use super::TransformContext;
use crate::error::AppResult;
use crate::ir::{ListBounds, ListType, Literal, Member, Primitive, RecordType, TypeExpr};
use crate::oas::pointer::Pointer;
use crate::oas::ref_utils::normalize_ref_to_local;
use crate::oas::schema::{
    AdditionalProperties, ArraySchema, ComposedSchema, Discriminator, ObjectSchema, ScalarKind,
    SchemaMeta, SchemaNode,
};
use serde_json::Value;

/// Longest tuple synthesized from `minItems` / `maxItems`; larger bounds stay plain lists.
pub const MAX_TUPLE_LENGTH: u64 = 30;

/// Transforms one schema node located at `pointer`.
pub fn transform_schema(
    node: &SchemaNode,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    ctx.nested(pointer, |ctx| transform_node(node, pointer, ctx))
}

fn transform_node(
    node: &SchemaNode,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let expr = match node {
        SchemaNode::Reference(r) => {
            let target = ctx.reference(&r.reference, pointer)?;
            return Ok(TypeExpr::Reference(target));
        }
        SchemaNode::Unknown(_) => return Ok(TypeExpr::Unknown),
        SchemaNode::Composed(composed) => transform_composed(composed, pointer, ctx)?,
        SchemaNode::Object(object) => TypeExpr::Record(transform_object(object, pointer, ctx)?),
        SchemaNode::Array(array) => transform_array(array, pointer, ctx)?,
        SchemaNode::Enumerated(e) => TypeExpr::union(e.values.iter().map(literal)),
        SchemaNode::Primitive(p) => TypeExpr::union(p.kinds.iter().map(|k| scalar(*k))),
    };
    Ok(apply_nullable(expr, node.meta(), ctx))
}

fn apply_nullable(expr: TypeExpr, meta: &SchemaMeta, ctx: &TransformContext<'_>) -> TypeExpr {
    let suppressed = ctx.config.default_non_nullable && meta.default.is_some();
    if meta.nullable && !suppressed {
        expr.or_null()
    } else {
        expr
    }
}

fn scalar(kind: ScalarKind) -> TypeExpr {
    match kind {
        ScalarKind::String => TypeExpr::primitive(Primitive::String),
        ScalarKind::Integer | ScalarKind::Number => TypeExpr::primitive(Primitive::Number),
        ScalarKind::Boolean => TypeExpr::primitive(Primitive::Boolean),
        ScalarKind::Null => TypeExpr::null(),
    }
}

fn literal(value: &Value) -> TypeExpr {
    match value {
        Value::Null => TypeExpr::null(),
        Value::Bool(b) => TypeExpr::Literal(Literal::Boolean(*b)),
        Value::Number(n) => TypeExpr::Literal(Literal::Number(n.clone())),
        Value::String(s) => TypeExpr::Literal(Literal::String(s.clone())),
        Value::Array(_) | Value::Object(_) => TypeExpr::Unknown,
    }
}

fn transform_composed(
    composed: &ComposedSchema,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let mut parts = Vec::new();

    for (i, member) in composed.all_of.iter().enumerate() {
        let member_ptr = pointer.child("allOf").child(i.to_string());
        parts.push(transform_schema(member, &member_ptr, ctx)?);
    }

    for (keyword, members) in [("oneOf", &composed.one_of), ("anyOf", &composed.any_of)] {
        if members.is_empty() {
            continue;
        }
        let order = member_order(members, composed.discriminator.as_ref(), ctx);
        let mut variants = Vec::with_capacity(members.len());
        for (i, tag) in order {
            let member_ptr = pointer.child(keyword).child(i.to_string());
            let variant = transform_schema(&members[i], &member_ptr, ctx)?;
            variants.push(match (tag, composed.discriminator.as_ref()) {
                (Some(tag), Some(discriminator)) => tagged(
                    variant,
                    &discriminator.property_name,
                    tag,
                    ctx.config.immutable_types,
                ),
                _ => variant,
            });
        }
        parts.push(TypeExpr::union(variants));
    }

    if let Some(base) = &composed.base {
        parts.push(transform_schema(base, pointer, ctx)?);
    }

    Ok(TypeExpr::intersection(parts))
}

/// Index order for union members: discriminator mapping targets first, in mapping order,
/// then the remaining members in declaration order. Mapped members carry their mapping key.
fn member_order<'d>(
    members: &[SchemaNode],
    discriminator: Option<&'d Discriminator>,
    ctx: &TransformContext<'_>,
) -> Vec<(usize, Option<&'d str>)> {
    let mut order: Vec<(usize, Option<&'d str>)> = Vec::with_capacity(members.len());
    if let Some(discriminator) = discriminator {
        let self_uri = ctx.resolver.self_uri();
        let targets: Vec<Option<Pointer>> = members
            .iter()
            .map(|m| match m {
                SchemaNode::Reference(r) => local_pointer(&r.reference, self_uri),
                _ => None,
            })
            .collect();

        for (key, target) in &discriminator.mapping {
            let Some(wanted) = mapping_pointer(target, self_uri) else {
                continue;
            };
            let found = targets
                .iter()
                .position(|t| t.as_ref() == Some(&wanted))
                .filter(|i| !order.iter().any(|(seen, _)| seen == i));
            if let Some(i) = found {
                order.push((i, Some(key.as_str())));
            }
        }
    }
    for i in 0..members.len() {
        if !order.iter().any(|(seen, _)| *seen == i) {
            order.push((i, None));
        }
    }
    order
}

/// `variant & { <property>: "<tag>" }`
fn tagged(variant: TypeExpr, property: &str, tag: &str, readonly: bool) -> TypeExpr {
    let narrowing = Member::new(property, TypeExpr::Literal(Literal::String(tag.to_string())))
        .readonly(readonly);
    TypeExpr::intersection(vec![variant, TypeExpr::Record(RecordType::closed(vec![narrowing]))])
}

/// Mapping values are either references or bare schema names.
fn mapping_pointer(target: &str, self_uri: Option<&str>) -> Option<Pointer> {
    if target.contains('#') || target.contains('/') {
        local_pointer(target, self_uri)
    } else {
        Some(Pointer::from_segments(["components", "schemas", target]))
    }
}

fn local_pointer(reference: &str, self_uri: Option<&str>) -> Option<Pointer> {
    normalize_ref_to_local(reference, self_uri).and_then(|local| Pointer::parse(&local))
}

/// Builds the record for an object schema. Shared with components and parameters.
pub(crate) fn transform_object(
    object: &ObjectSchema,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<RecordType> {
    let immutable = ctx.config.immutable_types;
    let mut members = Vec::with_capacity(object.properties.len());

    for (name, property) in &object.properties {
        let property_ptr = pointer.child("properties").child(name.as_str());
        let ty = transform_schema(property, &property_ptr, ctx)?;
        members.push(
            Member::new(name.as_str(), ty)
                .optional(!object.required.contains(name))
                .readonly(immutable || property.meta().read_only)
                .doc(describe(property.meta())),
        );
    }

    let catch_all = match &object.additional_properties {
        AdditionalProperties::Schema(schema) => {
            let extra_ptr = pointer.child("additionalProperties");
            Some(transform_schema(schema, &extra_ptr, ctx)?)
        }
        AdditionalProperties::Allowed(true) => Some(TypeExpr::Unknown),
        AdditionalProperties::Allowed(false) => None,
        AdditionalProperties::Absent => ctx.config.additional_properties.then_some(TypeExpr::Unknown),
    };

    Ok(RecordType {
        members,
        catch_all: catch_all.map(Box::new),
        catch_all_readonly: immutable,
    })
}

fn transform_array(
    array: &ArraySchema,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let readonly = ctx.config.immutable_types;
    let Some(items) = &array.items else {
        return Ok(TypeExpr::List(ListType {
            element: Box::new(TypeExpr::Unknown),
            bounds: ListBounds::Unbounded,
            readonly,
        }));
    };

    let element = transform_schema(items, &pointer.child("items"), ctx)?;
    let bounds = if ctx.config.support_array_length {
        match (array.min_items, array.max_items) {
            (Some(min), _) if min == 0 || min > MAX_TUPLE_LENGTH => ListBounds::Unbounded,
            (Some(min), Some(max)) if min == max => ListBounds::Exact(min),
            (Some(min), _) => ListBounds::AtLeast(min),
            (None, _) => ListBounds::Unbounded,
        }
    } else {
        ListBounds::Unbounded
    };

    Ok(TypeExpr::List(ListType {
        element: Box::new(element),
        bounds,
        readonly,
    }))
}
