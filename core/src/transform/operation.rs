#![deny(missing_docs)]

//! # Operation Transformer
//!
//! Builds the four-member record of one operation:
//!
//! - `parameters`: inline parameters merged into one record, intersected with `Pick`
//!   projections over referenced parameter groups. `void` when there are none.
//! - `content`: the request body, optional unless `required`. `void` when absent.
//! - `responses`: status codes starting with `2`.
//! - `exceptions`: every other status code, including `default`.

use super::comments::{
    describe, describe_header, describe_operation, describe_parameter, describe_response,
};
use super::content::{transform_content, ContentRole};
use super::schema::transform_schema;
use super::TransformContext;
use crate::error::AppResult;
use crate::ir::{Member, Primitive, RecordType, TypeExpr};
use crate::oas::models::{
    Header, Method, Operation, Parameter, ParameterLocation, RefOr, RequestBody, Response,
};
use crate::oas::ordering::ordered;
use crate::oas::pointer::Pointer;
use indexmap::IndexMap;

/// Distinguishes operations under `paths` from those under `webhooks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// A standard HTTP endpoint defined in `paths`.
    Path,
    /// An event receiver defined in `webhooks`.
    Webhook,
}

/// Where an operation sits in the document.
#[derive(Debug, Clone)]
pub struct OperationSite<'d> {
    /// Section the operation was found in.
    pub kind: RouteKind,
    /// URL template or webhook name.
    pub path: &'d str,
    /// HTTP method.
    pub method: Method,
    /// Pointer of the Operation Object.
    pub pointer: Pointer,
    /// Parameters declared on the enclosing Path Item.
    pub shared: &'d [RefOr<Parameter>],
    /// Pointer of the enclosing Path Item.
    pub path_item: Pointer,
}

/// A transformed operation together with the metadata the emitters need.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationEntry {
    /// `operationId`, or `"<method> <path>"` when absent.
    pub name: String,
    /// Pointer of the Operation Object.
    pub location: Pointer,
    /// Section the operation was found in.
    pub kind: RouteKind,
    /// HTTP method.
    pub method: Method,
    /// URL template or webhook name.
    pub path: String,
    /// Declared tags.
    pub tags: Vec<String>,
    /// Path parameters in merge order with their types.
    pub path_params: Vec<(String, TypeExpr)>,
    /// Names of header parameters.
    pub header_params: Vec<String>,
    /// Names of cookie parameters.
    pub cookie_params: Vec<String>,
    /// Leading comment.
    pub doc: Option<String>,
    /// The operation record.
    pub ty: TypeExpr,
}

/// A parameter after path-level and operation-level lists have been merged.
#[derive(Debug, Clone)]
struct MergedParameter {
    param: Parameter,
    /// Pointer of the inline object, or of the `$ref` target.
    pointer: Pointer,
    /// Set when the parameter was declared through a `$ref` into a parameter group.
    group: Option<(Pointer, String)>,
}

/// Transforms one operation. Shared path-level parameters are merged in; operation-level
/// parameters override them on `(name, in)`.
pub fn transform_operation(
    op: &Operation,
    site: &OperationSite<'_>,
    ctx: &mut TransformContext<'_>,
) -> AppResult<OperationEntry> {
    let name = op
        .operation_id
        .clone()
        .unwrap_or_else(|| format!("{} {}", site.method.as_str(), site.path));
    tracing::debug!(operation = %name, location = %site.pointer, "transforming operation");

    let merged = merge_parameters(op, site, ctx)?;
    let immutable = ctx.config.immutable_types;

    let mut path_params = Vec::new();
    let mut header_params = Vec::new();
    let mut cookie_params = Vec::new();
    for p in &merged {
        match p.param.location {
            ParameterLocation::Path => {
                path_params.push((p.param.name.clone(), parameter_type(&p.param, &p.pointer, ctx)?))
            }
            ParameterLocation::Header => header_params.push(p.param.name.clone()),
            ParameterLocation::Cookie => cookie_params.push(p.param.name.clone()),
            ParameterLocation::Query => {}
        }
    }

    let parameters = transform_parameters(&merged, ctx)?;
    let content = transform_request_body(op.request_body.as_ref(), &site.pointer, ctx)?;
    let (responses, exceptions) = transform_responses(op, &site.pointer, ctx)?;

    let record = RecordType::closed(vec![
        Member::new("parameters", parameters).readonly(immutable),
        content.readonly(immutable),
        Member::new("responses", TypeExpr::Record(responses)).readonly(immutable),
        Member::new("exceptions", TypeExpr::Record(exceptions)).readonly(immutable),
    ]);

    Ok(OperationEntry {
        name,
        location: site.pointer.clone(),
        kind: site.kind,
        method: site.method,
        path: site.path.to_string(),
        tags: op.tags.clone(),
        path_params,
        header_params,
        cookie_params,
        doc: describe_operation(op),
        ty: TypeExpr::Record(record),
    })
}

fn merge_parameters(
    op: &Operation,
    site: &OperationSite<'_>,
    ctx: &mut TransformContext<'_>,
) -> AppResult<Vec<MergedParameter>> {
    let mut merged = Vec::new();
    let own_base = site.pointer.child("parameters");
    for (i, source) in op.parameters.iter().enumerate() {
        merged.push(merge_entry(source, own_base.child(i.to_string()), ctx)?);
    }

    let declared: Vec<(String, ParameterLocation)> = merged
        .iter()
        .map(|p| (p.param.name.clone(), p.param.location))
        .collect();

    let shared_base = site.path_item.child("parameters");
    for (i, source) in site.shared.iter().enumerate() {
        let entry = merge_entry(source, shared_base.child(i.to_string()), ctx)?;
        let overridden = declared
            .iter()
            .any(|(name, loc)| *name == entry.param.name && *loc == entry.param.location);
        if !overridden {
            merged.push(entry);
        }
    }
    Ok(merged)
}

fn merge_entry(
    source: &RefOr<Parameter>,
    pointer: Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<MergedParameter> {
    match source {
        RefOr::Item(param) => Ok(MergedParameter {
            param: param.clone(),
            pointer,
            group: None,
        }),
        RefOr::Ref(reference) => {
            let target = ctx.reference(&reference.reference, &pointer)?;
            let (resolved_at, param) = ctx
                .resolver
                .resolve_as::<Parameter>(&reference.reference, &pointer)?;
            Ok(MergedParameter {
                param,
                pointer: resolved_at,
                group: parameter_group(&target),
            })
        }
    }
}

/// Type of the parameters declared on a Path Item itself.
pub(crate) fn shared_parameters(
    shared: &[RefOr<Parameter>],
    path_item: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let base = path_item.child("parameters");
    let mut merged = Vec::with_capacity(shared.len());
    for (i, source) in shared.iter().enumerate() {
        merged.push(merge_entry(source, base.child(i.to_string()), ctx)?);
    }
    transform_parameters(&merged, ctx)
}

/// `#/components/parameters/Limit` → (`#/components/parameters`, `Limit`). References into
/// anything other than a named parameter collection are inlined instead.
fn parameter_group(target: &Pointer) -> Option<(Pointer, String)> {
    let segments = target.segments();
    let len = segments.len();
    if len >= 2 && segments[len - 2] == "parameters" {
        let parent = target.parent()?;
        let key = target.last()?.to_string();
        if key.parse::<usize>().is_err() {
            return Some((parent, key));
        }
    }
    None
}

fn transform_parameters(
    merged: &[MergedParameter],
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let immutable = ctx.config.immutable_types;
    let mut inline = Vec::new();
    let mut groups: IndexMap<Pointer, Vec<String>> = IndexMap::new();

    for entry in merged {
        if let Some((group, key)) = &entry.group {
            let keys = groups.entry(group.clone()).or_default();
            if !keys.contains(key) {
                keys.push(key.clone());
            }
            continue;
        }
        let param = &entry.param;
        let optional = param.location != ParameterLocation::Path && !param.required;
        inline.push(
            Member::new(param.name.as_str(), parameter_type(param, &entry.pointer, ctx)?)
                .optional(optional)
                .readonly(immutable)
                .doc(describe_parameter(param)),
        );
    }

    if inline.is_empty() && groups.is_empty() {
        return Ok(TypeExpr::Void);
    }

    let mut parts = Vec::new();
    if !inline.is_empty() {
        parts.push(TypeExpr::Record(RecordType::closed(inline)));
    }
    for (group, keys) in groups {
        parts.push(TypeExpr::Pick { group, keys });
    }
    Ok(TypeExpr::intersection(parts))
}

/// Type of a single parameter. Parameters without `schema` or `content` are strings.
pub(crate) fn parameter_type(
    param: &Parameter,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    if let Some(schema) = &param.schema {
        return transform_schema(schema, &pointer.child("schema"), ctx);
    }
    if let Some(content) = &param.content {
        return transform_content(content, pointer, ContentRole::Request, ctx);
    }
    Ok(TypeExpr::primitive(Primitive::String))
}

fn transform_request_body(
    body: Option<&RefOr<RequestBody>>,
    operation: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<Member> {
    let body_ptr = operation.child("requestBody");
    match body {
        None => Ok(Member::new("content", TypeExpr::Void)),
        Some(RefOr::Ref(reference)) => {
            let target = ctx.reference(&reference.reference, &body_ptr)?;
            let (_, resolved) = ctx
                .resolver
                .resolve_as::<RequestBody>(&reference.reference, &body_ptr)?;
            Ok(Member::new("content", TypeExpr::Reference(target))
                .optional(!resolved.required)
                .doc(reference.description.clone().or(resolved.description)))
        }
        Some(RefOr::Item(body)) => {
            let ty = transform_content(&body.content, &body_ptr, ContentRole::Request, ctx)?;
            Ok(Member::new("content", ty)
                .optional(!body.required)
                .doc(body.description.clone()))
        }
    }
}

/// Content type of a request body; used for operations and `components.requestBodies`.
pub(crate) fn request_body_type(
    body: &RequestBody,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    transform_content(&body.content, pointer, ContentRole::Request, ctx)
}

fn transform_responses(
    op: &Operation,
    operation: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<(RecordType, RecordType)> {
    let immutable = ctx.config.immutable_types;
    let base = operation.child("responses");
    let mut responses = Vec::new();
    let mut exceptions = Vec::new();

    for (code, source) in ordered(op.responses.as_map(), ctx.config.alphabetize) {
        let response_ptr = base.child(code.as_str());
        let (ty, doc) = match source {
            RefOr::Ref(reference) => (
                TypeExpr::Reference(ctx.reference(&reference.reference, &response_ptr)?),
                reference.description.clone(),
            ),
            RefOr::Item(response) => (
                transform_response(response, &response_ptr, ctx)?,
                describe_response(response),
            ),
        };
        let member = Member::new(code.as_str(), ty).readonly(immutable).doc(doc);
        if code.starts_with('2') {
            responses.push(member);
        } else {
            exceptions.push(member);
        }
    }

    Ok((RecordType::closed(responses), RecordType::closed(exceptions)))
}

/// A response without `content` is `never`; headers wrap the content type.
pub fn transform_response(
    response: &Response,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let Some(content) = &response.content else {
        return Ok(TypeExpr::Never);
    };
    let content = transform_content(content, pointer, ContentRole::Response, ctx)?;
    if response.headers.is_empty() {
        return Ok(content);
    }

    let immutable = ctx.config.immutable_types;
    let base = pointer.child("headers");
    let mut members = Vec::new();
    for (name, source) in ordered(&response.headers, ctx.config.alphabetize) {
        let header_ptr = base.child(name.as_str());
        let member = match source {
            RefOr::Ref(reference) => Member::new(
                name.as_str(),
                TypeExpr::Reference(ctx.reference(&reference.reference, &header_ptr)?),
            )
            .doc(reference.description.clone()),
            RefOr::Item(header) => {
                Member::new(name.as_str(), transform_header(header, &header_ptr, ctx)?)
                    .optional(!header.required)
                    .doc(describe_header(header))
            }
        };
        members.push(member.readonly(immutable));
    }

    Ok(TypeExpr::WithHeaders {
        content: Box::new(content),
        headers: RecordType::closed(members),
    })
}

/// A header with `schema` is that schema; with `content` it is a record keyed by media type.
pub fn transform_header(
    header: &Header,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    if let Some(schema) = &header.schema {
        return transform_schema(schema, &pointer.child("schema"), ctx);
    }
    let Some(content) = &header.content else {
        return Ok(TypeExpr::Unknown);
    };

    let immutable = ctx.config.immutable_types;
    let base = pointer.child("content");
    let mut members = Vec::new();
    for (media_type, media) in ordered(content, ctx.config.alphabetize) {
        let ty = match &media.schema {
            Some(schema) => {
                let schema_ptr = base.child(media_type.as_str()).child("schema");
                transform_schema(schema, &schema_ptr, ctx)?
            }
            None => TypeExpr::Unknown,
        };
        let doc = media.schema.as_ref().and_then(|s| describe(s.meta()));
        members.push(
            Member::new(media_type.as_str(), ty)
                .readonly(immutable)
                .doc(doc),
        );
    }
    Ok(TypeExpr::Record(RecordType::closed(members)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::MemberKey;
    use crate::oas::models::PathItem;
    use crate::oas::resolver::PointerResolver;
    use serde_json::{json, Value};

    fn raw() -> Value {
        json!({
            "openapi": "3.0.0",
            "components": {
                "parameters": {
                    "Limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                    "Offset": {"name": "offset", "in": "query", "schema": {"type": "integer"}}
                },
                "requestBodies": {
                    "NewPet": {"required": true, "content": {"application/json": {"schema": {}}}}
                },
                "schemas": {"Pet": {"type": "object"}}
            }
        })
    }

    fn run(item: Value, config: &Config) -> AppResult<OperationEntry> {
        let raw = raw();
        let item: PathItem = serde_json::from_value(item).unwrap();
        let (method, op) = item.operations().next().unwrap();
        let path_item = Pointer::from_segments(["paths", "/pets/{id}"]);
        let site = OperationSite {
            kind: RouteKind::Path,
            path: "/pets/{id}",
            method,
            pointer: path_item.child(method.as_str()),
            shared: &item.parameters,
            path_item,
        };
        let mut ctx = TransformContext::new(config, PointerResolver::new(&raw, None));
        transform_operation(op, &site, &mut ctx)
    }

    fn member<'r>(ty: &'r TypeExpr, name: &str) -> &'r Member {
        match ty {
            TypeExpr::Record(r) => r
                .members
                .iter()
                .find(|m| m.name() == Some(name))
                .unwrap_or_else(|| panic!("missing member {}", name)),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_response_split() {
        let entry = run(
            json!({"get": {
                "operationId": "getPet",
                "responses": {
                    "200": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}},
                    "404": {"description": "missing", "content": {"application/json": {"schema": {"type": "string"}}}},
                    "default": {"description": "error", "content": {"application/json": {"schema": {"type": "string"}}}}
                }
            }}),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(entry.name, "getPet");
        let responses = &member(&entry.ty, "responses").ty;
        let exceptions = &member(&entry.ty, "exceptions").ty;
        assert!(matches!(responses, TypeExpr::Record(r) if r.members.len() == 1));
        match exceptions {
            TypeExpr::Record(r) => {
                let keys: Vec<_> = r.members.iter().filter_map(Member::name).collect();
                assert_eq!(keys, vec!["404", "default"]);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_synthesized_name_and_void_members() {
        let entry = run(json!({"delete": {}}), &Config::default()).unwrap();
        assert_eq!(entry.name, "delete /pets/{id}");
        assert_eq!(member(&entry.ty, "parameters").ty, TypeExpr::Void);
        assert_eq!(member(&entry.ty, "content").ty, TypeExpr::Void);
        assert!(!member(&entry.ty, "content").optional);
    }

    #[test]
    fn test_parameter_merge_and_pick() {
        let entry = run(
            json!({
                "parameters": [
                    {"name": "id", "in": "path", "schema": {"type": "string"}},
                    {"name": "trace", "in": "header"}
                ],
                "get": {"parameters": [
                    {"name": "id", "in": "path", "schema": {"type": "integer"}},
                    {"$ref": "#/components/parameters/Limit"},
                    {"$ref": "#/components/parameters/Offset"},
                    {"name": "q", "in": "query"}
                ]}
            }),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(entry.header_params, vec!["trace".to_string()]);
        assert_eq!(
            entry.path_params,
            vec![("id".to_string(), TypeExpr::primitive(Primitive::Number))]
        );

        match &member(&entry.ty, "parameters").ty {
            TypeExpr::Intersection(parts) => {
                match &parts[0] {
                    TypeExpr::Record(r) => {
                        let keys: Vec<_> = r.members.iter().filter_map(Member::name).collect();
                        assert_eq!(keys, vec!["id", "q", "trace"]);
                        assert!(!r.members[0].optional);
                        assert!(r.members[1].optional);
                        assert_eq!(r.members[2].ty, TypeExpr::primitive(Primitive::String));
                    }
                    other => panic!("expected record, got {:?}", other),
                }
                assert_eq!(
                    parts[1],
                    TypeExpr::Pick {
                        group: Pointer::from_segments(["components", "parameters"]),
                        keys: vec!["Limit".into(), "Offset".into()],
                    }
                );
            }
            other => panic!("expected intersection, got {:?}", other),
        }
    }

    #[test]
    fn test_request_body_reference_optionality() {
        let entry = run(
            json!({"post": {"requestBody": {"$ref": "#/components/requestBodies/NewPet"}}}),
            &Config::default(),
        )
        .unwrap();
        let content = member(&entry.ty, "content");
        assert!(!content.optional);
        assert!(matches!(content.ty, TypeExpr::Reference(_)));

        let entry = run(
            json!({"post": {"requestBody": {"content": {"text/plain": {"schema": {"type": "string"}}}}}}),
            &Config::default(),
        )
        .unwrap();
        assert!(member(&entry.ty, "content").optional);
    }

    #[test]
    fn test_response_headers_and_missing_content() {
        let config = Config {
            immutable_types: true,
            ..Config::default()
        };
        let entry = run(
            json!({"get": {"responses": {
                "200": {
                    "description": "ok",
                    "headers": {"X-Rate": {"required": true, "schema": {"type": "integer"}}, "X-Id": {}},
                    "content": {"application/json": {"schema": {"type": "string"}}}
                },
                "204": {"description": "empty"}
            }}}),
            &config,
        )
        .unwrap();
        match &member(&entry.ty, "responses").ty {
            TypeExpr::Record(r) => {
                match &r.members[0].ty {
                    TypeExpr::WithHeaders { headers, .. } => {
                        assert_eq!(headers.members[0].key, MemberKey::Name("X-Rate".into()));
                        assert!(!headers.members[0].optional);
                        assert!(headers.members[1].optional);
                        assert_eq!(headers.members[1].ty, TypeExpr::Unknown);
                        assert!(headers.members.iter().all(|m| m.readonly));
                    }
                    other => panic!("expected headers, got {:?}", other),
                }
                assert_eq!(r.members[1].ty, TypeExpr::Never);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }
}
