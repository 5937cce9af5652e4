#![deny(missing_docs)]

//! # Document Assembler
//!
//! Walks Paths, Webhooks and the six Components collections and collects the results
//! into an [`AssembledDocument`]. The assembler owns the operation registry: operations
//! are accumulated in a value it threads through the walk and returns, never in shared
//! state.

use super::comments::{describe, describe_header, describe_parameter, describe_response};
use super::operation::{
    parameter_type, request_body_type, shared_parameters, transform_header, transform_operation,
    transform_response, OperationEntry, OperationSite, RouteKind,
};
use super::schema::transform_schema;
use super::TransformContext;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::ir::{Literal, Member, MemberKey, Primitive, RecordType, TemplatePart, TypeExpr};
use crate::oas::document::LoadedDocument;
use crate::oas::models::{Components, Entries, PathItem, RefOr};
use crate::oas::ordering::ordered;
use crate::oas::pointer::Pointer;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// The transformed document: one expression per section plus the operation registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    /// The `paths` record.
    pub paths: TypeExpr,
    /// The `webhooks` record.
    pub webhooks: TypeExpr,
    /// The `components` record with its six collections.
    pub components: TypeExpr,
    /// Named operations keyed by identity, in discovery order.
    pub operations: IndexMap<String, OperationEntry>,
    /// Every pointer a `$ref` resolved to.
    pub referenced: BTreeSet<Pointer>,
}

/// Accumulates operations and rejects colliding identities.
#[derive(Debug, Default)]
struct OperationRegistry {
    entries: IndexMap<String, OperationEntry>,
}

impl OperationRegistry {
    fn register(&mut self, entry: OperationEntry) -> AppResult<()> {
        if let Some(existing) = self.entries.get(&entry.name) {
            // The same Path Item reached through two `$ref`s.
            if existing.location == entry.location {
                return Ok(());
            }
            return Err(AppError::DuplicateOperation {
                name: entry.name,
                first: existing.location.to_string(),
                second: entry.location.to_string(),
            });
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }
}

/// How a Path Item's operations appear in its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationMode {
    /// `get: operations["listPets"]`, registering the operation.
    Registered(RouteKind),
    /// The operation record inline, without registering it.
    Inline,
}

/// Transforms a loaded document. Fails on the first fatal error; no partial output.
pub fn assemble(doc: &LoadedDocument, config: &Config) -> AppResult<AssembledDocument> {
    let mut ctx = TransformContext::new(config, doc.resolver());
    let mut registry = OperationRegistry::default();

    tracing::debug!("assembling paths");
    let paths = assemble_paths(doc.spec.paths.as_ref(), &mut registry, &mut ctx)?;

    tracing::debug!("assembling webhooks");
    let webhooks = assemble_webhooks(doc.spec.webhooks.as_ref(), &mut registry, &mut ctx)?;

    tracing::debug!("assembling components");
    let components = assemble_components(doc.spec.components.as_ref(), &mut ctx)?;

    tracing::debug!(
        operations = registry.entries.len(),
        referenced = ctx.referenced().len(),
        "document assembled"
    );

    Ok(AssembledDocument {
        paths,
        webhooks,
        components,
        operations: registry.entries,
        referenced: ctx.into_referenced(),
    })
}

fn assemble_paths(
    paths: Option<&Entries<PathItem>>,
    registry: &mut OperationRegistry,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let Some(paths) = paths else {
        return Ok(TypeExpr::Record(RecordType::default()));
    };
    let root = Pointer::root().child("paths");
    let mut members = Vec::new();

    for (url, item) in ordered(paths.as_map(), ctx.config.alphabetize) {
        let item_ptr = root.child(url.as_str());
        let (item, item_ptr) = follow_path_item(item, item_ptr, ctx)?;
        let mode = OperationMode::Registered(RouteKind::Path);
        let (record, entries) = path_item_record(&item, &item_ptr, url, mode, ctx)?;

        let key = if ctx.config.path_params_as_types {
            template_key(url, &entries)
        } else {
            MemberKey::Name(url.clone())
        };
        for entry in entries {
            registry.register(entry)?;
        }

        members.push(Member {
            key,
            ty: TypeExpr::Record(record),
            optional: false,
            readonly: ctx.config.immutable_types,
            doc: item.summary.clone().or(item.description.clone()),
        });
    }

    Ok(TypeExpr::Record(RecordType::closed(members)))
}

fn assemble_webhooks(
    webhooks: Option<&Entries<RefOr<PathItem>>>,
    registry: &mut OperationRegistry,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let Some(webhooks) = webhooks else {
        return Ok(TypeExpr::Record(RecordType::default()));
    };
    let root = Pointer::root().child("webhooks");
    let mut members = Vec::new();

    for (name, source) in ordered(webhooks.as_map(), ctx.config.alphabetize) {
        let item_ptr = root.child(name.as_str());
        let (item, item_ptr) = match source {
            RefOr::Ref(reference) => {
                ctx.reference(&reference.reference, &item_ptr)?;
                ctx.resolver
                    .resolve_as::<PathItem>(&reference.reference, &item_ptr)
                    .map(|(ptr, item)| (item, ptr))?
            }
            RefOr::Item(item) => follow_path_item(item, item_ptr, ctx)?,
        };
        let mode = OperationMode::Registered(RouteKind::Webhook);
        let (record, entries) = path_item_record(&item, &item_ptr, name, mode, ctx)?;
        for entry in entries {
            registry.register(entry)?;
        }
        members.push(
            Member::new(name.as_str(), TypeExpr::Record(record))
                .readonly(ctx.config.immutable_types)
                .doc(item.summary.clone().or(item.description.clone())),
        );
    }

    Ok(TypeExpr::Record(RecordType::closed(members)))
}

/// A Path Item with `$ref` is replaced by its target.
fn follow_path_item(
    item: &PathItem,
    pointer: Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<(PathItem, Pointer)> {
    match &item.reference {
        Some(reference) => {
            ctx.reference(reference, &pointer)?;
            let (target, resolved) = ctx.resolver.resolve_as::<PathItem>(reference, &pointer)?;
            Ok((resolved, target))
        }
        None => Ok((item.clone(), pointer)),
    }
}

fn path_item_record(
    item: &PathItem,
    item_ptr: &Pointer,
    path: &str,
    mode: OperationMode,
    ctx: &mut TransformContext<'_>,
) -> AppResult<(RecordType, Vec<OperationEntry>)> {
    let immutable = ctx.config.immutable_types;
    let mut members = Vec::new();
    let mut entries = Vec::new();

    for (method, op) in item.operations() {
        let kind = match mode {
            OperationMode::Registered(kind) => kind,
            OperationMode::Inline => RouteKind::Path,
        };
        let site = OperationSite {
            kind,
            path,
            method,
            pointer: item_ptr.child(method.as_str()),
            shared: &item.parameters,
            path_item: item_ptr.clone(),
        };
        let entry = transform_operation(op, &site, ctx)?;
        let ty = match mode {
            OperationMode::Registered(_) => TypeExpr::Operation(entry.name.clone()),
            OperationMode::Inline => entry.ty.clone(),
        };
        members.push(
            Member::new(method.as_str(), ty)
                .readonly(immutable)
                .doc(entry.doc.clone()),
        );
        entries.push(entry);
    }

    if !item.parameters.is_empty() {
        let shared = shared_parameters(&item.parameters, item_ptr, ctx)?;
        members.push(Member::new("parameters", shared).readonly(immutable));
    }

    Ok((RecordType::closed(members), entries))
}

/// `` `/pets/${number}` `` built from the first declaration of each path parameter.
fn template_key(url: &str, entries: &[OperationEntry]) -> MemberKey {
    static PATH_PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let re = PATH_PARAM_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"));
    if !re.is_match(url) {
        return MemberKey::Name(url.to_string());
    }

    let mut parts = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(url) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(TemplatePart::Text(url[last..whole.start()].to_string()));
        }
        let declared = entries
            .iter()
            .flat_map(|e| e.path_params.iter())
            .find(|(param, _)| param == name.as_str())
            .map(|(_, ty)| ty);
        parts.push(TemplatePart::Param(template_type(declared)));
        last = whole.end();
    }
    if last < url.len() {
        parts.push(TemplatePart::Text(url[last..].to_string()));
    }
    MemberKey::Template(parts)
}

/// Template literals accept primitives and literals only; anything else is `string`.
fn template_type(declared: Option<&TypeExpr>) -> TypeExpr {
    fn interpolable(ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::Primitive(_) => true,
            TypeExpr::Literal(Literal::Null) => false,
            TypeExpr::Literal(_) => true,
            TypeExpr::Union(members) => members.iter().all(interpolable),
            _ => false,
        }
    }
    match declared {
        Some(ty) if interpolable(ty) => ty.clone(),
        _ => TypeExpr::primitive(Primitive::String),
    }
}

fn assemble_components(
    components: Option<&Components>,
    ctx: &mut TransformContext<'_>,
) -> AppResult<TypeExpr> {
    let empty = Components::default();
    let components = components.unwrap_or(&empty);
    let immutable = ctx.config.immutable_types;
    let alphabetize = ctx.config.alphabetize;
    let root = Pointer::root().child("components");

    let schemas = match &components.schemas {
        None => TypeExpr::Never,
        Some(schemas) => {
            let base = root.child("schemas");
            let mut members = Vec::new();
            for (name, node) in ordered(schemas, alphabetize) {
                let ty = transform_schema(node, &base.child(name.as_str()), ctx)?;
                members.push(
                    Member::new(name.as_str(), ty)
                        .readonly(immutable || node.meta().read_only)
                        .doc(describe(node.meta())),
                );
            }
            TypeExpr::Record(RecordType::closed(members))
        }
    };

    let responses = match &components.responses {
        None => TypeExpr::Never,
        Some(responses) => {
            let base = root.child("responses");
            let mut members = Vec::new();
            for (name, source) in ordered(responses, alphabetize) {
                let ptr = base.child(name.as_str());
                let member = match source {
                    RefOr::Ref(r) => reference_member(name, &r.reference, &ptr, ctx)?,
                    RefOr::Item(response) => {
                        Member::new(name.as_str(), transform_response(response, &ptr, ctx)?)
                            .doc(describe_response(response))
                    }
                };
                members.push(member.readonly(immutable));
            }
            TypeExpr::Record(RecordType::closed(members))
        }
    };

    let parameters = match &components.parameters {
        None => TypeExpr::Never,
        Some(parameters) => {
            let base = root.child("parameters");
            let mut members = Vec::new();
            for (name, source) in ordered(parameters, alphabetize) {
                let ptr = base.child(name.as_str());
                let member = match source {
                    RefOr::Ref(r) => reference_member(name, &r.reference, &ptr, ctx)?,
                    RefOr::Item(param) => {
                        Member::new(name.as_str(), parameter_type(param, &ptr, ctx)?)
                            .doc(describe_parameter(param))
                    }
                };
                members.push(member.readonly(immutable));
            }
            TypeExpr::Record(RecordType::closed(members))
        }
    };

    let request_bodies = match &components.request_bodies {
        None => TypeExpr::Never,
        Some(bodies) => {
            let base = root.child("requestBodies");
            let mut members = Vec::new();
            for (name, source) in ordered(bodies, alphabetize) {
                let ptr = base.child(name.as_str());
                let member = match source {
                    RefOr::Ref(r) => reference_member(name, &r.reference, &ptr, ctx)?,
                    RefOr::Item(body) => {
                        Member::new(name.as_str(), request_body_type(body, &ptr, ctx)?)
                            .optional(!body.required)
                            .doc(body.description.clone())
                    }
                };
                members.push(member.readonly(immutable));
            }
            TypeExpr::Record(RecordType::closed(members))
        }
    };

    let headers = match &components.headers {
        None => TypeExpr::Never,
        Some(headers) => {
            let base = root.child("headers");
            let mut members = Vec::new();
            for (name, source) in ordered(headers, alphabetize) {
                let ptr = base.child(name.as_str());
                let member = match source {
                    RefOr::Ref(r) => reference_member(name, &r.reference, &ptr, ctx)?,
                    RefOr::Item(header) => {
                        Member::new(name.as_str(), transform_header(header, &ptr, ctx)?)
                            .doc(describe_header(header))
                    }
                };
                members.push(member.readonly(immutable));
            }
            TypeExpr::Record(RecordType::closed(members))
        }
    };

    let path_items = match &components.path_items {
        None => TypeExpr::Never,
        Some(items) => {
            let base = root.child("pathItems");
            let mut members = Vec::new();
            for (name, source) in ordered(items, alphabetize) {
                let ptr = base.child(name.as_str());
                let member = match source {
                    RefOr::Ref(r) => reference_member(name, &r.reference, &ptr, ctx)?,
                    RefOr::Item(item) => {
                        let (record, _) =
                            path_item_record(item, &ptr, name, OperationMode::Inline, ctx)?;
                        Member::new(name.as_str(), TypeExpr::Record(record))
                    }
                };
                members.push(member.readonly(immutable));
            }
            TypeExpr::Record(RecordType::closed(members))
        }
    };

    Ok(TypeExpr::Record(RecordType::closed(vec![
        Member::new("schemas", schemas).readonly(immutable),
        Member::new("responses", responses).readonly(immutable),
        Member::new("parameters", parameters).readonly(immutable),
        Member::new("requestBodies", request_bodies).readonly(immutable),
        Member::new("headers", headers).readonly(immutable),
        Member::new("pathItems", path_items).readonly(immutable),
    ])))
}

fn reference_member(
    name: &str,
    reference: &str,
    pointer: &Pointer,
    ctx: &mut TransformContext<'_>,
) -> AppResult<Member> {
    let target = ctx.reference(reference, pointer)?;
    Ok(Member::new(name, TypeExpr::Reference(target)))
}
