#![deny(missing_docs)]

//! # Type Expressions
//!
//! The engine's output tree. A [`TypeExpr`] describes a type in a structural type system
//! with unions, intersections, optional record members and read-only modifiers. The tree
//! is independent of surface syntax; `codegen` turns it into TypeScript text.
//!
//! Documentation strings ride along on record members but never take part in identity:
//! [`TypeExpr::same_shape`] ignores them, which is what union deduplication relies on.

use crate::oas::pointer::Pointer;
use serde_json::Number;

/// Target primitives. `integer` and `number` share [`Primitive::Number`]; `null` is a
/// [`Literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `"value"`
    String(String),
    /// `42`
    Number(Number),
    /// `true` / `false`
    Boolean(bool),
    /// `null`
    Null,
}

/// Length constraints on a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListBounds {
    /// `T[]`
    Unbounded,
    /// A tuple of exactly `n` positions.
    Exact(u64),
    /// `n` required positions followed by an unbounded tail.
    AtLeast(u64),
}

/// A homogeneous list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    /// Element type.
    pub element: Box<TypeExpr>,
    /// Length constraints.
    pub bounds: ListBounds,
    /// `readonly T[]`
    pub readonly: bool,
}

/// One piece of a template-literal key.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Verbatim text.
    Text(String),
    /// An interpolated type.
    Param(TypeExpr),
}

/// Key of a record member.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberKey {
    /// A plain property name.
    Name(String),
    /// A template-literal index signature (`` [path: `/pets/${number}`] ``).
    Template(Vec<TemplatePart>),
}

/// A record member.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Member key.
    pub key: MemberKey,
    /// Member type.
    pub ty: TypeExpr,
    /// `key?: T`
    pub optional: bool,
    /// `readonly key: T`
    pub readonly: bool,
    /// Leading JSDoc text.
    pub doc: Option<String>,
}

impl Member {
    /// A required, mutable, undocumented member.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            key: MemberKey::Name(name.into()),
            ty,
            optional: false,
            readonly: false,
            doc: None,
        }
    }

    /// Sets `optional`.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Sets `readonly`.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Sets the leading comment.
    pub fn doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    /// The plain key name, if any.
    pub fn name(&self) -> Option<&str> {
        match &self.key {
            MemberKey::Name(name) => Some(name),
            MemberKey::Template(_) => None,
        }
    }
}

/// An object type: ordered members plus an optional catch-all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordType {
    /// Members in emission order.
    pub members: Vec<Member>,
    /// `[key: string]: T`
    pub catch_all: Option<Box<TypeExpr>>,
    /// `readonly [key: string]: T`
    pub catch_all_readonly: bool,
}

impl RecordType {
    /// A record with the given members and no catch-all.
    pub fn closed(members: Vec<Member>) -> Self {
        Self {
            members,
            catch_all: None,
            catch_all_readonly: false,
        }
    }

    /// True when the record accepts nothing but `{}`.
    pub fn is_closed_empty(&self) -> bool {
        self.members.is_empty() && self.catch_all.is_none()
    }
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A target primitive.
    Primitive(Primitive),
    /// A literal type.
    Literal(Literal),
    /// A named reference to another node in the document.
    Reference(Pointer),
    /// A named reference to a registered operation.
    Operation(String),
    /// A list or tuple.
    List(ListType),
    /// An object type.
    Record(RecordType),
    /// `A | B`, ordered and deduplicated.
    Union(Vec<TypeExpr>),
    /// `A & B`, ordered.
    Intersection(Vec<TypeExpr>),
    /// A projection of named keys out of a referenced group (`Pick<NonNullable<G>, K>`).
    Pick {
        /// Pointer of the group (e.g. `#/components/parameters`).
        group: Pointer,
        /// Selected keys in first-seen order.
        keys: Vec<String>,
    },
    /// Response content carrying header metadata alongside it.
    WithHeaders {
        /// The content type.
        content: Box<TypeExpr>,
        /// The header record.
        headers: RecordType,
    },
    /// The empty type.
    Never,
    /// The top type.
    Unknown,
    /// Nothing at all (no parameters, no body).
    Void,
}

impl TypeExpr {
    /// `string`, `number` or `boolean`.
    pub fn primitive(p: Primitive) -> Self {
        TypeExpr::Primitive(p)
    }

    /// The `null` literal.
    pub fn null() -> Self {
        TypeExpr::Literal(Literal::Null)
    }

    /// Builds a union: nested unions are flattened, members deduplicated by shape, an empty
    /// union collapses to `Never` and a single member to itself.
    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        let mut flat: Vec<TypeExpr> = Vec::new();
        for member in members {
            match member {
                TypeExpr::Union(inner) => {
                    for m in inner {
                        push_distinct(&mut flat, m);
                    }
                }
                TypeExpr::Never => {}
                other => push_distinct(&mut flat, other),
            }
        }
        match flat.len() {
            0 => TypeExpr::Never,
            1 => flat.remove(0),
            _ => TypeExpr::Union(flat),
        }
    }

    /// Builds an intersection: nested intersections are flattened, an empty intersection
    /// collapses to `Unknown` and a single member to itself.
    pub fn intersection(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        let mut flat: Vec<TypeExpr> = Vec::new();
        for member in members {
            match member {
                TypeExpr::Intersection(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => TypeExpr::Unknown,
            1 => flat.remove(0),
            _ => TypeExpr::Intersection(flat),
        }
    }

    /// `self | null`
    pub fn or_null(self) -> Self {
        TypeExpr::union([self, TypeExpr::null()])
    }

    /// Structural equality that ignores documentation.
    pub fn same_shape(&self, other: &TypeExpr) -> bool {
        match (self, other) {
            (TypeExpr::Record(a), TypeExpr::Record(b)) => records_same_shape(a, b),
            (TypeExpr::List(a), TypeExpr::List(b)) => {
                a.bounds == b.bounds && a.readonly == b.readonly && a.element.same_shape(&b.element)
            }
            (TypeExpr::Union(a), TypeExpr::Union(b))
            | (TypeExpr::Intersection(a), TypeExpr::Intersection(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (
                TypeExpr::WithHeaders {
                    content: ca,
                    headers: ha,
                },
                TypeExpr::WithHeaders {
                    content: cb,
                    headers: hb,
                },
            ) => ca.same_shape(cb) && records_same_shape(ha, hb),
            _ => self == other,
        }
    }
}

fn push_distinct(list: &mut Vec<TypeExpr>, candidate: TypeExpr) {
    if !list.iter().any(|existing| existing.same_shape(&candidate)) {
        list.push(candidate);
    }
}

fn records_same_shape(a: &RecordType, b: &RecordType) -> bool {
    let catch_all_same = match (&a.catch_all, &b.catch_all) {
        (Some(x), Some(y)) => x.same_shape(y),
        (None, None) => true,
        _ => false,
    };
    catch_all_same
        && a.catch_all_readonly == b.catch_all_readonly
        && a.members.len() == b.members.len()
        && a.members.iter().zip(&b.members).all(|(x, y)| {
            x.key == y.key
                && x.optional == y.optional
                && x.readonly == y.readonly
                && x.ty.same_shape(&y.ty)
        })
}
