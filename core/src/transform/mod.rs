#![deny(missing_docs)]

//! # Transformation Engine
//!
//! Turns the typed document model into [`TypeExpr`](crate::ir::TypeExpr) trees.
//!
//! - **schema**: Schema Object -> type expression (the recursive core).
//! - **content**: content maps -> deduplicated unions.
//! - **operation**: parameters, request body, responses and exceptions of one operation.
//! - **document**: walks paths, webhooks and components, owning the operation registry.
//! - **comments**: JSDoc text built from descriptive keywords.
//!
//! Every function takes a [`TransformContext`] explicitly. The only state it accumulates
//! is the set of referenced pointers; the assembler returns it to the caller together
//! with the collected sections.

pub mod comments;
pub mod content;
pub mod document;
pub mod operation;
pub mod schema;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::oas::pointer::Pointer;
use crate::oas::resolver::PointerResolver;
use std::collections::BTreeSet;

pub use document::{assemble, AssembledDocument};
pub use operation::{OperationEntry, RouteKind};
pub use schema::transform_schema;

/// Per-run state threaded through every transformation call.
#[derive(Debug)]
pub struct TransformContext<'a> {
    /// Options for this run.
    pub config: &'a Config,
    /// Reference resolution over the run's document.
    pub resolver: PointerResolver<'a>,
    depth: usize,
    referenced: BTreeSet<Pointer>,
}

impl<'a> TransformContext<'a> {
    /// A fresh context for one document.
    pub fn new(config: &'a Config, resolver: PointerResolver<'a>) -> Self {
        Self {
            config,
            resolver,
            depth: 0,
            referenced: BTreeSet::new(),
        }
    }

    /// Resolves `reference` (held at `from`) to its canonical pointer and records it.
    pub fn reference(&mut self, reference: &str, from: &Pointer) -> AppResult<Pointer> {
        let target = self.resolver.canonical(reference, from)?;
        self.referenced.insert(target.clone());
        Ok(target)
    }

    /// Runs `f` one nesting level deeper, failing once the configured ceiling is reached.
    pub fn nested<T>(
        &mut self,
        pointer: &Pointer,
        f: impl FnOnce(&mut Self) -> AppResult<T>,
    ) -> AppResult<T> {
        if self.depth >= self.config.max_depth {
            return Err(AppError::RecursionLimit {
                pointer: pointer.to_string(),
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Pointers referenced so far.
    pub fn referenced(&self) -> &BTreeSet<Pointer> {
        &self.referenced
    }

    /// Consumes the context, returning the referenced pointers.
    pub fn into_referenced(self) -> BTreeSet<Pointer> {
        self.referenced
    }
}
