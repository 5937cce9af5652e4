//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every variant that concerns a location inside the document carries the
//! document-relative pointer (`#/components/schemas/Pet`) so the offending
//! schema can be found without re-parsing.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The input could not be decoded into an OpenAPI document.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The document is not an OpenAPI 3.x document.
    #[from(ignore)]
    #[display("Unsupported OpenAPI version '{_0}' (expected 3.x)")]
    UnsupportedVersion(String),

    /// A `$ref` has no matching node in the document.
    #[from(ignore)]
    #[display("Unresolvable reference '{reference}' at {location}")]
    UnresolvableReference {
        /// The raw `$ref` string.
        reference: String,
        /// Pointer of the node holding the reference.
        location: String,
    },

    /// Two operations resolved to the same identity.
    #[from(ignore)]
    #[display("Duplicate operation '{name}' declared at {first} and {second}")]
    DuplicateOperation {
        /// The colliding `operationId` or synthesized key.
        name: String,
        /// Pointer of the first declaration.
        first: String,
        /// Pointer of the second declaration.
        second: String,
    },

    /// Schema nesting exceeded the configured ceiling.
    #[from(ignore)]
    #[display("Schema nesting exceeds {limit} levels at {pointer}")]
    RecursionLimit {
        /// Pointer of the node where the ceiling was hit.
        pointer: String,
        /// The configured ceiling.
        limit: usize,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
