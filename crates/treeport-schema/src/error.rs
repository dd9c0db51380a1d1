//! Errors raised while extracting or loading a schema.
//!
//! Every variant is fatal to a generation run: callers must not write any
//! output when schema construction fails.

use std::path::PathBuf;

/// Error that can occur when building a [`SchemaSet`](crate::SchemaSet).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed type hint: {hint:?}")]
    MalformedHint { hint: String },

    #[error("type hint {hint:?} has no members besides null")]
    EmptyHint { hint: String },

    #[error("{owner}.{field} references unknown type {name}")]
    UnresolvedReference {
        owner: String,
        field: String,
        name: String,
    },

    #[error("{owner} extends unknown type {name}")]
    UnknownSuper { owner: String, name: String },

    #[error("duplicate type name {name} (from {first} and {second})")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("duplicate raw tag {tag} (on {first} and {second})")]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },

    #[error("root capability {name} is not part of the schema")]
    MissingRoot { name: String },

    #[error("inheritance cycle through {name}")]
    Cycle { name: String },

    #[error("failed to read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
