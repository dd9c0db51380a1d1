//! Wire codec errors.

/// Error raised while encoding a tree.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The parsing collaborator produced no tree.
    #[error("parse failed: {message}")]
    ParseFailed { message: String },

    #[error("{node}.{field}: non-finite float")]
    NonFiniteFloat { node: String, field: String },

    #[error("{node}.{field}: raw bytes outside a binary-safe field")]
    UnencodableBytes { node: String, field: String },

    #[error("failed to serialize wire text: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error raised while decoding wire text.
///
/// An unknown discriminator is not an error; it decodes to
/// [`Value::Unrecognized`](crate::Value::Unrecognized).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid wire text: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope reports that the collaborator produced no tree.
    #[error("parse failed: {message}")]
    ParseFailed { message: String },

    #[error("expected a list of nodes, found {found}")]
    NotAList { found: &'static str },

    #[error("expected a node, found {found}")]
    NotANode { found: &'static str },

    #[error("{node}.{field} is required")]
    MissingField { node: String, field: String },

    #[error("{node}.{field}: expected {expected}, found {found}")]
    WrongShape {
        node: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{node}.{field}: {found} does not satisfy {expected}")]
    NotSatisfied {
        node: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("{node}.{field}: invalid base64 payload")]
    Base64 {
        node: String,
        field: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{node}: metadata must be an object")]
    BadMetadata { node: String },
}
