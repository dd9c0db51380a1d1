//! JSON wire codec for polymorphic syntax trees.
//!
//! The [`Encoder`] walks a live tree into tagged, pretty-printed JSON; the
//! [`Decoder`] walks it back using the [`DispatchTable`](treeport_codegen::DispatchTable)
//! built from the same schema the Go dispatcher is generated from.
//!
//! ```text
//! {
//!     "nodeType": "StmtEcho",
//!     "exprs": [ { "nodeType": "ScalarString", "value": "aGk=", "attributes": {} } ],
//!     "attributes": { "startLine": 1 }
//! }
//! ```
//!
//! `Decode(Encode(tree)) == tree` for every node the schema describes, with
//! binary-safe fields held as [`Value::Bytes`]. The encoder also accepts a
//! [`Value::Str`] there; it decodes back as the same bytes.

pub mod decode;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod tree;

pub use decode::Decoder;
pub use encode::Encoder;
pub use envelope::Envelope;
pub use error::{DecodeError, EncodeError};
pub use tree::{Node, ParseOutcome, UnrecognizedNode, Value};
