//! Result envelope between the parsing process and its consumer.
//!
//! ```json
//! { "ok": true, "data": "[ ...wire text... ]", "error": "" }
//! ```
//!
//! `data` carries the wire text as a string so the envelope can be read
//! without decoding the tree.

use crate::encode::{Encoder, pretty};
use crate::tree::ParseOutcome;
use crate::EncodeError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub error: String,
}

impl Envelope {
    /// Wrap a parse result. A failed parse yields `ok: false` and no data.
    pub fn from_outcome(
        outcome: &ParseOutcome,
        encoder: &Encoder<'_>,
    ) -> Result<Self, EncodeError> {
        Ok(match outcome {
            ParseOutcome::Parsed(nodes) => Self {
                ok: true,
                data: encoder.encode_nodes(nodes)?,
                error: String::new(),
            },
            ParseOutcome::Failed { message } => Self {
                ok: false,
                data: String::new(),
                error: message.clone(),
            },
        })
    }

    pub fn to_json(&self) -> Result<String, EncodeError> {
        pretty(&serde_json::to_value(self)?)
    }
}
