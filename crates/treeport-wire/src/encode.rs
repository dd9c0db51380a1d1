//! Tree to wire text.

use crate::tree::{Node, ParseOutcome, Value};
use crate::EncodeError;
use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;
use serde_json::{Map, Number};
use treeport_schema::WireFormat;

/// Encodes trees into pretty-printed JSON wire text.
///
/// A node becomes an object whose first entry is the discriminator, followed
/// by its fields in order and the metadata bag last.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    wire: &'a WireFormat,
}

impl<'a> Encoder<'a> {
    pub fn new(wire: &'a WireFormat) -> Self {
        Self { wire }
    }

    /// Encode a top-level statement list.
    pub fn encode_nodes(&self, nodes: &[Node]) -> Result<String, EncodeError> {
        let items = nodes
            .iter()
            .map(|node| self.node_to_json(node))
            .collect::<Result<Vec<_>, _>>()?;
        pretty(&serde_json::Value::Array(items))
    }

    /// Encode a parse result. A failed parse is never encoded.
    pub fn encode_outcome(&self, outcome: &ParseOutcome) -> Result<String, EncodeError> {
        match outcome {
            ParseOutcome::Parsed(nodes) => self.encode_nodes(nodes),
            ParseOutcome::Failed { message } => Err(EncodeError::ParseFailed {
                message: message.clone(),
            }),
        }
    }

    /// Encode any value.
    pub fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        pretty(&self.to_json(value, "", "")?)
    }

    pub fn node_to_json(&self, node: &Node) -> Result<serde_json::Value, EncodeError> {
        let mut object = Map::with_capacity(node.fields.len() + 2);
        object.insert(
            self.wire.discriminator.clone(),
            serde_json::Value::String(node.kind.clone()),
        );
        for (name, value) in &node.fields {
            let encoded = match value.as_bytes() {
                Some(bytes) if self.wire.is_binary(&node.kind, name) => {
                    serde_json::Value::String(general_purpose::STANDARD.encode(bytes))
                }
                _ => self.to_json(value, &node.kind, name)?,
            };
            object.insert(name.clone(), encoded);
        }
        object.insert(
            self.wire.metadata_key.clone(),
            serde_json::Value::Object(node.attributes.clone()),
        );
        Ok(serde_json::Value::Object(object))
    }

    fn to_json(
        &self,
        value: &Value,
        node: &str,
        field: &str,
    ) -> Result<serde_json::Value, EncodeError> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => match Number::from_f64(*f) {
                Some(n) => serde_json::Value::Number(n),
                None => {
                    return Err(EncodeError::NonFiniteFloat {
                        node: node.to_string(),
                        field: field.to_string(),
                    });
                }
            },
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(_) => {
                return Err(EncodeError::UnencodableBytes {
                    node: node.to_string(),
                    field: field.to_string(),
                });
            }
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| self.to_json(item, node, field))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    object.insert(key.clone(), self.to_json(item, node, field)?);
                }
                serde_json::Value::Object(object)
            }
            Value::Node(child) => self.node_to_json(child)?,
            Value::Unrecognized(child) => {
                let mut object = Map::with_capacity(child.data.len() + 1);
                object.insert(
                    self.wire.discriminator.clone(),
                    serde_json::Value::String(child.kind.clone()),
                );
                for (key, item) in &child.data {
                    if *key != self.wire.discriminator {
                        object.insert(key.clone(), item.clone());
                    }
                }
                serde_json::Value::Object(object)
            }
        })
    }
}

/// Pretty-print with a four-space indent.
pub(crate) fn pretty(value: &serde_json::Value) -> Result<String, EncodeError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only writes valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}
