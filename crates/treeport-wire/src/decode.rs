//! Wire text to tree, driven by a [`DispatchTable`].

use crate::DecodeError;
use crate::envelope::Envelope;
use crate::tree::{Node, UnrecognizedNode, Value};
use base64::{Engine as _, engine::general_purpose};
use indexmap::IndexMap;
use serde_json::Map;
use treeport_codegen::{Branch, Coercion, DispatchTable, FieldPlan};

/// Decodes wire text produced with a matching schema.
///
/// Tags the table does not know decode to [`Value::Unrecognized`]. Fields a
/// known tag does not declare are ignored.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    table: &'a DispatchTable,
}

/// The field being decoded, for error reporting.
#[derive(Clone, Copy)]
struct Site<'s> {
    node: &'s str,
    field: &'s str,
}

impl Site<'_> {
    fn wrong_shape(&self, expected: &'static str, found: &serde_json::Value) -> DecodeError {
        DecodeError::WrongShape {
            node: self.node.to_string(),
            field: self.field.to_string(),
            expected,
            found: json_kind(found),
        }
    }
}

impl<'a> Decoder<'a> {
    pub fn new(table: &'a DispatchTable) -> Self {
        Self { table }
    }

    /// Decode a top-level list of nodes.
    pub fn decode_str(&self, text: &str) -> Result<Vec<Value>, DecodeError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        self.decode_nodes(&json)
    }

    /// Decode the `data` of an envelope, or report the collaborator's failure.
    pub fn decode_envelope(&self, text: &str) -> Result<Vec<Value>, DecodeError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        if !envelope.ok {
            return Err(DecodeError::ParseFailed {
                message: envelope.error,
            });
        }
        self.decode_str(&envelope.data)
    }

    pub fn decode_nodes(&self, json: &serde_json::Value) -> Result<Vec<Value>, DecodeError> {
        let serde_json::Value::Array(items) = json else {
            return Err(DecodeError::NotAList {
                found: json_kind(json),
            });
        };
        items
            .iter()
            .map(|item| match self.tagged(item) {
                Some((tag, object)) => self.decode_node(tag, object),
                None => Err(DecodeError::NotANode {
                    found: json_kind(item),
                }),
            })
            .collect()
    }

    /// Decode any value: tagged objects become nodes, everything else is
    /// mirrored.
    pub fn decode_json(&self, json: &serde_json::Value) -> Result<Value, DecodeError> {
        if let Some((tag, object)) = self.tagged(json) {
            return self.decode_node(tag, object);
        }
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.decode_json(item))
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(object) => {
                let mut entries = IndexMap::with_capacity(object.len());
                for (key, item) in object {
                    entries.insert(key.clone(), self.decode_json(item)?);
                }
                Value::Map(entries)
            }
        })
    }

    fn tagged<'j>(
        &self,
        json: &'j serde_json::Value,
    ) -> Option<(&'j str, &'j Map<String, serde_json::Value>)> {
        let object = json.as_object()?;
        let tag = object.get(&self.table.wire().discriminator)?.as_str()?;
        Some((tag, object))
    }

    fn decode_node(
        &self,
        tag: &str,
        object: &Map<String, serde_json::Value>,
    ) -> Result<Value, DecodeError> {
        let wire = self.table.wire();
        let Some(branch) = self.table.branch_for(tag) else {
            tracing::debug!(tag, "unrecognized node");
            let data = object
                .iter()
                .filter(|(key, _)| **key != wire.discriminator)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            return Ok(Value::Unrecognized(Box::new(UnrecognizedNode {
                kind: tag.to_string(),
                data,
            })));
        };

        let attributes = match object.get(&wire.metadata_key) {
            None | Some(serde_json::Value::Null) => Map::new(),
            Some(serde_json::Value::Object(bag)) => bag.clone(),
            Some(_) => {
                return Err(DecodeError::BadMetadata {
                    node: tag.to_string(),
                });
            }
        };

        let mut node = Node {
            kind: tag.to_string(),
            fields: IndexMap::with_capacity(branch.fields.len()),
            attributes,
        };
        for plan in &branch.fields {
            let value = self.decode_field(tag, plan, object.get(&plan.raw_name))?;
            node.fields.insert(plan.raw_name.clone(), value);
        }

        for key in object.keys() {
            let reserved = *key == wire.discriminator || *key == wire.metadata_key;
            if !reserved && branch.field(key).is_none() {
                tracing::debug!(tag, field = %key, "ignoring unknown field");
            }
        }
        Ok(Value::Node(Box::new(node)))
    }

    fn decode_field(
        &self,
        tag: &str,
        plan: &FieldPlan,
        json: Option<&serde_json::Value>,
    ) -> Result<Value, DecodeError> {
        let site = Site {
            node: tag,
            field: &plan.raw_name,
        };
        let json = match json {
            None | Some(serde_json::Value::Null) if plan.optional => return Ok(Value::Null),
            None | Some(serde_json::Value::Null) => {
                return Err(DecodeError::MissingField {
                    node: tag.to_string(),
                    field: plan.raw_name.clone(),
                });
            }
            Some(json) => json,
        };
        if plan.binary_safe
            && let serde_json::Value::String(encoded) = json
        {
            let bytes = general_purpose::STANDARD
                .decode(encoded)
                .map_err(|source| DecodeError::Base64 {
                    node: tag.to_string(),
                    field: plan.raw_name.clone(),
                    source,
                })?;
            return Ok(Value::Bytes(bytes));
        }
        self.coerce(site, json, &plan.coercion)
    }

    fn coerce(
        &self,
        site: Site<'_>,
        json: &serde_json::Value,
        coercion: &Coercion,
    ) -> Result<Value, DecodeError> {
        match coercion {
            Coercion::Int => integral(json)
                .map(Value::Int)
                .ok_or_else(|| site.wrong_shape("int", json)),
            Coercion::Float => json
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| site.wrong_shape("float", json)),
            Coercion::Bool => json
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| site.wrong_shape("bool", json)),
            Coercion::Str => json
                .as_str()
                .map(|s| Value::Str(s.to_string()))
                .ok_or_else(|| site.wrong_shape("string", json)),
            Coercion::Dynamic => self.decode_json(json),
            Coercion::Node { ty } => {
                let (tag, object) = self
                    .tagged(json)
                    .ok_or_else(|| site.wrong_shape("node", json))?;
                let value = self.decode_node(tag, object)?;
                if let Some(branch) = self.table.branch_for(tag) {
                    check_satisfies(site, branch, ty)?;
                }
                Ok(value)
            }
            Coercion::Slice {
                item,
                item_optional,
            } => {
                let items = json.as_array().ok_or_else(|| site.wrong_shape("list", json))?;
                items
                    .iter()
                    .map(|element| match element {
                        serde_json::Value::Null if *item_optional => Ok(Value::Null),
                        element => self.coerce(site, element, item),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
        }
    }
}

fn check_satisfies(site: Site<'_>, branch: &Branch, ty: &str) -> Result<(), DecodeError> {
    if branch.satisfies(ty) {
        return Ok(());
    }
    Err(DecodeError::NotSatisfied {
        node: site.node.to_string(),
        field: site.field.to_string(),
        expected: ty.to_string(),
        found: branch.type_name.clone(),
    })
}

/// An integral JSON number, including floats without a fraction.
fn integral(json: &serde_json::Value) -> Option<i64> {
    if let Some(i) = json.as_i64() {
        return Some(i);
    }
    let f = json.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
