//! In-memory syntax trees.

use indexmap::IndexMap;
use serde_json::Map;

/// One polymorphic node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Raw tag, written as the wire discriminator.
    pub kind: String,
    /// Live fields in declaration order.
    pub fields: IndexMap<String, Value>,
    /// Opaque position and attribute bag, carried verbatim.
    pub attributes: Map<String, serde_json::Value>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: IndexMap::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A node whose tag the decoder does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedNode {
    pub kind: String,
    /// Every entry of the wire object except the discriminator.
    pub data: Map<String, serde_json::Value>,
}

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Raw bytes; only encodable in binary-safe fields, and always the
    /// decoded form of those fields.
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Node(Box<Node>),
    Unrecognized(Box<UnrecognizedNode>),
}

impl Value {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Payload of a string or byte value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Raw tag of a node or unrecognized node.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Value::Node(node) => Some(&node.kind),
            Value::Unrecognized(node) => Some(&node.kind),
            _ => None,
        }
    }

    /// Visit this value and every value below it, depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Value)) {
        visit(self);
        let children: Box<dyn Iterator<Item = &'a Value>> = match self {
            Value::List(items) => Box::new(items.iter()),
            Value::Map(entries) => Box::new(entries.values()),
            Value::Node(node) => Box::new(node.fields.values()),
            _ => return,
        };
        for child in children {
            child.walk(visit);
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(Box::new(node))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// What the parsing collaborator returned for one source file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Vec<Node>),
    /// No tree was produced; `message` is the collaborator's diagnostic.
    Failed { message: String },
}
