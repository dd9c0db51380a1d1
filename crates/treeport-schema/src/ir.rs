//! Schema IR: one [`NodeSchema`] per node class or capability.

use serde::{Deserialize, Serialize};

/// Introspected description of one node class or capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSchema {
    /// Target name, after category rotation (`IfStmt`).
    pub type_name: String,
    /// Canonical name before rotation; the wire discriminator (`StmtIf`).
    pub raw_tag: String,
    /// Interfaces and abstract classes are capabilities.
    pub is_capability: bool,
    /// Direct supers by target name, in declaration order.
    pub supers: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldSchema>,
}

/// One declared instance property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Property name as declared; also the wire key.
    pub raw_name: String,
    /// Target-language field name.
    pub normalized_name: String,
    /// Resolved annotation, `None` when the property has no annotation.
    pub type_descriptor: Option<TypeDescriptor>,
    /// Payload is base64 on the wire.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub binary_safe: bool,
    /// Doc comment text without delimiters, carried into generated code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Resolved shape of a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDescriptor {
    Simple {
        name: SimpleType,
        #[serde(default)]
        nullable: bool,
    },
    List {
        item: Box<TypeDescriptor>,
        #[serde(default)]
        nullable: bool,
    },
    Union {
        members: Vec<TypeDescriptor>,
        #[serde(default)]
        nullable: bool,
    },
}

/// Either a native primitive or a reference to another schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    Primitive(Primitive),
    /// Target name of the referenced schema. Never owning.
    Ref(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Int,
    Float,
    String,
    /// Dynamic value with no static shape.
    Any,
}

impl TypeDescriptor {
    pub fn primitive(primitive: Primitive) -> Self {
        TypeDescriptor::Simple {
            name: SimpleType::Primitive(primitive),
            nullable: false,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeDescriptor::Simple {
            name: SimpleType::Ref(name.into()),
            nullable: false,
        }
    }

    pub fn list(item: TypeDescriptor) -> Self {
        TypeDescriptor::List {
            item: Box::new(item),
            nullable: false,
        }
    }

    pub fn union(members: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Union {
            members,
            nullable: false,
        }
    }

    pub fn nullable(&self) -> bool {
        match self {
            TypeDescriptor::Simple { nullable, .. }
            | TypeDescriptor::List { nullable, .. }
            | TypeDescriptor::Union { nullable, .. } => *nullable,
        }
    }

    pub fn with_nullable(mut self, value: bool) -> Self {
        match &mut self {
            TypeDescriptor::Simple { nullable, .. }
            | TypeDescriptor::List { nullable, .. }
            | TypeDescriptor::Union { nullable, .. } => *nullable = value,
        }
        self
    }

    /// Every schema name referenced anywhere inside this descriptor.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::Simple {
                name: SimpleType::Ref(name),
                ..
            } => out.push(name),
            TypeDescriptor::Simple { .. } => {}
            TypeDescriptor::List { item, .. } => item.collect_references(out),
            TypeDescriptor::Union { members, .. } => {
                for member in members {
                    member.collect_references(out);
                }
            }
        }
    }
}

impl NodeSchema {
    pub fn field(&self, raw_name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.raw_name == raw_name)
    }
}
