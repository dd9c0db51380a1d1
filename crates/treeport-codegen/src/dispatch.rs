//! Decode dispatch table.
//!
//! One [`Branch`] per concrete schema, keyed by raw tag. Each field carries the
//! [`Coercion`] a decoder applies to its wire value.

use std::collections::HashMap;
use treeport_schema::{
    FieldSchema, NodeSchema, Primitive, SchemaSet, SimpleType, TypeDescriptor, WireFormat,
};

/// How a wire value is turned into a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    /// Integral number, narrowed from any JSON number without a fraction.
    Int,
    Float,
    Bool,
    Str,
    /// Any JSON value; tagged objects inside are still decoded as nodes.
    Dynamic,
    /// A node that satisfies `ty`.
    Node { ty: String },
    /// Element-wise coercion; `item_optional` admits `null` elements.
    Slice {
        item: Box<Coercion>,
        item_optional: bool,
    },
}

impl Coercion {
    /// Coercion for a field's descriptor. Unions and absent descriptors are dynamic.
    pub fn for_descriptor(descriptor: Option<&TypeDescriptor>) -> Self {
        match descriptor {
            None | Some(TypeDescriptor::Union { .. }) => Coercion::Dynamic,
            Some(TypeDescriptor::Simple { name, .. }) => match name {
                SimpleType::Primitive(Primitive::Bool) => Coercion::Bool,
                SimpleType::Primitive(Primitive::Int) => Coercion::Int,
                SimpleType::Primitive(Primitive::Float) => Coercion::Float,
                SimpleType::Primitive(Primitive::String) => Coercion::Str,
                SimpleType::Primitive(Primitive::Any) => Coercion::Dynamic,
                SimpleType::Ref(ty) => Coercion::Node { ty: ty.clone() },
            },
            Some(TypeDescriptor::List { item, .. }) => Coercion::Slice {
                item: Box::new(Coercion::for_descriptor(Some(item))),
                item_optional: item.nullable(),
            },
        }
    }
}

/// Decoding plan for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub raw_name: String,
    pub field_name: String,
    pub coercion: Coercion,
    /// `null` or a missing key is accepted.
    pub optional: bool,
    /// The wire payload is base64.
    pub binary_safe: bool,
}

impl FieldPlan {
    fn new(field: &FieldSchema) -> Self {
        let descriptor = field.type_descriptor.as_ref();
        let coercion = Coercion::for_descriptor(descriptor);
        Self {
            raw_name: field.raw_name.clone(),
            field_name: field.normalized_name.clone(),
            optional: coercion == Coercion::Dynamic || descriptor.is_some_and(|d| d.nullable()),
            coercion,
            binary_safe: field.binary_safe,
        }
    }
}

/// Decoding plan for one concrete node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub raw_tag: String,
    pub type_name: String,
    /// The type name followed by every transitive super.
    pub satisfies: Vec<String>,
    pub fields: Vec<FieldPlan>,
}

impl Branch {
    pub fn satisfies(&self, ty: &str) -> bool {
        self.satisfies.iter().any(|s| s == ty)
    }

    pub fn field(&self, raw_name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.raw_name == raw_name)
    }
}

/// Lookup from raw tag to [`Branch`], ordered by raw tag.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTable {
    root: String,
    wire: WireFormat,
    branches: Vec<Branch>,
    index: HashMap<String, usize>,
}

impl DispatchTable {
    pub fn build(schema: &SchemaSet) -> Self {
        let mut branches: Vec<Branch> = schema
            .concrete()
            .map(|node| Self::branch(schema, node))
            .collect();
        branches.sort_by(|a, b| a.raw_tag.cmp(&b.raw_tag));
        let index = branches
            .iter()
            .enumerate()
            .map(|(i, b)| (b.raw_tag.clone(), i))
            .collect();
        tracing::debug!(branches = branches.len(), "built dispatch table");
        Self {
            root: schema.root().to_string(),
            wire: schema.wire().clone(),
            branches,
            index,
        }
    }

    fn branch(schema: &SchemaSet, node: &NodeSchema) -> Branch {
        let mut satisfies = vec![node.type_name.clone()];
        satisfies.extend(schema.ancestors(&node.type_name).into_iter().map(str::to_string));
        Branch {
            raw_tag: node.raw_tag.clone(),
            type_name: node.type_name.clone(),
            satisfies,
            fields: node.fields.iter().map(FieldPlan::new).collect(),
        }
    }

    /// Name of the root capability.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn wire(&self) -> &WireFormat {
        &self.wire
    }

    /// Branches in raw tag order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The branch for `raw_tag`, or `None` for an unrecognized tag.
    pub fn branch_for(&self, raw_tag: &str) -> Option<&Branch> {
        self.index.get(raw_tag).map(|&i| &self.branches[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_coercions() {
        assert_eq!(Coercion::for_descriptor(None), Coercion::Dynamic);
        assert_eq!(
            Coercion::for_descriptor(Some(&TypeDescriptor::primitive(Primitive::Float))),
            Coercion::Float
        );
        assert_eq!(
            Coercion::for_descriptor(Some(&TypeDescriptor::union(vec![
                TypeDescriptor::reference("Name"),
                TypeDescriptor::reference("Expr"),
            ]))),
            Coercion::Dynamic
        );
        assert_eq!(
            Coercion::for_descriptor(Some(&TypeDescriptor::list(
                TypeDescriptor::reference("ArrayItemExpr").with_nullable(true)
            ))),
            Coercion::Slice {
                item: Box::new(Coercion::Node {
                    ty: "ArrayItemExpr".into()
                }),
                item_optional: true,
            }
        );
    }

    #[test]
    fn test_optional_follows_nullability() {
        let required = FieldPlan::new(&FieldSchema {
            raw_name: "cond".into(),
            normalized_name: "Cond".into(),
            type_descriptor: Some(TypeDescriptor::reference("Expr")),
            binary_safe: false,
            doc: None,
        });
        assert!(!required.optional);

        let nullable = FieldPlan::new(&FieldSchema {
            raw_name: "else".into(),
            normalized_name: "Else".into(),
            type_descriptor: Some(TypeDescriptor::reference("ElseStmt").with_nullable(true)),
            binary_safe: false,
            doc: None,
        });
        assert!(nullable.optional);

        let dynamic = FieldPlan::new(&FieldSchema {
            raw_name: "name".into(),
            normalized_name: "Name".into(),
            type_descriptor: None,
            binary_safe: false,
            doc: None,
        });
        assert!(dynamic.optional);
    }
}
