//! Class metadata to schema IR.

use crate::hint::parse_hint;
use crate::input::{ClassMeta, ClassSource};
use crate::ir::{FieldSchema, NodeSchema};
use crate::naming::{canonical_name, field_name, target_name};
use crate::{Conventions, SchemaError, SchemaSet};

/// Build a validated schema set from every class a source reports.
///
/// The root capability is synthesized when no class maps to it.
pub fn build_schema(
    source: &(impl ClassSource + ?Sized),
    conventions: &Conventions,
) -> Result<SchemaSet, SchemaError> {
    let classes = source.classes()?;
    let mut schemas = classes
        .iter()
        .map(|class| introspect_class(class, conventions))
        .collect::<Result<Vec<_>, _>>()?;

    let root = conventions.root_capability.clone();
    if !schemas.iter().any(|s| s.type_name == root) {
        tracing::debug!(root = %root, "synthesizing root capability");
        schemas.push(NodeSchema {
            type_name: root.clone(),
            raw_tag: root.clone(),
            is_capability: true,
            supers: Vec::new(),
            fields: Vec::new(),
        });
    }

    let set = SchemaSet::new(root, conventions.wire.clone(), schemas)?;
    tracing::info!(
        schemas = set.schemas().len(),
        capabilities = set.capabilities().count(),
        "built schema"
    );
    Ok(set)
}

/// Describe one class. References are not checked here; see [`SchemaSet::new`].
pub fn introspect_class(
    class: &ClassMeta,
    conventions: &Conventions,
) -> Result<NodeSchema, SchemaError> {
    let raw_tag = canonical_name(&class.name, conventions);
    let is_root = raw_tag == conventions.root_capability;
    let type_name = if is_root {
        raw_tag.clone()
    } else {
        target_name(&raw_tag, conventions)
    };

    let mut supers: Vec<String> = Vec::new();
    if !is_root {
        for sup in class.parent.iter().chain(&class.interfaces) {
            if is_marker(sup, conventions) {
                continue;
            }
            let name = target_name(&canonical_name(sup, conventions), conventions);
            if name != type_name && !supers.contains(&name) {
                supers.push(name);
            }
        }
    }

    let mut fields = Vec::new();
    for property in &class.properties {
        if property.is_static || property.name == conventions.metadata_property {
            continue;
        }
        let type_descriptor = match property.annotation() {
            Some(hint) => parse_hint(hint, conventions)?,
            None => None,
        };
        fields.push(FieldSchema {
            raw_name: property.name.clone(),
            normalized_name: field_name(&property.name),
            type_descriptor,
            binary_safe: conventions.wire.is_binary(&raw_tag, &property.name),
            doc: property.doc_text(),
        });
    }

    Ok(NodeSchema {
        type_name,
        raw_tag,
        is_capability: is_root || class.is_capability(),
        supers,
        fields,
    })
}

fn is_marker(name: &str, conventions: &Conventions) -> bool {
    let name = name.trim_start_matches('\\');
    conventions.marker_capabilities.iter().any(|m| m == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ClassKind, PropertyMeta};
    use crate::ir::{Primitive, TypeDescriptor};

    fn property(name: &str, doc: &str) -> PropertyMeta {
        PropertyMeta {
            name: name.to_string(),
            is_static: false,
            doc: Some(doc.to_string()),
        }
    }

    fn class(name: &str, parent: Option<&str>, properties: Vec<PropertyMeta>) -> ClassMeta {
        ClassMeta {
            name: name.to_string(),
            kind: ClassKind::Class,
            is_abstract: false,
            parent: parent.map(str::to_string),
            interfaces: vec!["PhpParser\\Node".into(), "JsonSerializable".into()],
            properties,
        }
    }

    #[test]
    fn test_string_scalar() {
        let conventions = Conventions::default();
        let mut meta = class(
            "PhpParser\\Node\\Scalar\\String_",
            Some("PhpParser\\Node\\Scalar"),
            vec![
                property("value", "/** @var string String value */"),
                property("attributes", "/** @var array */"),
            ],
        );
        meta.properties.push(PropertyMeta {
            name: "replacements".into(),
            is_static: true,
            doc: None,
        });

        let schema = introspect_class(&meta, &conventions).unwrap();
        assert_eq!(schema.type_name, "StringScalar");
        assert_eq!(schema.raw_tag, "ScalarString");
        assert!(!schema.is_capability);
        assert_eq!(schema.supers, vec!["Scalar", "Node"]);
        assert_eq!(schema.fields.len(), 1);
        let value = &schema.fields[0];
        assert_eq!(value.normalized_name, "Value");
        assert!(value.binary_safe);
        assert_eq!(
            value.type_descriptor,
            Some(TypeDescriptor::primitive(Primitive::String))
        );
    }

    #[test]
    fn test_unannotated_property_is_dynamic() {
        let conventions = Conventions::default();
        let meta = class(
            "PhpParser\\Node\\Expr\\Variable",
            Some("PhpParser\\Node\\Expr"),
            vec![PropertyMeta {
                name: "name".into(),
                is_static: false,
                doc: Some("/** Variable name */".into()),
            }],
        );
        let schema = introspect_class(&meta, &conventions).unwrap();
        assert_eq!(schema.fields[0].type_descriptor, None);
        assert!(!schema.fields[0].binary_safe);
        assert_eq!(schema.fields[0].doc.as_deref(), Some("Variable name"));
    }

    #[test]
    fn test_malformed_annotation_fails() {
        let conventions = Conventions::default();
        let meta = class(
            "PhpParser\\Node\\Expr\\Variable",
            Some("PhpParser\\Node\\Expr"),
            vec![property("name", "/** @var string|(Expr */")],
        );
        assert!(matches!(
            introspect_class(&meta, &conventions),
            Err(SchemaError::MalformedHint { .. })
        ));
    }

    #[test]
    fn test_root_is_synthesized() {
        let conventions = Conventions::default();
        let mut expr = class("PhpParser\\Node\\Expr", Some("PhpParser\\NodeAbstract"), vec![]);
        expr.is_abstract = true;
        let set = build_schema(&vec![expr], &conventions).unwrap();
        let root = set.get("Node").unwrap();
        assert!(root.is_capability);
        assert!(root.supers.is_empty());
        assert_eq!(set.get("Expr").unwrap().supers, vec!["Node"]);
    }
}
