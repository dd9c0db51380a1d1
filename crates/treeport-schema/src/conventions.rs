//! Naming and wire conventions of the parsing collaborator.
//!
//! A [`Conventions`] value is threaded explicitly through introspection and
//! generation. Defaults describe PHP-Parser's `PhpParser\Node` hierarchy.
//!
//! Example `treeport.toml` section:
//! ```toml
//! [conventions]
//! namespace = "PhpParser\\Node"
//! category_prefixes = ["Stmt", "Expr", "Scalar"]
//!
//! [conventions.wire]
//! discriminator = "nodeType"
//! binary_fields = [{ node = "ScalarString", field = "value" }]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conventions used to turn collaborator class metadata into schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Namespace shared by every node class; stripped from canonical names.
    pub namespace: String,
    /// Canonical name of the universal capability every node satisfies.
    pub root_capability: String,
    /// Classes outside the node directory that stand for the root capability.
    pub root_classes: Vec<String>,
    /// Interfaces attached to every node that carry no user data.
    pub marker_capabilities: Vec<String>,
    /// Category prefixes rotated to suffixes in target names.
    pub category_prefixes: Vec<String>,
    /// Short names used inside type hints, mapped to target names.
    pub aliases: BTreeMap<String, String>,
    /// Property holding per-node position metadata; never schema-typed.
    pub metadata_property: String,
    /// Wire format shared by the encoder and the generated decoders.
    pub wire: WireFormat,
}

impl Default for Conventions {
    fn default() -> Self {
        let aliases = [
            ("ArrayItem", "ArrayItemExpr"),
            ("ClosureUse", "ClosureUseExpr"),
            ("Case", "CaseStmt"),
            ("DeclareDeclare", "DeclareDeclareStmt"),
            ("UseUse", "UseUseStmt"),
            ("ElseIf", "ElseIfStmt"),
            ("Else", "ElseStmt"),
            ("PropertyProperty", "PropertyPropertyStmt"),
            ("StaticVar", "StaticVarStmt"),
            ("TraitUseAdaptation", "TraitUseAdaptationStmt"),
            ("Catch", "CatchStmt"),
            ("Finally", "FinallyStmt"),
        ]
        .into_iter()
        .map(|(short, target)| (short.to_string(), target.to_string()))
        .collect();

        Self {
            namespace: "PhpParser\\Node".into(),
            root_capability: "Node".into(),
            root_classes: vec!["PhpParser\\Node".into(), "PhpParser\\NodeAbstract".into()],
            marker_capabilities: vec!["JsonSerializable".into(), "Stringable".into()],
            category_prefixes: vec!["Stmt".into(), "Expr".into(), "Scalar".into()],
            aliases,
            metadata_property: "attributes".into(),
            wire: WireFormat::default(),
        }
    }
}

/// Shape of the JSON wire text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireFormat {
    /// Key carrying a node's raw tag; always the first entry of a node object.
    pub discriminator: String,
    /// Key carrying the opaque metadata bag; always the last entry.
    pub metadata_key: String,
    /// Fields whose payload is base64-encoded on the wire.
    pub binary_fields: Vec<BinaryField>,
}

impl Default for WireFormat {
    fn default() -> Self {
        Self {
            discriminator: "nodeType".into(),
            metadata_key: "attributes".into(),
            binary_fields: vec![BinaryField {
                node: "ScalarString".into(),
                field: "value".into(),
            }],
        }
    }
}

impl WireFormat {
    /// Whether `field` of the node tagged `node` is carried as base64.
    pub fn is_binary(&self, node: &str, field: &str) -> bool {
        self.binary_fields
            .iter()
            .any(|b| b.node == node && b.field == field)
    }
}

/// A (raw tag, raw field name) pair whose payload may not be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryField {
    pub node: String,
    pub field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wire_marks_string_literal() {
        let wire = WireFormat::default();
        assert!(wire.is_binary("ScalarString", "value"));
        assert!(!wire.is_binary("ScalarEncapsedStringPart", "value"));
        assert!(!wire.is_binary("ScalarString", "kind"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let conventions: Conventions = serde_json::from_str(
            r#"{ "namespace": "Acme\\Ast", "wire": { "discriminator": "kind" } }"#,
        )
        .unwrap();
        assert_eq!(conventions.namespace, "Acme\\Ast");
        assert_eq!(conventions.root_capability, "Node");
        assert_eq!(conventions.wire.discriminator, "kind");
        assert_eq!(conventions.wire.metadata_key, "attributes");
        assert_eq!(conventions.aliases["Else"], "ElseStmt");
    }
}
