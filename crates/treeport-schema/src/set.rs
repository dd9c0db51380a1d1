//! Validated, immutable schema sets.

use crate::ir::NodeSchema;
use crate::{SchemaError, WireFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An ordered, validated list of node schemas.
///
/// Construction sorts schemas by type name and checks that type names and raw
/// tags are unique, every super and field reference resolves, and supers are
/// acyclic. After that the set is read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSet {
    root: String,
    wire: WireFormat,
    schemas: Vec<NodeSchema>,
    index: HashMap<String, usize>,
}

/// On-disk form of a [`SchemaSet`].
#[derive(Serialize, Deserialize)]
struct SchemaDocument {
    root: String,
    wire: WireFormat,
    schemas: Vec<NodeSchema>,
}

impl SchemaSet {
    pub fn new(
        root: impl Into<String>,
        wire: WireFormat,
        mut schemas: Vec<NodeSchema>,
    ) -> Result<Self, SchemaError> {
        let root = root.into();
        schemas.sort_by(|a, b| a.type_name.cmp(&b.type_name));

        let mut index = HashMap::with_capacity(schemas.len());
        for (i, schema) in schemas.iter().enumerate() {
            if let Some(prev) = index.insert(schema.type_name.clone(), i) {
                return Err(SchemaError::DuplicateName {
                    name: schema.type_name.clone(),
                    first: schemas[prev].raw_tag.clone(),
                    second: schema.raw_tag.clone(),
                });
            }
        }

        let mut tags: HashMap<&str, &str> = HashMap::with_capacity(schemas.len());
        for schema in &schemas {
            if let Some(first) = tags.insert(&schema.raw_tag, &schema.type_name) {
                return Err(SchemaError::DuplicateTag {
                    tag: schema.raw_tag.clone(),
                    first: first.to_string(),
                    second: schema.type_name.clone(),
                });
            }
        }

        let set = Self {
            root,
            wire,
            schemas,
            index,
        };
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if !self.index.contains_key(&self.root) {
            return Err(SchemaError::MissingRoot {
                name: self.root.clone(),
            });
        }
        for schema in &self.schemas {
            for sup in &schema.supers {
                if !self.index.contains_key(sup) {
                    return Err(SchemaError::UnknownSuper {
                        owner: schema.type_name.clone(),
                        name: sup.clone(),
                    });
                }
            }
            for field in &schema.fields {
                let Some(ty) = &field.type_descriptor else {
                    continue;
                };
                let unresolved = ty
                    .references()
                    .into_iter()
                    .find(|n| !self.index.contains_key(*n));
                if let Some(name) = unresolved {
                    return Err(SchemaError::UnresolvedReference {
                        owner: schema.type_name.clone(),
                        field: field.raw_name.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }
        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), SchemaError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Active,
            Done,
        }

        fn visit(set: &SchemaSet, i: usize, marks: &mut [Mark]) -> Result<(), SchemaError> {
            match marks[i] {
                Mark::Done => return Ok(()),
                Mark::Active => {
                    return Err(SchemaError::Cycle {
                        name: set.schemas[i].type_name.clone(),
                    });
                }
                Mark::Unvisited => {}
            }
            marks[i] = Mark::Active;
            for sup in &set.schemas[i].supers {
                visit(set, set.index[sup], marks)?;
            }
            marks[i] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.schemas.len()];
        for i in 0..self.schemas.len() {
            visit(self, i, &mut marks)?;
        }
        Ok(())
    }

    /// Load a schema document and re-validate it.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument = serde_json::from_str(text)?;
        Self::new(doc.root, doc.wire, doc.schemas)
    }

    /// Render the schema document, pretty-printed.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        let doc = SchemaDocument {
            root: self.root.clone(),
            wire: self.wire.clone(),
            schemas: self.schemas.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Name of the universal root capability.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn wire(&self) -> &WireFormat {
        &self.wire
    }

    /// All schemas, sorted by type name.
    pub fn schemas(&self) -> &[NodeSchema] {
        &self.schemas
    }

    pub fn get(&self, type_name: &str) -> Option<&NodeSchema> {
        self.index.get(type_name).map(|&i| &self.schemas[i])
    }

    pub fn is_capability(&self, type_name: &str) -> bool {
        self.get(type_name).is_some_and(|s| s.is_capability)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &NodeSchema> {
        self.schemas.iter().filter(|s| s.is_capability)
    }

    pub fn concrete(&self) -> impl Iterator<Item = &NodeSchema> {
        self.schemas.iter().filter(|s| !s.is_capability)
    }

    /// Transitive supers of `type_name`, depth-first in declaration order,
    /// without duplicates. Concrete types always reach the root capability.
    pub fn ancestors(&self, type_name: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.collect_ancestors(type_name, &mut out);
        if let Some(schema) = self.get(type_name)
            && !schema.is_capability
            && !out.contains(&self.root.as_str())
        {
            out.push(&self.root);
        }
        out
    }

    fn collect_ancestors<'a>(&'a self, type_name: &str, out: &mut Vec<&'a str>) {
        let Some(schema) = self.get(type_name) else {
            return;
        };
        for sup in &schema.supers {
            if !out.contains(&sup.as_str()) {
                out.push(sup);
                self.collect_ancestors(sup, out);
            }
        }
    }

    /// Capability ancestors of `type_name`, in [`ancestors`](Self::ancestors) order.
    pub fn capability_ancestors(&self, type_name: &str) -> Vec<&str> {
        self.ancestors(type_name)
            .into_iter()
            .filter(|name| self.is_capability(name))
            .collect()
    }
}
