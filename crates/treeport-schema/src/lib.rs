//! Node schema extraction.
//!
//! `treeport-schema` turns the reflective metadata of a parser's node classes
//! into a validated [`SchemaSet`]: one [`NodeSchema`](ir::NodeSchema) per class
//! or capability, with resolved field types and supers.
//!
//! # Architecture
//!
//! ```text
//! Class metadata        Introspection            IR
//! ──────────────      ─────────────────      ───────────
//! ReflectionDump ──┐   naming.rs (tags)
//! Vec<ClassMeta> ──┴─> hint.rs (types)  ───> SchemaSet (set.rs)
//!                      introspect.rs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use treeport_schema::{Conventions, ReflectionDump, build_schema};
//!
//! let conventions = Conventions::default();
//! let dump = ReflectionDump::new("dump/PhpParser/Node", &conventions.namespace);
//! let set = build_schema(&dump, &conventions).unwrap();
//! for schema in set.concrete() {
//!     println!("{} <- {}", schema.type_name, schema.raw_tag);
//! }
//! ```

pub mod conventions;
pub mod error;
pub mod hint;
pub mod input;
pub mod introspect;
pub mod ir;
pub mod naming;
pub mod set;

pub use conventions::{BinaryField, Conventions, WireFormat};
pub use error::SchemaError;
pub use hint::parse_hint;
pub use input::{ClassKind, ClassMeta, ClassSource, PropertyMeta, ReflectionDump};
pub use introspect::{build_schema, introspect_class};
pub use ir::{FieldSchema, NodeSchema, Primitive, SimpleType, TypeDescriptor};
pub use set::SchemaSet;
