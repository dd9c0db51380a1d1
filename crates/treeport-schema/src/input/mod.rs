//! Class metadata sources.
//!
//! The parsing collaborator owns the node classes; treeport only sees their
//! reflective metadata through a [`ClassSource`].

mod dump;

pub use dump::{ClassKind, ClassMeta, PropertyMeta, ReflectionDump, var_annotation};

use crate::SchemaError;

/// A source of class metadata for one node directory.
pub trait ClassSource {
    /// Every loadable class and interface, in a stable order.
    fn classes(&self) -> Result<Vec<ClassMeta>, SchemaError>;
}

impl ClassSource for [ClassMeta] {
    fn classes(&self) -> Result<Vec<ClassMeta>, SchemaError> {
        Ok(self.to_vec())
    }
}

impl ClassSource for Vec<ClassMeta> {
    fn classes(&self) -> Result<Vec<ClassMeta>, SchemaError> {
        Ok(self.clone())
    }
}
