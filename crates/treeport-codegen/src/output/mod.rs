//! Output backends.
//!
//! Each backend renders a [`SchemaSet`](treeport_schema::SchemaSet) in one of
//! the [`Mode`](crate::Mode)s and implements [`Backend`](crate::Backend) for
//! uniform access through the [`Registry`](crate::Registry).

pub mod go;

/// Pad `s` with spaces to `width` characters.
pub(crate) fn pad(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}
