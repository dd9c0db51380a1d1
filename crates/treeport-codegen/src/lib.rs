//! Code generation from node schemas.
//!
//! `treeport-codegen` renders a validated [`SchemaSet`](treeport_schema::SchemaSet)
//! into target-language type declarations and a decode dispatcher.
//!
//! # Architecture
//!
//! ```text
//! SchemaSet ──> DispatchTable (dispatch.rs) ──┬─> Go decoder (output/go.rs)
//!     │                                      └─> runtime decoder (treeport-wire)
//!     └──────────────────────────────────────────> Go type declarations
//! ```
//!
//! The [`DispatchTable`] is the single place where per-field coercions are
//! decided, so the generated dispatcher and the runtime decoder agree.
//!
//! # Example
//!
//! ```ignore
//! use treeport_codegen::{Mode, Registry};
//!
//! let registry = Registry::with_builtins();
//! let go = registry.get("go").unwrap();
//! let types = go.generate(&schema, Mode::Types);
//! let decoder = go.generate(&schema, Mode::Decoder);
//! ```

pub mod dispatch;
pub mod output;
pub mod registry;
pub mod traits;

pub use dispatch::{Branch, Coercion, DispatchTable, FieldPlan};
pub use output::go::{GoBackend, GoOptions};
pub use registry::Registry;
pub use traits::{Backend, Mode};
