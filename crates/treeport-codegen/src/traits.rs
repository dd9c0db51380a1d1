//! Traits for code generation backends.

use treeport_schema::SchemaSet;

/// What a backend renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Capability interfaces, node aggregates and marker implementations.
    Types,
    /// The decode dispatcher and its runtime helpers.
    Decoder,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Types => "types",
            Mode::Decoder => "decoder",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A code generation backend.
///
/// Backends render a validated [`SchemaSet`] into source code for a target
/// language. Rendering is a pure function of the schema, the backend's own
/// options and the mode: an unchanged schema yields byte-identical text.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// use treeport_codegen::{Backend, Mode, Registry};
/// use treeport_schema::SchemaSet;
///
/// struct KotlinBackend;
///
/// impl Backend for KotlinBackend {
///     fn name(&self) -> &'static str { "kotlin" }
///     fn language(&self) -> &'static str { "kotlin" }
///     fn extension(&self) -> &'static str { "kt" }
///     fn generate(&self, schema: &SchemaSet, mode: Mode) -> String { /* ... */ }
/// }
///
/// let mut registry = Registry::with_builtins();
/// registry.register(Box::new(KotlinBackend));
/// ```
pub trait Backend: Send + Sync {
    /// Unique backend identifier (e.g., "go").
    fn name(&self) -> &'static str;

    /// Target language.
    fn language(&self) -> &'static str;

    /// File extension for generated code.
    fn extension(&self) -> &'static str;

    /// Render `schema` in `mode`.
    fn generate(&self, schema: &SchemaSet, mode: Mode) -> String;
}
