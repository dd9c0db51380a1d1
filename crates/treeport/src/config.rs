//! Configuration for treeport.
//!
//! Loads `treeport.toml` from the path given with `--config`, else from the
//! working directory if present, else uses defaults.
//!
//! Example treeport.toml:
//! ```toml
//! [conventions]
//! namespace = "PhpParser\\Node"
//!
//! [conventions.wire]
//! binary_fields = [{ node = "ScalarString", field = "value" }]
//!
//! [go]
//! package = "ast"
//! import_path = "example.com/php/ast"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use treeport_codegen::GoOptions;
use treeport_schema::Conventions;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TreeportConfig {
    pub conventions: Conventions,
    pub go: GoOptions,
}

impl TreeportConfig {
    pub const FILE_NAME: &str = "treeport.toml";

    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        let local = Path::new(Self::FILE_NAME);
        if local.is_file() {
            Self::load_file(local)
        } else {
            Ok(Self::default())
        }
    }

    fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
