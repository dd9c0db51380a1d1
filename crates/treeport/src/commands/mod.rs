//! Subcommand implementations.

pub mod decode;
pub mod generate;
pub mod schema;

use anyhow::Context;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use treeport_schema::{Conventions, ReflectionDump, SchemaSet, build_schema};

/// Load a schema from a reflection dump directory or a schema document file.
pub fn load_schema(input: &Path, conventions: &Conventions) -> anyhow::Result<SchemaSet> {
    if input.is_dir() {
        let dump = ReflectionDump::new(input, &conventions.namespace);
        return build_schema(&dump, conventions)
            .with_context(|| format!("failed to build schema from {}", input.display()));
    }
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    SchemaSet::from_json(&content)
        .with_context(|| format!("failed to load schema document {}", input.display()))
}

/// Write `content` to stdout, or replace `output` atomically.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    let Some(path) = output else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())?;
    file.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_output_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.go");
        std::fs::write(&path, "old").unwrap();
        write_output(Some(&path), "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_load_schema_rejects_garbage_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "[]").unwrap();
        let err = load_schema(&path, &Conventions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load schema document"));
    }
}
