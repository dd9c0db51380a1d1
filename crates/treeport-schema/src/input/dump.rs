//! Reflection dumps: one JSON file of class metadata per node class.
//!
//! The dump mirrors the collaborator's class directory, so
//! `Stmt/If_.json` describes `<namespace>\Stmt\If_`:
//!
//! ```json
//! {
//!   "kind": "class",
//!   "parent": "PhpParser\\Node\\Stmt",
//!   "interfaces": ["PhpParser\\Node", "JsonSerializable"],
//!   "properties": [
//!     { "name": "cond", "doc": "/** @var Node\\Expr Condition */" }
//!   ]
//! }
//! ```

use super::ClassSource;
use crate::SchemaError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static VAR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@var\s+(\S+)").expect("valid regex"));

/// Reflective metadata for one class or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMeta {
    /// Fully qualified class name. Derived from the file path when empty.
    #[serde(default)]
    pub name: String,
    pub kind: ClassKind,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub parent: Option<String>,
    /// Implemented interfaces as reported by reflection.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMeta {
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Raw doc comment, including the comment delimiters.
    #[serde(default)]
    pub doc: Option<String>,
}

impl ClassMeta {
    pub fn is_capability(&self) -> bool {
        self.kind == ClassKind::Interface || self.is_abstract
    }
}

impl PropertyMeta {
    /// The inline type annotation, if the doc comment carries one.
    pub fn annotation(&self) -> Option<&str> {
        self.doc.as_deref().and_then(var_annotation)
    }

    /// The doc comment on one line, without `/**`, `*/` or leading `*`.
    pub fn doc_text(&self) -> Option<String> {
        let doc = self.doc.as_deref()?.trim();
        let body = doc.strip_prefix("/**").unwrap_or(doc);
        let body = body.strip_suffix("*/").unwrap_or(body);
        let text = body
            .lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!text.is_empty()).then_some(text)
    }
}

/// Extract the `@var` annotation from a doc comment.
pub fn var_annotation(doc: &str) -> Option<&str> {
    VAR_TAG
        .captures(doc)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A directory of class metadata files.
#[derive(Debug, Clone)]
pub struct ReflectionDump {
    root: PathBuf,
    namespace: String,
}

impl ReflectionDump {
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    fn class_name(&self, relative: &Path) -> String {
        let mut parts: Vec<String> = Vec::new();
        for component in relative.with_extension("").components() {
            parts.push(component.as_os_str().to_string_lossy().into_owned());
        }
        format!("{}\\{}", self.namespace, parts.join("\\"))
    }

    fn load(&self, path: &Path) -> Result<Option<ClassMeta>, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let mut meta: ClassMeta = match serde_json::from_str(&content) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "skipping non-loadable class file"
                );
                return Ok(None);
            }
        };
        if meta.name.is_empty() {
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            meta.name = self.class_name(relative);
        }
        Ok(Some(meta))
    }
}

impl ClassSource for ReflectionDump {
    fn classes(&self) -> Result<Vec<ClassMeta>, SchemaError> {
        let mut classes = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| SchemaError::Load {
                path: e.path().map_or_else(|| self.root.clone(), Path::to_path_buf),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(meta) = self.load(path)? {
                classes.push(meta);
            }
        }
        tracing::debug!(
            root = %self.root.display(),
            count = classes.len(),
            "loaded class metadata"
        );
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_var_annotation() {
        assert_eq!(var_annotation("/** @var Node\\Expr Condition */"), Some("Node\\Expr"));
        assert_eq!(var_annotation("/** @var   string[] */"), Some("string[]"));
        assert_eq!(var_annotation("/** Condition */"), None);
    }

    #[test]
    fn test_doc_text() {
        let property = |doc: &str| PropertyMeta {
            name: "cond".into(),
            is_static: false,
            doc: Some(doc.into()),
        };
        assert_eq!(
            property("/** @var Node\\Expr Condition */").doc_text().as_deref(),
            Some("@var Node\\Expr Condition")
        );
        assert_eq!(
            property("/**\n     * @var string[] Names\n     *   in order\n     */")
                .doc_text()
                .as_deref(),
            Some("@var string[] Names in order")
        );
        assert_eq!(property("/** */").doc_text(), None);
    }

    #[test]
    fn test_names_derived_from_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Stmt")).unwrap();
        std::fs::write(
            dir.path().join("Stmt").join("If_.json"),
            r#"{ "kind": "class", "parent": "PhpParser\\Node\\Stmt" }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("Stmt.json"), r#"{ "kind": "class", "abstract": true }"#)
            .unwrap();
        std::fs::write(dir.path().join("README.md"), "not a class").unwrap();
        std::fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();

        let dump = ReflectionDump::new(dir.path(), "PhpParser\\Node");
        let classes = dump.classes().unwrap();
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        // Directories are walked before their sibling files.
        assert_eq!(names, vec!["PhpParser\\Node\\Stmt\\If_", "PhpParser\\Node\\Stmt"]);
        assert!(!classes[0].is_capability());
        assert!(classes[1].is_capability());
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let dump = ReflectionDump::new(dir.path().join("missing"), "PhpParser\\Node");
        assert!(matches!(dump.classes(), Err(SchemaError::Load { .. })));
    }
}
