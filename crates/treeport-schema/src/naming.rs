//! Canonical and target names.
//!
//! A class `PhpParser\Node\Stmt\If_` has the canonical (raw) name `StmtIf`,
//! which is also its wire tag, and the target name `IfStmt`, used for
//! generated declarations. The two must stay stable across regenerations.

use crate::Conventions;

/// Canonical name of a fully qualified class name.
pub fn canonical_name(class: &str, conventions: &Conventions) -> String {
    let class = class.trim_start_matches('\\');
    if class == conventions.namespace {
        let last = class.rsplit('\\').next().unwrap_or(class);
        return strip_separators(last);
    }
    if conventions.root_classes.iter().any(|c| c == class) {
        return conventions.root_capability.clone();
    }
    let prefix = format!("{}\\", conventions.namespace);
    let local = class.strip_prefix(prefix.as_str()).unwrap_or(class);
    strip_separators(local)
}

/// Target name for a canonical name: a leading category prefix becomes a suffix.
pub fn target_name(canonical: &str, conventions: &Conventions) -> String {
    for prefix in &conventions.category_prefixes {
        if let Some(rest) = canonical.strip_prefix(prefix.as_str()) {
            return format!("{rest}{prefix}");
        }
    }
    canonical.to_string()
}

/// Target-language field name for a raw property name.
pub fn field_name(raw: &str) -> String {
    upper_first(raw.trim_matches('_'))
}

/// Name of the marker operation binding a type to `capability`.
pub fn marker_name(capability: &str, root: &str) -> String {
    if capability == root {
        "node".to_string()
    } else {
        format!("{}Node", lower_first(capability))
    }
}

pub(crate) fn strip_separators(name: &str) -> String {
    name.chars().filter(|c| *c != '\\' && *c != '_').collect()
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
