//! Inline type-annotation parser.
//!
//! Grammar:
//!
//! ```text
//! expr   := member ('|' member)*
//! member := 'null' | 'array' | 'array<' expr '>' | '(' expr ')' | member '[]' | name
//! name   := [A-Za-z0-9_\\]+
//! ```
//!
//! A `null` member marks the whole expression nullable and is dropped from
//! the member set. One remaining member collapses to that member; more
//! become a union.

use crate::ir::{Primitive, TypeDescriptor};
use crate::naming::{canonical_name, strip_separators, target_name};
use crate::{Conventions, SchemaError};

/// Parse a type hint. Returns `Ok(None)` for an empty hint.
pub fn parse_hint(
    hint: &str,
    conventions: &Conventions,
) -> Result<Option<TypeDescriptor>, SchemaError> {
    let trimmed = hint.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parser = HintParser {
        hint: trimmed,
        conventions,
    };
    parser.expr(trimmed).map(Some)
}

/// Resolve a bare name to a primitive or a schema reference.
pub fn resolve_name(name: &str, conventions: &Conventions) -> TypeDescriptor {
    match name {
        "bool" => return TypeDescriptor::primitive(Primitive::Bool),
        "int" => return TypeDescriptor::primitive(Primitive::Int),
        "float" => return TypeDescriptor::primitive(Primitive::Float),
        "string" => return TypeDescriptor::primitive(Primitive::String),
        "mixed" => return TypeDescriptor::primitive(Primitive::Any),
        _ => {}
    }

    let name = name.trim_start_matches('\\');
    let namespace = conventions.namespace.as_str();
    let qualified = name == namespace
        || name.starts_with(&format!("{namespace}\\"))
        || conventions.root_classes.iter().any(|c| c == name);
    let canonical = if qualified {
        canonical_name(name, conventions)
    } else {
        // Relative to the parent namespace, e.g. `Node\Expr`.
        let last = namespace.rsplit('\\').next().unwrap_or(namespace);
        let local = name
            .strip_prefix(&format!("{last}\\"))
            .unwrap_or(name);
        strip_separators(local)
    };

    match conventions.aliases.get(&canonical) {
        Some(alias) => TypeDescriptor::reference(alias.clone()),
        None => TypeDescriptor::reference(target_name(&canonical, conventions)),
    }
}

struct HintParser<'a> {
    hint: &'a str,
    conventions: &'a Conventions,
}

impl HintParser<'_> {
    fn malformed(&self) -> SchemaError {
        SchemaError::MalformedHint {
            hint: self.hint.to_string(),
        }
    }

    fn expr(&self, s: &str) -> Result<TypeDescriptor, SchemaError> {
        let parts = split_top_level(s).ok_or_else(|| self.malformed())?;

        let mut nullable = false;
        let mut members = Vec::new();
        for part in parts {
            if part == "null" {
                nullable = true;
            } else {
                members.push(self.member(part)?);
            }
        }

        let ty = if members.len() > 1 {
            TypeDescriptor::union(members)
        } else {
            members.pop().ok_or_else(|| SchemaError::EmptyHint {
                hint: self.hint.to_string(),
            })?
        };
        Ok(ty.with_nullable(nullable))
    }

    fn member(&self, part: &str) -> Result<TypeDescriptor, SchemaError> {
        if let Some(inner) = part.strip_suffix("[]") {
            return Ok(TypeDescriptor::list(self.member(inner)?));
        }
        if let Some(inner) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
            return self.expr(inner);
        }
        if let Some(inner) = part.strip_prefix("array<").and_then(|p| p.strip_suffix('>')) {
            return Ok(TypeDescriptor::list(self.expr(inner)?));
        }
        if part == "array" {
            return Ok(TypeDescriptor::list(TypeDescriptor::primitive(Primitive::Any)));
        }
        if part != "null" && is_name(part) {
            return Ok(resolve_name(part, self.conventions));
        }
        Err(self.malformed())
    }
}

/// Split on `|` outside of `(...)` and `<...>`. `None` if unbalanced or a
/// member is empty.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '<' => depth += 1,
            ')' | '>' => depth = depth.checked_sub(1)?,
            '|' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(s[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\')
}
