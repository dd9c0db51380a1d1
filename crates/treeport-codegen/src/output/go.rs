//! Go backend.
//!
//! Capabilities become interfaces with an unexported marker method; every
//! (concrete type, capability ancestor) pair gets a one-line marker
//! implementation, which stands in for multiple inheritance. The decoder is a
//! `switch` on the raw tag built from the [`DispatchTable`].

use crate::dispatch::{Coercion, DispatchTable, FieldPlan};
use crate::output::pad;
use crate::traits::{Backend, Mode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use treeport_schema::naming::{field_name, marker_name};
use treeport_schema::{NodeSchema, SchemaSet, WireFormat};

const HEADER: &str = "// Code generated by treeport; DO NOT EDIT.\n";

/// Go type of the per-node metadata bag.
const METADATA_TYPE: &str = "map[string]any";

/// Placeholders in [`PRELUDE`] for the types package qualifier and the root
/// interface.
const QUALIFIER: &str = "$AST.";
const ROOT: &str = "$ROOT";

/// Options for Go code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoOptions {
    /// Package name of the type declarations.
    pub package: String,
    /// Package name of the decoder.
    pub decoder_package: String,
    /// Import path of the type declarations, as seen from the decoder.
    pub import_path: String,
}

impl Default for GoOptions {
    fn default() -> Self {
        Self {
            package: "ast".into(),
            decoder_package: "astdecode".into(),
            import_path: "ast".into(),
        }
    }
}

/// Go code generator.
#[derive(Debug, Clone, Default)]
pub struct GoBackend {
    options: GoOptions,
}

impl GoBackend {
    pub fn new(options: GoOptions) -> Self {
        Self { options }
    }

    /// Capabilities with the root first, the rest in schema order.
    fn capabilities<'a>(schema: &'a SchemaSet) -> Vec<&'a NodeSchema> {
        let mut caps: Vec<&NodeSchema> = schema.capabilities().collect();
        caps.sort_by_key(|c| c.type_name != schema.root());
        caps
    }

    fn render_types(&self, schema: &SchemaSet) -> String {
        let root = schema.root();
        let mut out = String::new();
        out.push_str(HEADER);
        let _ = writeln!(out, "\npackage {}\n", self.options.package);

        let capabilities = Self::capabilities(schema);
        out.push_str("type (\n");
        for (i, cap) in capabilities.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if cap.type_name != root {
                out.push_str(&class_comment(cap));
            }
            let _ = writeln!(out, "\t{} interface {{", cap.type_name);
            for sup in cap.supers.iter().filter(|s| schema.is_capability(s)) {
                let _ = writeln!(out, "\t\t{sup}");
            }
            let _ = writeln!(out, "\t\t{}()", marker_name(&cap.type_name, root));
            out.push_str("\t}\n");
        }
        out.push_str(")\n\ntype (\n");

        for node in schema.concrete() {
            out.push_str(&class_comment(node));
            self.render_struct(schema, node, &mut out);
            out.push('\n');
        }
        out.push_str("\t// Unrecognized is a node whose tag is not part of this schema.\n");
        out.push_str("\tUnrecognized struct {\n");
        out.push_str("\t\tNodeType string\n");
        out.push_str("\t\tData     map[string]any\n");
        out.push_str("\t}\n)\n");

        for cap in &capabilities {
            let marker = marker_name(&cap.type_name, root);
            let _ = writeln!(out, "\n// {}", cap.type_name);
            for node in schema.concrete() {
                if schema
                    .capability_ancestors(&node.type_name)
                    .contains(&cap.type_name.as_str())
                {
                    let _ = writeln!(out, "func (*{}) {marker}() {{}}", node.type_name);
                }
            }
            let _ = writeln!(out, "func (*Unrecognized) {marker}() {{}}");
        }
        out
    }

    /// One member per field, then the metadata bag. Doc comments trail their
    /// member and align within each run of commented lines, as gofmt does.
    fn render_struct(&self, schema: &SchemaSet, node: &NodeSchema, out: &mut String) {
        let mut rows: Vec<(String, String, Option<&str>)> = node
            .fields
            .iter()
            .map(|field| {
                let coercion = Coercion::for_descriptor(field.type_descriptor.as_ref());
                (
                    field.normalized_name.clone(),
                    go_type(schema, &coercion, ""),
                    field.doc.as_deref(),
                )
            })
            .collect();
        rows.push((metadata_field(schema.wire()), METADATA_TYPE.to_string(), None));

        let _ = writeln!(out, "\t{} struct {{", node.type_name);
        let name_width = rows.iter().map(|(name, ..)| name.len()).max().unwrap_or(0);
        for run in rows.chunk_by(|a, b| a.2.is_some() == b.2.is_some()) {
            let type_width = run.iter().map(|(_, ty, _)| ty.len()).max().unwrap_or(0);
            for (name, ty, doc) in run {
                let _ = match doc {
                    Some(doc) => writeln!(
                        out,
                        "\t\t{} {} // {doc}",
                        pad(name, name_width),
                        pad(ty, type_width)
                    ),
                    None => writeln!(out, "\t\t{} {ty}", pad(name, name_width)),
                };
            }
        }
        out.push_str("\t}\n");
    }

    fn render_decoder(&self, schema: &SchemaSet) -> String {
        let table = DispatchTable::build(schema);
        let wire = table.wire();
        let qualifier = format!("{}.", self.options.package);

        let mut out = String::new();
        out.push_str(HEADER);
        let _ = writeln!(out, "\npackage {}\n", self.options.decoder_package);
        out.push_str("import (\n");
        for import in ["encoding/base64", "encoding/json", "fmt", "math"] {
            let _ = writeln!(out, "\t\"{import}\"");
        }
        out.push('\n');
        let last_segment = self
            .options
            .import_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.options.import_path);
        if last_segment == self.options.package {
            let _ = writeln!(out, "\t\"{}\"", self.options.import_path);
        } else {
            let _ = writeln!(
                out,
                "\t{} \"{}\"",
                self.options.package, self.options.import_path
            );
        }
        out.push_str(")\n\n");

        out.push_str("const (\n");
        let _ = writeln!(out, "\t{} = {:?}", pad("discriminator", 13), wire.discriminator);
        let _ = writeln!(out, "\t{} = {:?}", pad("metadataKey", 13), wire.metadata_key);
        out.push_str(")\n\n");

        let mut binary: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for field in &wire.binary_fields {
            binary.entry(&field.node).or_default().push(&field.field);
        }
        if binary.is_empty() {
            out.push_str("var binarySafeFields = map[string]map[string]bool{}\n\n");
        } else {
            out.push_str("var binarySafeFields = map[string]map[string]bool{\n");
            for (node, fields) in &binary {
                let entries: Vec<String> = fields.iter().map(|f| format!("{f:?}: true")).collect();
                let _ = writeln!(out, "\t{node:?}: {{{}}},", entries.join(", "));
            }
            out.push_str("}\n\n");
        }

        let _ = writeln!(
            out,
            "func decodeNode(nodeType string, data map[string]any) {qualifier}{} {{",
            table.root()
        );
        out.push_str("\tswitch nodeType {\n");
        let metadata_key = format!("{}:", metadata_field(wire));
        for branch in table.branches() {
            let _ = writeln!(out, "\tcase {:?}:", branch.raw_tag);
            let _ = writeln!(out, "\t\treturn &{qualifier}{}{{", branch.type_name);
            let width = branch
                .fields
                .iter()
                .map(|f| f.field_name.len() + 1)
                .chain([metadata_key.len()])
                .max()
                .unwrap_or(0);
            for field in &branch.fields {
                let key = format!("{}:", field.field_name);
                let _ = writeln!(
                    out,
                    "\t\t\t{} {},",
                    pad(&key, width),
                    field_expr(schema, field, &qualifier)
                );
            }
            let _ = writeln!(
                out,
                "\t\t\t{} optional(coerceMap)(data[metadataKey]),",
                pad(&metadata_key, width)
            );
            out.push_str("\t\t}\n");
        }
        out.push_str("\tdefault:\n");
        let _ = writeln!(
            out,
            "\t\treturn &{qualifier}Unrecognized{{NodeType: nodeType, Data: data}}"
        );
        out.push_str("\t}\n}\n\n");

        out.push_str(
            &PRELUDE
                .replace(QUALIFIER, &qualifier)
                .replace(ROOT, table.root()),
        );
        out
    }
}

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn language(&self) -> &'static str {
        "go"
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn generate(&self, schema: &SchemaSet, mode: Mode) -> String {
        tracing::debug!(mode = %mode, package = %self.options.package, "rendering go");
        match mode {
            Mode::Types => self.render_types(schema),
            Mode::Decoder => self.render_decoder(schema),
        }
    }
}

/// Go member name of the metadata bag.
fn metadata_field(wire: &WireFormat) -> String {
    field_name(&wire.metadata_key)
}

/// `// <rawTag> : <supers>`
fn class_comment(node: &NodeSchema) -> String {
    if node.supers.is_empty() {
        format!("\t// {}\n", node.raw_tag)
    } else {
        format!("\t// {} : {}\n", node.raw_tag, node.supers.join(", "))
    }
}

/// Go type of a reference. Concrete types with concrete subtypes widen to
/// the root interface, since a `*T` field cannot hold a subtype.
fn reference_type(schema: &SchemaSet, ty: &str, qualifier: &str) -> String {
    if schema.is_capability(ty) {
        format!("{qualifier}{ty}")
    } else if schema
        .concrete()
        .any(|s| s.type_name != ty && s.supers.iter().any(|sup| sup == ty))
    {
        format!("{qualifier}{}", schema.root())
    } else {
        format!("*{qualifier}{ty}")
    }
}

fn go_type(schema: &SchemaSet, coercion: &Coercion, qualifier: &str) -> String {
    match coercion {
        Coercion::Int => "int".into(),
        Coercion::Float => "float64".into(),
        Coercion::Bool => "bool".into(),
        Coercion::Str => "string".into(),
        Coercion::Dynamic => "any".into(),
        Coercion::Node { ty } => reference_type(schema, ty, qualifier),
        Coercion::Slice { item, .. } => format!("[]{}", go_type(schema, item, qualifier)),
    }
}

/// A Go expression of type `func(any) T` for `coercion`.
fn coercer(schema: &SchemaSet, coercion: &Coercion, qualifier: &str) -> String {
    match coercion {
        Coercion::Int => "coerceInt".into(),
        Coercion::Float => "coerceFloat".into(),
        Coercion::Bool => "coerceBool".into(),
        Coercion::Str => "coerceString".into(),
        Coercion::Dynamic => "coerceAny".into(),
        Coercion::Node { ty } => {
            format!("coerceNode[{}]", reference_type(schema, ty, qualifier))
        }
        Coercion::Slice {
            item,
            item_optional,
        } => {
            let inner = coercer(schema, item, qualifier);
            if *item_optional && **item != Coercion::Dynamic {
                format!("sliceOf(optional({inner}))")
            } else {
                format!("sliceOf({inner})")
            }
        }
    }
}

fn field_expr(schema: &SchemaSet, field: &FieldPlan, qualifier: &str) -> String {
    let value = format!("data[{:?}]", field.raw_name);
    match &field.coercion {
        Coercion::Dynamic => value,
        coercion if field.optional => {
            format!("optional({})({value})", coercer(schema, coercion, qualifier))
        }
        coercion => format!("{}({value})", coercer(schema, coercion, qualifier)),
    }
}

const PRELUDE: &str = r#"// DecodeJSON decodes wire text holding a list of nodes. Shape errors in
// recognized nodes are returned as errors; unknown tags decode to
// *Unrecognized.
func DecodeJSON(text []byte) (nodes []$AST.$ROOT, err error) {
	var raw []any
	if err := json.Unmarshal(text, &raw); err != nil {
		return nil, err
	}
	defer func() {
		if r := recover(); r != nil {
			nodes, err = nil, fmt.Errorf("decode: %v", r)
		}
	}()
	nodes = make([]$AST.$ROOT, len(raw))
	for i, item := range raw {
		nodes[i] = coerceNode[$AST.$ROOT](decodeValue(item))
	}
	return nodes, nil
}

// decodeValue replaces every tagged object below v with its node.
func decodeValue(v any) any {
	switch v := v.(type) {
	case map[string]any:
		tag, ok := v[discriminator].(string)
		if !ok {
			for k, item := range v {
				v[k] = decodeValue(item)
			}
			return v
		}
		data := make(map[string]any, len(v))
		for k, item := range v {
			switch {
			case k == discriminator:
			case k == metadataKey:
				data[k] = item
			case binarySafeFields[tag][k]:
				data[k] = decodeBinary(item)
			default:
				data[k] = decodeValue(item)
			}
		}
		return decodeNode(tag, data)
	case []any:
		for i, item := range v {
			v[i] = decodeValue(item)
		}
		return v
	default:
		return v
	}
}

func decodeBinary(v any) any {
	s, ok := v.(string)
	if !ok {
		return v
	}
	b, err := base64.StdEncoding.DecodeString(s)
	if err != nil {
		panic(fmt.Sprintf("invalid base64 payload: %v", err))
	}
	return string(b)
}

func coerceInt(v any) int {
	f, ok := v.(float64)
	if !ok || f != math.Trunc(f) {
		panic(fmt.Sprintf("expected integer, got %#v", v))
	}
	return int(f)
}

func coerceFloat(v any) float64 {
	f, ok := v.(float64)
	if !ok {
		panic(fmt.Sprintf("expected number, got %#v", v))
	}
	return f
}

func coerceBool(v any) bool {
	b, ok := v.(bool)
	if !ok {
		panic(fmt.Sprintf("expected bool, got %#v", v))
	}
	return b
}

func coerceString(v any) string {
	s, ok := v.(string)
	if !ok {
		panic(fmt.Sprintf("expected string, got %#v", v))
	}
	return s
}

func coerceMap(v any) map[string]any {
	m, ok := v.(map[string]any)
	if !ok {
		panic(fmt.Sprintf("expected object, got %#v", v))
	}
	return m
}

func coerceAny(v any) any {
	return v
}

func coerceNode[T any](v any) T {
	n, ok := v.(T)
	if !ok {
		panic(fmt.Sprintf("unexpected node %T", v))
	}
	return n
}

func optional[T any](coerce func(any) T) func(any) T {
	return func(v any) T {
		if v == nil {
			var zero T
			return zero
		}
		return coerce(v)
	}
}

func sliceOf[T any](item func(any) T) func(any) []T {
	return func(v any) []T {
		items, ok := v.([]any)
		if !ok {
			panic(fmt.Sprintf("expected list, got %#v", v))
		}
		out := make([]T, len(items))
		for i, x := range items {
			out[i] = item(x)
		}
		return out
	}
}
"#;
