//! Integration tests for the wire codec over the PHP-Parser fixture schema.

use std::path::PathBuf;
use treeport_codegen::{Coercion, DispatchTable, FieldPlan};
use treeport_schema::{Conventions, ReflectionDump, SchemaSet, build_schema};
use treeport_wire::{
    DecodeError, Decoder, Encoder, Envelope, Node, ParseOutcome, UnrecognizedNode, Value,
};

fn fixture_schema() -> SchemaSet {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../treeport-schema/tests/fixtures/php-parser");
    let conventions = Conventions::default();
    build_schema(&ReflectionDump::new(dir, &conventions.namespace), &conventions).unwrap()
}

fn required_nodes(fields: &[FieldPlan]) -> usize {
    fields
        .iter()
        .filter(|f| !f.optional && matches!(f.coercion, Coercion::Node { .. }))
        .count()
}

/// A representative instance of `tag`. Optional fields are filled at the top
/// level only; nested references use the simplest satisfying kind, and
/// top-level dynamic fields hold a node.
fn instance(table: &DispatchTable, tag: &str, depth: usize) -> Node {
    let branch = table.branch_for(tag).unwrap();
    let mut node = Node::new(tag).with_attribute("startLine", (depth as i64 + 1).into());
    for plan in &branch.fields {
        let value = if plan.optional && depth > 0 {
            Value::Null
        } else if plan.binary_safe {
            Value::Bytes(b"x".to_vec())
        } else {
            synthesize(table, &plan.coercion, depth)
        };
        node = node.with_field(plan.raw_name.clone(), value);
    }
    node
}

fn synthesize(table: &DispatchTable, coercion: &Coercion, depth: usize) -> Value {
    match coercion {
        Coercion::Int => Value::Int(7),
        Coercion::Float => Value::Float(1.5),
        Coercion::Bool => Value::Bool(true),
        Coercion::Str => Value::Str("x".into()),
        Coercion::Dynamic if depth == 0 => {
            let simplest = table
                .branches()
                .iter()
                .min_by_key(|b| required_nodes(&b.fields))
                .unwrap();
            instance(table, &simplest.raw_tag, depth + 1).into()
        }
        Coercion::Dynamic => Value::Str("dynamic".into()),
        Coercion::Node { ty } => {
            let candidate = table
                .branches()
                .iter()
                .filter(|b| b.satisfies(ty))
                .min_by_key(|b| required_nodes(&b.fields))
                .unwrap();
            instance(table, &candidate.raw_tag, depth + 1).into()
        }
        Coercion::Slice {
            item,
            item_optional,
        } => {
            let mut items = Vec::new();
            if depth == 0 {
                items.push(synthesize(table, item, depth));
                if *item_optional {
                    items.push(Value::Null);
                }
            }
            Value::List(items)
        }
    }
}

#[test]
fn round_trip_every_branch() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let encoder = Encoder::new(schema.wire());
    let decoder = Decoder::new(&table);

    assert_eq!(table.branches().len(), 20);
    for branch in table.branches() {
        let node = instance(&table, &branch.raw_tag, 0);
        let text = encoder.encode_nodes(std::slice::from_ref(&node)).unwrap();
        let decoded = decoder.decode_str(&text).unwrap();
        assert_eq!(decoded, vec![Value::from(node)], "{}", branch.raw_tag);
    }
}

#[test]
fn union_field_holding_a_node_round_trips() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let closure = Node::new("ExprClosure")
        .with_field("static", false)
        .with_field("byRef", false)
        .with_field("returnType", Node::new("Identifier").with_field("name", "int"))
        .with_field("stmts", Vec::<Value>::new());

    let text = Encoder::new(schema.wire()).encode_nodes(&[closure.clone()]).unwrap();
    let decoded = Decoder::new(&table).decode_str(&text).unwrap();
    let return_type = decoded[0].as_node().unwrap().get("returnType").unwrap();
    assert_eq!(return_type.as_node().map(|n| n.kind.as_str()), Some("Identifier"));
    assert_eq!(decoded, vec![Value::from(closure)]);
}

#[test]
fn binary_field_decodes_to_bytes() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let encoder = Encoder::new(schema.wire());
    let decoder = Decoder::new(&table);

    let node = Node::new("ScalarString").with_field("value", b"abc".to_vec());
    let text = encoder.encode_nodes(std::slice::from_ref(&node)).unwrap();
    assert_eq!(decoder.decode_str(&text).unwrap(), vec![Value::from(node)]);

    // A string payload is carried as the same bytes.
    let text = encoder
        .encode_nodes(&[Node::new("ScalarString").with_field("value", "abc")])
        .unwrap();
    let decoded = decoder.decode_str(&text).unwrap();
    let value = decoded[0].as_node().unwrap().get("value").unwrap();
    assert_eq!(value, &Value::Bytes(b"abc".to_vec()));
}

#[test]
fn wire_text_layout() {
    let schema = fixture_schema();
    let echo = Node::new("StmtEcho")
        .with_field(
            "exprs",
            vec![Value::from(Node::new("ScalarString").with_field("value", "hi"))],
        )
        .with_attribute("startLine", 1.into())
        .with_attribute("endLine", 1.into());
    let text = Encoder::new(schema.wire()).encode_nodes(&[echo]).unwrap();
    insta::assert_snapshot!(text, @r#"
[
    {
        "nodeType": "StmtEcho",
        "exprs": [
            {
                "nodeType": "ScalarString",
                "value": "aGk=",
                "attributes": {}
            }
        ],
        "attributes": {
            "startLine": 1,
            "endLine": 1
        }
    }
]
"#);
}

#[test]
fn unknown_tag_decodes_to_sentinel() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoder = Decoder::new(&table);

    let decoded = decoder.decode_str(r#"[{"nodeType":"FutureKind","x":1}]"#).unwrap();
    let expected = UnrecognizedNode {
        kind: "FutureKind".into(),
        data: serde_json::json!({ "x": 1 }).as_object().unwrap().clone(),
    };
    assert_eq!(decoded, vec![Value::Unrecognized(Box::new(expected))]);

    // Re-encoding keeps the original object.
    let text = Encoder::new(schema.wire()).encode(&decoded[0]).unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, serde_json::json!({ "nodeType": "FutureKind", "x": 1 }));
}

#[test]
fn unknown_tag_satisfies_any_reference() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoded = Decoder::new(&table)
        .decode_str(
            r#"[{"nodeType":"StmtExpression","expr":{"nodeType":"ExprMatch"},"attributes":{}}]"#,
        )
        .unwrap();
    let stmt = decoded[0].as_node().unwrap();
    assert_eq!(stmt.get("expr").and_then(Value::kind), Some("ExprMatch"));
}

#[test]
fn binary_payload_survives_round_trip() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let raw = vec![0xffu8, 0xfe, b'h', 0x00, 0xc3];
    let node = Node::new("ScalarString").with_field("value", raw.clone());

    let text = Encoder::new(schema.wire()).encode_nodes(&[node]).unwrap();
    assert!(text.contains("\"value\": \"//5oAMM=\""));
    let decoded = Decoder::new(&table).decode_str(&text).unwrap();
    let value = decoded[0].as_node().unwrap().get("value").unwrap();
    assert_eq!(value, &Value::Bytes(raw));
}

#[test]
fn missing_required_field_is_an_error() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoder = Decoder::new(&table);

    for text in [
        r#"[{"nodeType":"StmtExpression","attributes":{}}]"#,
        r#"[{"nodeType":"StmtExpression","expr":null,"attributes":{}}]"#,
    ] {
        let err = decoder.decode_str(text).unwrap_err();
        assert!(
            matches!(&err, DecodeError::MissingField { node, field }
                if node == "StmtExpression" && field == "expr"),
            "{err:?}"
        );
    }
}

#[test]
fn optional_field_may_be_absent() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoded = Decoder::new(&table)
        .decode_str(
            r#"[{"nodeType":"StmtIf","cond":{"nodeType":"ScalarLNumber","value":1},"stmts":[],"elseifs":[]}]"#,
        )
        .unwrap();
    let stmt = decoded[0].as_node().unwrap();
    assert_eq!(stmt.get("else"), Some(&Value::Null));
    assert!(stmt.attributes.is_empty());
}

#[test]
fn wrong_shapes_are_errors() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoder = Decoder::new(&table);

    let err = decoder
        .decode_str(r#"[{"nodeType":"ScalarLNumber","value":"7"}]"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::WrongShape { expected: "int", found: "string", .. }));

    let err = decoder
        .decode_str(r#"[{"nodeType":"ScalarLNumber","value":7.25}]"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::WrongShape { expected: "int", .. }));

    let err = decoder
        .decode_str(r#"[{"nodeType":"StmtExpression","expr":{"nodeType":"StmtNop"}}]"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::NotSatisfied { expected, found, .. }
        if expected == "Expr" && found == "NopStmt"));

    let err = decoder
        .decode_str(r#"[{"nodeType":"StmtNop","attributes":3}]"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::BadMetadata { .. }));

    let err = decoder.decode_str(r#"{"nodeType":"StmtNop"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::NotAList { found: "object" }));

    let err = decoder
        .decode_str(r#"[{"nodeType":"ScalarString","value":"not base64!"}]"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::Base64 { .. }));
}

#[test]
fn integral_floats_narrow_and_extra_fields_are_ignored() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoded = Decoder::new(&table)
        .decode_str(r#"[{"nodeType":"ScalarLNumber","value":7.0,"kind":10,"attributes":{}}]"#)
        .unwrap();
    let node = decoded[0].as_node().unwrap();
    assert_eq!(node.get("value"), Some(&Value::Int(7)));
    assert!(node.get("kind").is_none());
}

#[test]
fn envelope_round_trip() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let encoder = Encoder::new(schema.wire());
    let nodes = vec![Node::new("StmtNop").with_attribute("startLine", 1.into())];

    let envelope = Envelope::from_outcome(&ParseOutcome::Parsed(nodes.clone()), &encoder).unwrap();
    let text = envelope.to_json().unwrap();
    let decoded = Decoder::new(&table).decode_envelope(&text).unwrap();
    assert_eq!(decoded, vec![Value::from(nodes[0].clone())]);
}

#[test]
fn failed_parse_is_distinct_from_empty_program() {
    let schema = fixture_schema();
    let table = DispatchTable::build(&schema);
    let decoder = Decoder::new(&table);

    let err = decoder
        .decode_envelope(
            r#"{"ok":false,"data":"","error":"Syntax error, unexpected EOF on line 3"}"#,
        )
        .unwrap_err();
    assert!(matches!(err, DecodeError::ParseFailed { message } if message.ends_with("line 3")));

    let empty = decoder
        .decode_envelope(r#"{"ok":true,"data":"[]","error":""}"#)
        .unwrap();
    assert!(empty.is_empty());
}
