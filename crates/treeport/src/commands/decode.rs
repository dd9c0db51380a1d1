//! `treeport decode`: wire text to tree, summarized or re-encoded.

use crate::config::TreeportConfig;
use anyhow::Context;
use clap::Args;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use treeport_codegen::DispatchTable;
use treeport_wire::{Decoder, Encoder, Value};

#[derive(Args)]
pub struct DecodeArgs {
    /// Wire text file
    pub wire: PathBuf,

    /// Schema document, or a reflection dump directory
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Input is a {ok, data, error} envelope rather than a bare node list
    #[arg(long)]
    pub envelope: bool,

    /// Print the decoded tree re-encoded as wire text
    #[arg(long)]
    pub reencode: bool,
}

pub fn run(args: DecodeArgs, config: &TreeportConfig) -> anyhow::Result<()> {
    let schema = super::load_schema(&args.schema, &config.conventions)?;
    let table = DispatchTable::build(&schema);
    let text = std::fs::read_to_string(&args.wire)
        .with_context(|| format!("failed to read {}", args.wire.display()))?;

    let decoder = Decoder::new(&table);
    let nodes = if args.envelope {
        decoder.decode_envelope(&text)
    } else {
        decoder.decode_str(&text)
    }
    .with_context(|| format!("failed to decode {}", args.wire.display()))?;

    let mut out = if args.reencode {
        Encoder::new(schema.wire()).encode(&Value::List(nodes))?
    } else {
        summarize(&nodes)
    };
    out.push('\n');
    super::write_output(None, &out)
}

/// Node counts per tag, below a top-level count.
fn summarize(nodes: &[Value]) -> String {
    let mut counts: BTreeMap<(&str, bool), usize> = BTreeMap::new();
    for node in nodes {
        node.walk(&mut |value| {
            if let Some(kind) = value.kind() {
                let unrecognized = matches!(value, Value::Unrecognized(_));
                *counts.entry((kind, unrecognized)).or_default() += 1;
            }
        });
    }

    let mut out = format!("{} top-level nodes", nodes.len());
    for ((tag, unrecognized), count) in counts {
        let suffix = if unrecognized { " (unrecognized)" } else { "" };
        let _ = write!(out, "\n{count:>6}  {tag}{suffix}");
    }
    out
}
