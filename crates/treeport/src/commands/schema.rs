//! `treeport schema`: reflection dump to schema document.

use crate::config::TreeportConfig;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SchemaArgs {
    /// Directory holding one class-metadata JSON file per node class
    pub dump: PathBuf,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: SchemaArgs, config: &TreeportConfig) -> anyhow::Result<()> {
    let schema = super::load_schema(&args.dump, &config.conventions)?;
    let mut document = schema.to_json()?;
    document.push('\n');
    super::write_output(args.output.as_deref(), &document)
}
