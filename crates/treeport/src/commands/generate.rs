//! `treeport generate`: type declarations or decoder source.

use crate::config::TreeportConfig;
use anyhow::anyhow;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use treeport_codegen::{GoBackend, Mode, Registry};

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Type declarations for every schema
    Types,
    /// Decoder from wire text to the generated types
    Decoder,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Types => Mode::Types,
            ModeArg::Decoder => Mode::Decoder,
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Schema document, or a reflection dump directory
    pub input: PathBuf,

    /// What to generate
    #[arg(short, long, value_enum, default_value = "types")]
    pub mode: ModeArg,

    /// Backend name
    #[arg(short, long, default_value = "go")]
    pub backend: String,

    /// Write the source here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: GenerateArgs, config: &TreeportConfig) -> anyhow::Result<()> {
    let mut registry = Registry::with_builtins();
    registry.register(Box::new(GoBackend::new(config.go.clone())));
    let backend = registry.get(&args.backend).ok_or_else(|| {
        anyhow!(
            "unknown backend {:?} (available: {})",
            args.backend,
            registry.names().join(", ")
        )
    })?;

    let schema = super::load_schema(&args.input, &config.conventions)?;
    let mode = Mode::from(args.mode);
    tracing::info!(
        backend = backend.name(),
        language = backend.language(),
        %mode,
        schemas = schema.schemas().len(),
        "generating"
    );
    let source = backend.generate(&schema, mode);
    super::write_output(args.output.as_deref(), &source)
}
