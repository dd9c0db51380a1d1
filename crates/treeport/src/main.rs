//! treeport command-line interface.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::TreeportConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "treeport",
    version,
    about = "Schema extraction, code generation and wire decoding for syntax trees"
)]
struct Cli {
    /// Configuration file (default: ./treeport.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a schema document from a reflection dump
    Schema(commands::schema::SchemaArgs),
    /// Generate type declarations or a decoder
    Generate(commands::generate::GenerateArgs),
    /// Decode wire text and summarize the tree
    Decode(commands::decode::DecodeArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = TreeportConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Schema(args) => commands::schema::run(args, &config),
        Command::Generate(args) => commands::generate::run(args, &config),
        Command::Decode(args) => commands::decode::run(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
