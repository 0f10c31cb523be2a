//! jirax CLI - Decode and receive Jira webhook events.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jirax_core::Strictness;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "jirax")]
#[command(author, version, about = "Jira webhook decoding CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    /// Strictness: true, false, or none (defaults to the configured value)
    #[arg(long, global = true, env = "JIRAX_STRICT")]
    strict: Option<Strictness>,

    /// Configuration directory (defaults to current directory)
    #[arg(long, short = 'C', global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init,

    /// Decode webhook payloads
    Decode {
        /// JSON files, directories of JSON files, or `-` for stdin
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List the webhook event types jirax knows
    Kinds,

    /// Start the webhook receiver
    Serve {
        /// Port to listen on
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let dir = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Init => commands::init(&dir, cli.format),
        Commands::Decode { paths } => commands::decode(&dir, &paths, cli.strict, cli.format),
        Commands::Kinds => commands::kinds(cli.format),
        Commands::Serve { port, host } => commands::serve(&dir, cli.strict, host, port),
    }
}
