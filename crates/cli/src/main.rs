//! # multiver CLI
//!
//! Diagnostics for capability detection and variant resolution: shows what
//! the running processor supports, which variant every operation resolves
//! to, and whether all supported variants agree with the baseline.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use multiver_dispatch::{init_with_override, CapabilityOverride};
use tracing_subscriber::EnvFilter;

/// Inspect multiversioned dispatch on this machine
#[derive(Parser)]
#[command(name = "multiver")]
#[command(about = "Inspect capability detection and variant dispatch")]
#[command(version)]
struct Cli {
    /// Extensions to treat as supported, comma separated (e.g. "avx2,fma").
    /// Implied extensions are added. Replaces MULTIVER_FORCE_SUPPORTED.
    #[arg(long, global = true, value_name = "LIST")]
    force_supported: Option<String>,

    /// Extensions to treat as unsupported, comma separated.
    /// Replaces MULTIVER_FORCE_UNSUPPORTED.
    #[arg(long, global = true, value_name = "LIST")]
    force_unsupported: Option<String>,

    /// Log probing and resolution at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected capability set and how it was obtained
    Caps,

    /// List the variants of each operation and the one selected
    Variants {
        /// Only show this operation
        #[arg(long)]
        op: Option<String>,
    },

    /// Run every supported variant against the baseline
    Check {
        /// Print every variant, not only failures
        #[arg(short, long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.force_supported.is_some() || cli.force_unsupported.is_some() {
        let overrides = CapabilityOverride::parse(
            cli.force_supported.as_deref(),
            cli.force_unsupported.as_deref(),
        )
        .context("Invalid capability override")?;
        init_with_override(overrides).context("Failed to install capability override")?;
    }

    match cli.command {
        Commands::Caps => commands::caps::execute(),
        Commands::Variants { op } => commands::variants::execute(op.as_deref()),
        Commands::Check { all } => commands::check::execute(all),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
