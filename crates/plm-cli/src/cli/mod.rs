//! CLI for the plm playlist mirror.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use plm_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_mirror, run_validate};

/// Top-level CLI for the plm playlist mirror.
#[derive(Debug, Parser)]
#[command(name = "plm")]
#[command(about = "plm: mirror playlist and EPG files into a local directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Wipe the output directory and download every manifest entry.
    Run {
        /// TOML manifest to mirror instead of the built-in catalog.
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Output directory (overrides the configured one).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Concurrent downloads (overrides the configured worker count).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Exit 0 even when some downloads failed.
        #[arg(long)]
        best_effort: bool,
    },

    /// Check a manifest file without downloading anything.
    Validate {
        /// TOML manifest to check.
        #[arg(value_name = "FILE")]
        manifest: PathBuf,
    },

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                manifest,
                output_dir,
                workers,
                best_effort,
            } => run_mirror(cfg, manifest.as_deref(), output_dir, workers, best_effort).await?,
            CliCommand::Validate { manifest } => run_validate(&manifest)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
