//! CLI for the dropsink share saver.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dropsink_core::config;
use std::path::PathBuf;

use commands::{run_locations, run_probe, run_save};

/// Top-level CLI for the dropsink share saver.
#[derive(Debug, Parser)]
#[command(name = "dropsink")]
#[command(about = "dropsink: save shared files, text, and URLs to a configured location", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Payload arguments shared by `save` and `probe`.
#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// Files to save. Two or more make a multi-item batch.
    pub paths: Vec<PathBuf>,

    /// Literal text or URL payload (used when no files are given).
    #[arg(long)]
    pub text: Option<String>,

    /// Title hint used when deriving a filename for a text payload.
    #[arg(long)]
    pub subject: Option<String>,

    /// Declared MIME type. Guessed from the first file when omitted.
    #[arg(long)]
    pub mime: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Save the given payload to a destination location.
    Save {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Destination folder name (required when several are configured).
        #[arg(long)]
        location: Option<String>,

        /// Run the full pipeline without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a payload can be handled, without saving it.
    Probe {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Destination folder name (required when several are configured).
        #[arg(long)]
        location: Option<String>,
    },

    /// List configured destination locations.
    Locations,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Save {
                payload,
                location,
                dry_run,
            } => run_save(&cfg, &payload, location.as_deref(), dry_run).await,
            CliCommand::Probe { payload, location } => {
                run_probe(&cfg, &payload, location.as_deref()).await
            }
            CliCommand::Locations => run_locations(&cfg),
        }
    }
}
