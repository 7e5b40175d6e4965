pub mod alerts;
pub mod analyze;
pub mod config;
pub mod correct;
pub mod demo;
pub mod reconcile;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Resolve the data directory backing the filesystem document store: the
/// `--data-dir` flag if given, otherwise `<user data dir>/ledger-recon`.
pub fn resolve_data_dir(data_dir: &Option<String>) -> PathBuf {
    match data_dir {
        Some(path) => PathBuf::from(path),
        None => dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("ledger-recon"),
    }
}

#[derive(Parser)]
#[command(name = "reco", about = "Reconciles a general ledger against bank statements and source documents.")]
pub struct Cli {
    /// Data directory backing the filesystem document store (default: the
    /// user's data directory / ledger-recon).
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed the data directory with a sample GL, RL, invoice, and cheque.
    Demo,
    /// Print the ledger characteristics snapshot for a GL document.
    Analyze {
        /// Document id to analyze (default: the latest `grandlivre`).
        document_id: Option<String>,
        /// Print the raw snapshot as JSON instead of a formatted report.
        #[arg(long)]
        json: bool,
    },
    /// Run the anomaly detector over the latest GL/RL/source documents.
    Reconcile {
        /// ISO dates (YYYY-MM-DD) treated as non-business days, in addition
        /// to Saturdays and Sundays.
        #[arg(long = "holiday")]
        holidays: Vec<String>,
    },
    /// Inspect alerts.
    Alerts {
        #[command(subcommand)]
        command: AlertsCommands,
    },
    /// Apply a correction to a document.
    Correct {
        /// Document id to correct.
        document_id: String,
        /// Reference token scoping the correction (e.g. an invoice number).
        reference: String,
        /// Path to a JSON file with the replacement content.
        content_file: String,
        /// Which document shape to apply the correction to.
        #[arg(long, value_enum)]
        kind: CorrectionKind,
    },
    /// Inspect or update the anomaly detection configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AlertsCommands {
    /// Run reconciliation and fetch one alert plus its resolved guide.
    Get {
        /// Alert id, as printed by `reco reconcile`.
        id: u64,
        #[arg(long = "holiday")]
        holidays: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current anomaly configuration.
    Show,
    /// Set one configuration field and save.
    Set {
        /// Field name, e.g. `amount_tolerance_absolute`.
        key: String,
        /// New value.
        value: String,
    },
}

#[derive(Clone, clap::ValueEnum)]
pub enum CorrectionKind {
    Gl,
    Rl,
    Source,
}
