use clap::{Parser, Subcommand};
use scan_intake_core::DuplicateHandling;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "scan-intake")]
#[command(about = "Classify, validate and log barcode scans for inventory intake", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./Config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read decoded barcode text, one `text[,format]` per line, and log accepted scans
    Scan {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,
        /// Symbology for lines that do not name one
        #[arg(long, default_value = "UNKNOWN")]
        format: String,
        /// Override the user recorded on each scan
        #[arg(long)]
        user: Option<String>,
    },
    /// Classify a single code without recording it
    Classify { text: String },
    /// Show the most recent scans
    Recent {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print totals for the stored log
    Stats,
    /// List sessions found in the database
    Sessions,
    /// Delete one scan by id
    Delete { id: String },
    /// Delete every stored scan
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Write the log as CSV
    ExportCsv { path: PathBuf },
    /// Write the log as JSON records
    ExportJson { path: PathBuf },
    /// Write the log projected to spreadsheet sync rows
    SyncJson { path: PathBuf },
    /// Append records from a JSON export, skipping malformed entries
    ImportJson { path: PathBuf },
    /// Persist the duplicate policy (block or allow)
    SetDuplicates { policy: DuplicateHandling },
    /// Print configuration values
    PrintConfig,
}
