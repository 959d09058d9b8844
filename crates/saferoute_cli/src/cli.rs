use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "saferoute", version, about = "SafeRoute incident report service")]
pub struct Cli {
    #[arg(long, global = true, help = "SQLite database path (overrides SAFEROUTE_DB_PATH)")]
    pub db: Option<PathBuf>,
    #[arg(long, global = true, help = "trace|debug|info|warn|error (overrides SAFEROUTE_LOG_LEVEL)")]
    pub log_level: Option<String>,
    #[arg(long, global = true, help = "Absolute log directory (overrides SAFEROUTE_LOG_DIR)")]
    pub log_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Liveness check.
    Health,
    /// Verify and store one incident report.
    Submit {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, visible_alias = "type")]
        category: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List the most recent reports, newest first.
    Reports {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List all known shelters, nearest first when a position is given.
    Shelters {
        #[arg(long, allow_negative_numbers = true, requires = "near_lng")]
        near_lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "near_lat")]
        near_lng: Option<f64>,
    },
    /// Insert or replace shelters from a JSON array file.
    ImportShelters { path: PathBuf },
    /// Load the bundled Tamil Nadu shelter list.
    SeedShelters,
}
