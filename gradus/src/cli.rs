// gradus/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gradus")]
#[command(about = "The Data Quality Gate & Pipeline for the edu-data-platform", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the full pipeline (Gold -> Reports -> Data Quality)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Enable the composite-key uniqueness rule for this run
        #[arg(long)]
        enable_uniqueness: bool,

        /// Complete the pipeline even when the DQ verdict is FAIL
        #[arg(long)]
        no_stop_on_fail: bool,
    },

    /// 🧪 Runs the Data Quality gate over the gold layer
    Dq {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Enable the composite-key uniqueness rule for this run
        #[arg(long)]
        enable_uniqueness: bool,
    },

    /// 📦 Builds the gold layer from the raw student CSVs
    Gold {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 📊 Renders the KPI report artifacts from the gold layer
    Report {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 📜 Shows the DQ run history (audit log)
    History {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Number of most recent runs to display
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// 🧹 Cleans build artifacts (gold layer, reports)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}
