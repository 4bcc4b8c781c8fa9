// gradus/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup Logging (Tracing)
    // RUST_LOG=debug gradus run ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            enable_uniqueness,
            no_stop_on_fail,
        } => commands::run::execute(project_dir, enable_uniqueness, no_stop_on_fail).await,

        Commands::Dq {
            project_dir,
            enable_uniqueness,
        } => commands::dq::execute(project_dir, enable_uniqueness).await,

        Commands::Gold { project_dir } => commands::gold::execute(project_dir).await,

        Commands::Report { project_dir } => commands::report::execute(project_dir).await,

        Commands::History { project_dir, limit } => commands::history::execute(project_dir, limit),

        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
