// gradus/src/commands/run.rs
//
// USE CASE: Run the full pipeline (Gold -> Reports -> Data Quality).

use std::path::{Path, PathBuf};

use anyhow::Context;
use gradus_core::application::run_pipeline;
use gradus_core::domain::pipeline::{StageCommand, StageDefinition};
use gradus_core::infrastructure::adapters::duckdb::DuckDBConnector;
use gradus_core::infrastructure::config::load_project_config;

pub async fn execute(
    project_dir: PathBuf,
    enable_uniqueness: bool,
    no_stop_on_fail: bool,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let mut config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);

    // CLI flags override the loaded struct, explicitly
    if enable_uniqueness {
        config.quality.enable_uniqueness = true;
    }
    if no_stop_on_fail {
        config.pipeline.stop_on_fail = false;
    }

    // B. Instantiate the DB Adapter (DuckDB, in-memory working session)
    let connector =
        DuckDBConnector::new(":memory:").context("Failed to initialize DuckDB engine")?;

    // C. Resolve the external stages (configured command, or our own
    // gold/report subcommands as subprocesses)
    let build_stage = resolve_stage("build", config.pipeline.build.as_ref(), "gold", &project_dir)?;
    let report_stage = resolve_stage(
        "report",
        config.pipeline.report.as_ref(),
        "report",
        &project_dir,
    )?;

    // D. Run the Pipeline (Application Layer)
    let result = run_pipeline(
        &connector,
        &project_dir,
        &config,
        &build_stage,
        &report_stage,
    )
    .await;

    match result {
        Ok(summary) => {
            println!(
                "\n✨ SUCCESS! Pipeline finished in {:.2?} (DQ: {})",
                start.elapsed(),
                summary.dq_status
            );
            println!("   Runs log   : {}", summary.runs_log);
            println!("   Last report: {}", summary.last_report_artifact);
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn resolve_stage(
    name: &str,
    configured: Option<&StageCommand>,
    subcommand: &str,
    project_dir: &Path,
) -> anyhow::Result<StageDefinition> {
    if let Some(command) = configured {
        return Ok(StageDefinition::new(name, command));
    }

    // Default: spawn ourselves, like the original flow ran its sibling scripts
    let exe = std::env::current_exe().context("Cannot resolve the gradus executable")?;
    Ok(StageDefinition {
        name: name.to_string(),
        command: exe.to_string_lossy().into_owned(),
        args: vec![
            subcommand.to_string(),
            "--project-dir".to_string(),
            project_dir.to_string_lossy().into_owned(),
        ],
    })
}
