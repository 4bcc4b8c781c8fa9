// gradus/src/commands/report.rs
//
// USE CASE: Render the KPI report artifacts from the gold layer.

use std::path::PathBuf;

use anyhow::Context;
use gradus_core::application::build_reports;
use gradus_core::infrastructure::adapters::duckdb::DuckDBConnector;
use gradus_core::infrastructure::config::load_project_config;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;

    let connector =
        DuckDBConnector::new(":memory:").context("Failed to initialize DuckDB engine")?;

    let daily = build_reports(&connector, &project_dir, &config).await?;
    println!("✨ Reports done: {}", daily.display());
    Ok(())
}
