// gradus/src/commands/gold.rs
//
// USE CASE: Build the gold layer from the raw student CSVs.

use std::path::PathBuf;

use anyhow::Context;
use gradus_core::application::build_gold;
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

    let rows = build_gold(&connector, &project_dir, &config).await?;
    println!("✨ Gold layer built ({rows} rows)");
    Ok(())
}
