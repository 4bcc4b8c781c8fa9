// gradus/src/commands/dq.rs
//
// USE CASE: Run the Data Quality gate alone, over an existing gold layer.
// A FAIL verdict is a normal outcome here; only `gradus run` applies the
// stop_on_fail policy.

use std::path::PathBuf;

use anyhow::Context;
use gradus_core::application::pipeline::GOLD_TABLE;
use gradus_core::application::run_quality_gate;
use gradus_core::infrastructure::adapters::duckdb::DuckDBConnector;
use gradus_core::infrastructure::config::load_project_config;
use gradus_core::infrastructure::fs::collect_parquet_files;
use gradus_core::ports::connector::Connector;

pub async fn execute(project_dir: PathBuf, enable_uniqueness: bool) -> anyhow::Result<()> {
    let mut config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;

    if enable_uniqueness {
        config.quality.enable_uniqueness = true;
    }

    let gold_dir = config.gold_dir(&project_dir);
    let parquet_files = collect_parquet_files(&gold_dir);
    if parquet_files.is_empty() {
        anyhow::bail!(
            "No Parquet files under {:?}. Run 'gradus gold' first.",
            gold_dir
        );
    }

    let connector =
        DuckDBConnector::new(":memory:").context("Failed to initialize DuckDB engine")?;
    connector.register_parquet(GOLD_TABLE, &parquet_files).await?;

    let logs_dir = config.logs_dir(&project_dir);
    run_quality_gate(&connector, GOLD_TABLE, &config.quality, &logs_dir)
        .await
        .context("DQ gate evaluation failed")?;

    Ok(())
}
