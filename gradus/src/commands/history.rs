// gradus/src/commands/history.rs
//
// USE CASE: Display the DQ run history (audit log).

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use gradus_core::domain::quality::VerdictStatus;
use gradus_core::infrastructure::config::load_project_config;
use gradus_core::infrastructure::history::RunHistoryStore;

pub fn execute(project_dir: PathBuf, limit: usize) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;

    let store = RunHistoryStore::new(config.logs_dir(&project_dir).join("runs_log.csv"));
    let records = store.read_all().context("Cannot read the runs log")?;

    if records.is_empty() {
        println!("📜 No DQ runs recorded yet. Run 'gradus dq' first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "run_ts",
        "status",
        "rows",
        "failed",
        "ratio",
        "threshold",
        "uniqueness",
        "detail",
    ]);

    let start = records.len().saturating_sub(limit);
    for record in &records[start..] {
        let status = match record.status {
            VerdictStatus::Pass => "✅ PASS",
            VerdictStatus::Fail => "❌ FAIL",
        };
        table.add_row(vec![
            Cell::new(&record.run_ts),
            Cell::new(status),
            Cell::new(record.rows),
            Cell::new(record.failed_rows),
            Cell::new(format!("{:.4}", record.failed_ratio)),
            Cell::new(record.threshold_ratio),
            Cell::new(record.uniqueness_enabled),
            Cell::new(if record.fail_detail_path.is_empty() {
                "-"
            } else {
                record.fail_detail_path.as_str()
            }),
        ]);
    }

    println!("{table}");
    println!("   {} run(s) total", records.len());
    Ok(())
}
