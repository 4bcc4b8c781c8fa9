// gradus-core/src/application/gate.rs

use std::fs;
use std::path::Path;

use crate::domain::error::DomainError;
use crate::domain::quality::verdict::VerdictStatus;
use crate::domain::quality::{QualityConfig, Verdict, aggregate, compile_catalogue, evaluate};
use crate::domain::snapshot::Snapshot;
use crate::error::GradusError;
use crate::infrastructure::failures::FailureDetailSink;
use crate::infrastructure::history::RunHistoryStore;
use crate::ports::connector::Connector;

/// Evaluate the Data Quality gate over a registered table.
///
/// Loads the snapshot, runs the rule catalogue, classifies the run against
/// the tolerance threshold, persists failing rows (when any) and appends
/// one record to the runs log. Returns the Verdict; whether a FAIL halts
/// anything is the Orchestrator's decision, not ours.
pub async fn run_quality_gate(
    connector: &dyn Connector,
    table: &str,
    config: &QualityConfig,
    logs_dir: &Path,
) -> Result<Verdict, GradusError> {
    let run_ts = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();

    // 1. SNAPSHOT (loaded once, dropped at the end of this call)
    let snapshot = load_snapshot(connector, table).await?;
    if snapshot.is_empty() {
        return Err(DomainError::EmptySnapshot(table.to_string()).into());
    }

    // 2. RULES
    let rules = compile_catalogue(config);
    let matrix = evaluate(&snapshot, &rules);

    // 3. VERDICT
    let mut verdict = aggregate(
        &matrix,
        snapshot.row_count(),
        config.threshold_fail_ratio,
        run_ts.clone(),
        config.enable_uniqueness,
    );

    // 4. FAILURE DETAIL (only when something failed)
    fs::create_dir_all(logs_dir)?;
    let sink = FailureDetailSink::new(logs_dir);
    if let Some(path) = sink.persist(&snapshot, &matrix, &run_ts)? {
        verdict.fail_detail_path = path.to_string_lossy().into_owned();
    }

    // 5. RUN HISTORY (append-only)
    let store = RunHistoryStore::new(logs_dir.join("runs_log.csv"));
    store.append(&verdict)?;

    // 6. SUMMARY
    print_summary(&verdict, &matrix.breakdown(), store.path());

    Ok(verdict)
}

async fn load_snapshot(
    connector: &dyn Connector,
    table: &str,
) -> Result<Snapshot, GradusError> {
    let columns = connector.fetch_columns(table).await?;
    let names = columns.into_iter().map(|c| c.name).collect();
    let rows = connector.fetch_rows(table).await?;
    Ok(Snapshot::new(names, rows))
}

fn print_summary(verdict: &Verdict, breakdown: &[(String, usize)], log_path: &Path) {
    let icon = match verdict.status {
        VerdictStatus::Pass => "✅",
        VerdictStatus::Fail => "❌",
    };
    println!("\n{} DQ RUN {}", icon, verdict.run_ts);
    println!("   Rows           : {}", verdict.rows);
    println!("   Failing rows   : {}", verdict.failed_rows);
    println!("   Failure ratio  : {:.4}%", verdict.failed_ratio * 100.0);
    println!("   Threshold      : {:.2}%", verdict.threshold_ratio * 100.0);
    println!("   Uniqueness     : {}", verdict.uniqueness_enabled);
    println!("   Status         : {}", verdict.status);
    if verdict.fail_detail_path.is_empty() {
        println!("   Detail         : (no failures)");
    } else {
        println!("   Detail         : {}", verdict.fail_detail_path);
    }
    println!("   Log            : {}", log_path.display());

    println!("   Failures per rule:");
    for (rule, count) in breakdown {
        println!("     {rule:<24} {count}");
    }
}
