// gradus-core/src/application/pipeline.rs

use std::fs;
use std::path::Path;

use crate::error::GradusError;
use crate::ports::connector::Connector;

// Application Services
use crate::application::gate::run_quality_gate;
use crate::application::stage::run_stage;

// Domain
use crate::domain::error::DomainError;
use crate::domain::pipeline::{PipelineState, StageDefinition};
use crate::domain::quality::verdict::VerdictStatus;

// Infrastructure
use crate::infrastructure::config::ProjectConfig;
use crate::infrastructure::fs::{collect_parquet_files, latest_artifact};

pub const GOLD_TABLE: &str = "gold";

#[derive(Debug, serde::Serialize)]
pub struct PipelineSummary {
    pub dq_status: VerdictStatus,
    pub runs_log: String,
    pub last_report_artifact: String,
}

/// Sequence the three stages: build → report → DQ gate.
///
/// Strictly linear; each stage starts only after its predecessor's output
/// is recorded as materialized. The verdict comes back as a structured
/// value, and `stop_on_fail` decides here — and only here — whether a FAIL
/// halts the run. Every run appends one history record and writes its own
/// timestamped artifacts; nothing from earlier runs is rewritten.
pub async fn run_pipeline(
    connector: &dyn Connector,
    project_dir: &Path,
    config: &ProjectConfig,
    build_stage: &StageDefinition,
    report_stage: &StageDefinition,
) -> Result<PipelineSummary, GradusError> {
    println!("🚀 Starting Pipeline Orchestrator...");
    let start_time = std::time::Instant::now();

    let retry = config.pipeline.retry_policy();
    let gold_dir = config.gold_dir(project_dir);
    let reports_dir = config.reports_dir(project_dir);
    let logs_dir = config.logs_dir(project_dir);

    let mut state = PipelineState::PendingBuild;

    // 1. BUILD
    println!("  🔹 [{}] Stage '{}'", state, build_stage.name);
    run_stage(build_stage, &retry).await?;

    // Materialization check: the gold layer must exist before reporting
    let parquet_files = collect_parquet_files(&gold_dir);
    if parquet_files.is_empty() {
        return Err(DomainError::MissingArtifact {
            stage: build_stage.name.clone(),
            expected: format!("*.parquet under {}", gold_dir.display()),
        }
        .into());
    }
    state = state.advance();

    // 2. REPORT
    println!("  🔹 [{}] Stage '{}'", state, report_stage.name);
    run_stage(report_stage, &retry).await?;

    let last_report = latest_artifact(&reports_dir, "report_daily_").ok_or_else(|| {
        DomainError::MissingArtifact {
            stage: report_stage.name.clone(),
            expected: format!("report_daily_* under {}", reports_dir.display()),
        }
    })?;
    state = state.advance();

    // 3. DQ GATE
    println!("  🔹 [{}] Stage 'dq'", state);
    connector.register_parquet(GOLD_TABLE, &parquet_files).await?;
    let verdict = run_quality_gate(connector, GOLD_TABLE, &config.quality, &logs_dir).await?;

    // 4. POLICY
    if config.pipeline.stop_on_fail && verdict.status == VerdictStatus::Fail {
        state = PipelineState::Halted;
        println!("  ⛔ [{}] Pipeline halted by Data Quality FAIL", state);
        return Err(DomainError::QualityGateFailed {
            ratio: verdict.failed_ratio,
            threshold: verdict.threshold_ratio,
        }
        .into());
    }
    state = state.advance();
    debug_assert!(state.is_terminal());

    // 5. SUMMARY
    let summary = PipelineSummary {
        dq_status: verdict.status,
        runs_log: logs_dir.join("runs_log.csv").to_string_lossy().into_owned(),
        last_report_artifact: last_report.to_string_lossy().into_owned(),
    };
    save_summary(&logs_dir, &verdict.run_ts, &summary)?;

    println!(
        "✨ [{}] Done in {:.2}s. DQ status: {}",
        state,
        start_time.elapsed().as_secs_f64(),
        summary.dq_status
    );

    Ok(summary)
}

/// One summary artifact per run, qualified by the run timestamp.
fn save_summary(
    logs_dir: &Path,
    run_ts: &str,
    summary: &PipelineSummary,
) -> Result<(), GradusError> {
    fs::create_dir_all(logs_dir)?;
    let content = serde_json::to_string_pretty(summary)
        .map_err(|e| GradusError::InternalError(format!("Serialization: {}", e)))?;
    crate::infrastructure::fs::atomic_write(
        logs_dir.join(format!("pipeline_summary_{run_ts}.json")),
        content,
    )?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::pipeline::PipelineConfig;
    use crate::domain::quality::QualityConfig;
    use crate::domain::snapshot::{Row, Scalar};
    use crate::ports::connector::ColumnSchema;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    // --- MOCK CONNECTOR ---
    #[derive(Clone)]
    struct MockConnector {
        pub registered: Arc<Mutex<Vec<String>>>,
        g3_values: Vec<i64>,
    }

    impl MockConnector {
        fn with_grades(g3_values: &[i64]) -> Self {
            Self {
                registered: Arc::new(Mutex::new(Vec::new())),
                g3_values: g3_values.to_vec(),
            }
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn execute(&self, _query: &str) -> Result<(), GradusError> {
            Ok(())
        }
        async fn fetch_columns(&self, _table: &str) -> Result<Vec<ColumnSchema>, GradusError> {
            Ok(["school", "subject", "G1", "G2", "G3", "absences", "age"]
                .into_iter()
                .map(|name| ColumnSchema {
                    name: name.into(),
                    data_type: "VARCHAR".into(),
                    is_nullable: true,
                })
                .collect())
        }
        async fn fetch_rows(&self, _table: &str) -> Result<Vec<Row>, GradusError> {
            Ok(self
                .g3_values
                .iter()
                .map(|g| {
                    let mut row = Row::default();
                    row.insert("school", Scalar::Text("GP".into()));
                    row.insert("subject", Scalar::Text("Math".into()));
                    row.insert("G1", Scalar::Int(10));
                    row.insert("G2", Scalar::Int(11));
                    row.insert("G3", Scalar::Int(*g));
                    row.insert("absences", Scalar::Int(1));
                    row.insert("age", Scalar::Int(17));
                    row
                })
                .collect())
        }
        async fn query_scalar(&self, _query: &str) -> Result<u64, GradusError> {
            Ok(self.g3_values.len() as u64)
        }
        async fn register_csv(&self, _name: &str, _path: &str) -> Result<(), GradusError> {
            Ok(())
        }
        async fn register_parquet(
            &self,
            name: &str,
            _paths: &[String],
        ) -> Result<(), GradusError> {
            self.registered.lock().unwrap().push(name.to_string());
            Ok(())
        }
    }

    fn noop_stage(name: &str) -> StageDefinition {
        StageDefinition {
            name: name.into(),
            command: "true".into(),
            args: vec![],
        }
    }

    fn test_config(stop_on_fail: bool, threshold: f64) -> ProjectConfig {
        let yaml = "name: test\nversion: \"0\"\n";
        let mut config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        config.pipeline = PipelineConfig {
            stop_on_fail,
            stage_retry_count: 0,
            stage_retry_delay_secs: 0,
            build: None,
            report: None,
        };
        config.quality = QualityConfig {
            threshold_fail_ratio: threshold,
            ..Default::default()
        };
        config
    }

    /// Gold parquet + report artifact already materialized, stages are no-ops.
    fn scaffold(project_dir: &Path) {
        std::fs::create_dir_all(project_dir.join("data/gold")).unwrap();
        std::fs::write(project_dir.join("data/gold/student_all.parquet"), "stub").unwrap();
        std::fs::create_dir_all(project_dir.join("reports")).unwrap();
        std::fs::write(
            project_dir.join("reports/report_daily_20250101_000000.csv"),
            "stub",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_pipeline_completes_with_passing_data() {
        let dir = tempdir().unwrap();
        scaffold(dir.path());
        let connector = MockConnector::with_grades(&[10, 12, 15]);

        let summary = run_pipeline(
            &connector,
            dir.path(),
            &test_config(true, 0.02),
            &noop_stage("build"),
            &noop_stage("report"),
        )
        .await
        .unwrap();

        assert_eq!(summary.dq_status, VerdictStatus::Pass);
        assert!(summary.last_report_artifact.contains("report_daily_"));
        assert!(Path::new(&summary.runs_log).exists());
        assert_eq!(*connector.registered.lock().unwrap(), vec!["gold"]);
    }

    #[tokio::test]
    async fn test_stop_on_fail_halts_with_pipeline_error() {
        let dir = tempdir().unwrap();
        scaffold(dir.path());
        // 1 bad row out of 2: ratio 0.5 well above threshold
        let connector = MockConnector::with_grades(&[10, 25]);

        let result = run_pipeline(
            &connector,
            dir.path(),
            &test_config(true, 0.02),
            &noop_stage("build"),
            &noop_stage("report"),
        )
        .await;

        match result {
            Err(GradusError::Domain(DomainError::QualityGateFailed { ratio, threshold })) => {
                assert_eq!(ratio, 0.5);
                assert_eq!(threshold, 0.02);
            }
            other => panic!("Expected QualityGateFailed, got {other:?}"),
        }
        // The verdict was still recorded before the halt
        assert!(dir.path().join("logs/runs_log.csv").exists());
    }

    #[tokio::test]
    async fn test_stop_on_fail_disabled_returns_fail_summary() {
        let dir = tempdir().unwrap();
        scaffold(dir.path());
        let connector = MockConnector::with_grades(&[10, 25]);

        let summary = run_pipeline(
            &connector,
            dir.path(),
            &test_config(false, 0.02),
            &noop_stage("build"),
            &noop_stage("report"),
        )
        .await
        .unwrap();

        assert_eq!(summary.dq_status, VerdictStatus::Fail);
    }

    #[tokio::test]
    async fn test_missing_gold_artifact_is_fatal() {
        let dir = tempdir().unwrap();
        // No parquet scaffolding: build "succeeds" but materializes nothing
        let connector = MockConnector::with_grades(&[10]);

        let result = run_pipeline(
            &connector,
            dir.path(),
            &test_config(true, 0.02),
            &noop_stage("build"),
            &noop_stage("report"),
        )
        .await;

        assert!(matches!(
            result,
            Err(GradusError::Domain(DomainError::MissingArtifact { .. }))
        ));
        // DQ never ran
        assert!(connector.registered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_build_stage_stops_the_chain() {
        let dir = tempdir().unwrap();
        scaffold(dir.path());
        let connector = MockConnector::with_grades(&[10]);

        let failing_build = StageDefinition {
            name: "build".into(),
            command: "false".into(),
            args: vec![],
        };

        let result = run_pipeline(
            &connector,
            dir.path(),
            &test_config(true, 0.02),
            &failing_build,
            &noop_stage("report"),
        )
        .await;

        assert!(matches!(
            result,
            Err(GradusError::Domain(DomainError::StageFailed { .. }))
        ));
        assert!(connector.registered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reruns_append_history_without_rewriting() {
        let dir = tempdir().unwrap();
        scaffold(dir.path());
        let connector = MockConnector::with_grades(&[10, 12]);
        let config = test_config(true, 0.02);

        for _ in 0..2 {
            run_pipeline(
                &connector,
                dir.path(),
                &config,
                &noop_stage("build"),
                &noop_stage("report"),
            )
            .await
            .unwrap();
        }

        let store = crate::infrastructure::history::RunHistoryStore::new(
            dir.path().join("logs/runs_log.csv"),
        );
        assert_eq!(store.read_all().unwrap().len(), 2);
    }
}
