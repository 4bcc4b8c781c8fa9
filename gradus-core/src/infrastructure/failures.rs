// gradus-core/src/infrastructure/failures.rs

use std::path::{Path, PathBuf};

use crate::domain::quality::rules::RuleMatrix;
use crate::domain::snapshot::{Scalar, Snapshot};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::tabular::write_line;

/// Writes the failing rows of a run, annotated with per-rule outcomes,
/// for triage. One artifact per failing run, qualified by the run
/// timestamp. Two runs within the same second colliding on the file name
/// is a known limitation.
pub struct FailureDetailSink {
    dir: PathBuf,
}

impl FailureDetailSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist the failing rows. Returns `None` — and writes nothing —
    /// when every row passed.
    pub fn persist(
        &self,
        snapshot: &Snapshot,
        matrix: &RuleMatrix,
        run_ts: &str,
    ) -> Result<Option<PathBuf>, InfrastructureError> {
        let failing = matrix.failing_rows();
        if failing.is_empty() {
            return Ok(None);
        }

        let mut header: Vec<String> = snapshot.columns().to_vec();
        let rule_names: Vec<String> = matrix.rule_names().cloned().collect();
        for rule in &rule_names {
            header.push(format!("check_{rule}"));
        }

        let mut content = write_line(&header);
        content.push('\n');

        for index in failing {
            let mut fields: Vec<String> = snapshot
                .columns()
                .iter()
                .map(|column| {
                    snapshot.rows()[index]
                        .get(column)
                        .unwrap_or(&Scalar::Null)
                        .render()
                })
                .collect();
            for rule in &rule_names {
                let passed = matrix
                    .outcomes(rule)
                    .map(|col| col[index])
                    .unwrap_or(false);
                fields.push(passed.to_string());
            }
            content.push_str(&write_line(&fields));
            content.push('\n');
        }

        let path = self.dir.join(format!("dq_failures_{run_ts}.csv"));
        atomic_write(&path, content)?;
        Ok(Some(path))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
