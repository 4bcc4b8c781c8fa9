// gradus-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Snapshot '{0}' is empty: the DQ Gate refuses datasets with zero rows")]
    #[diagnostic(
        code(gradus::domain::empty_snapshot),
        help("An empty gold layer means an upstream stage failed. Re-run 'gradus gold'.")
    )]
    EmptySnapshot(String),

    #[error("Stage '{stage}' failed after {attempts} attempt(s): {command}")]
    #[diagnostic(
        code(gradus::domain::stage_failed),
        help("The external command kept exiting non-zero. Check its own logs.")
    )]
    StageFailed {
        stage: String,
        command: String,
        attempts: u32,
    },

    #[error(
        "Data Quality FAIL: failure ratio {ratio:.4} exceeds threshold {threshold:.4}, pipeline halted"
    )]
    #[diagnostic(
        code(gradus::domain::quality_gate),
        help("Inspect the fail detail artifact in the logs directory, or re-run with stop_on_fail disabled.")
    )]
    QualityGateFailed { ratio: f64, threshold: f64 },

    #[error("Stage '{stage}' produced no artifact: expected {expected}")]
    #[diagnostic(code(gradus::domain::missing_artifact))]
    MissingArtifact { stage: String, expected: String },
}
