// gradus-core/src/application/stage.rs

use std::time::Instant;

use tokio::process::Command;
use tracing::{info, warn};

use crate::domain::error::DomainError;
use crate::domain::pipeline::{RetryPolicy, StageDefinition};
use crate::error::GradusError;

/// Execute one external unit of work, retrying on any failed exit.
///
/// The runner blocks until the child terminates; it never interprets the
/// unit's internals, only its exit signal. A spawn error counts as a failed
/// attempt like a non-zero exit. After the configured retries are
/// exhausted the failure escalates to a fatal stage error naming the stage
/// and the full command line.
pub async fn run_stage(stage: &StageDefinition, retry: &RetryPolicy) -> Result<(), GradusError> {
    let attempts = retry.retries + 1;
    let start = Instant::now();

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::time::sleep(retry.delay).await;
        }

        let status = Command::new(&stage.command)
            .args(&stage.args)
            .status()
            .await;

        match status {
            Ok(code) if code.success() => {
                info!(
                    stage = %stage.name,
                    attempt,
                    elapsed = ?start.elapsed(),
                    "Stage finished"
                );
                return Ok(());
            }
            Ok(code) => {
                warn!(
                    stage = %stage.name,
                    attempt,
                    max_attempts = attempts,
                    exit = ?code.code(),
                    "Stage attempt failed"
                );
            }
            Err(e) => {
                warn!(
                    stage = %stage.name,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Stage could not be spawned"
                );
            }
        }
    }

    Err(DomainError::StageFailed {
        stage: stage.name.clone(),
        command: stage.render_command(),
        attempts,
    }
    .into())
}
