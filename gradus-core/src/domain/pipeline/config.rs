// gradus-core/src/domain/pipeline/config.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::stage::{RetryPolicy, StageCommand};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PipelineConfig {
    /// When true, a FAIL verdict halts the pipeline with an error.
    #[serde(default = "default_stop_on_fail")]
    pub stop_on_fail: bool,

    #[serde(default = "default_retry_count")]
    pub stage_retry_count: u32,

    #[serde(default = "default_retry_delay")]
    pub stage_retry_delay_secs: u64,

    /// External build stage. Defaults to the CLI's own `gold` subcommand.
    #[serde(default)]
    pub build: Option<StageCommand>,

    /// External report stage. Defaults to the CLI's own `report` subcommand.
    #[serde(default)]
    pub report: Option<StageCommand>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stop_on_fail: default_stop_on_fail(),
            stage_retry_count: default_retry_count(),
            stage_retry_delay_secs: default_retry_delay(),
            build: None,
            report: None,
        }
    }
}

impl PipelineConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.stage_retry_count,
            delay: Duration::from_secs(self.stage_retry_delay_secs),
        }
    }
}

fn default_stop_on_fail() -> bool {
    true
}
fn default_retry_count() -> u32 {
    2
}
fn default_retry_delay() -> u64 {
    10
}
