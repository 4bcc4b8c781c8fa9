// gradus-core/src/domain/quality/verdict.rs

use serde::{Deserialize, Serialize};

use crate::domain::quality::rules::RuleMatrix;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictStatus::Pass => write!(f, "PASS"),
            VerdictStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Structured outcome of one DQ evaluation. This is the value handed to the
/// Orchestrator — status never round-trips through captured console text.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Verdict {
    pub run_ts: String,
    pub status: VerdictStatus,
    pub rows: usize,
    pub failed_rows: usize,
    pub failed_ratio: f64,
    pub threshold_ratio: f64,
    /// Empty when the run had no failing rows.
    pub fail_detail_path: String,
    pub uniqueness_enabled: bool,
}

/// Combine per-rule outcomes into the run verdict.
///
/// A row fails when at least one rule is false for it. FAIL requires the
/// failure ratio to strictly exceed the threshold: a ratio exactly at the
/// threshold is still PASS.
pub fn aggregate(
    matrix: &RuleMatrix,
    total_rows: usize,
    threshold_ratio: f64,
    run_ts: String,
    uniqueness_enabled: bool,
) -> Verdict {
    let failed_rows = matrix.failing_rows().len();
    let failed_ratio = if total_rows == 0 {
        0.0
    } else {
        failed_rows as f64 / total_rows as f64
    };

    let status = if failed_ratio > threshold_ratio {
        VerdictStatus::Fail
    } else {
        VerdictStatus::Pass
    };

    Verdict {
        run_ts,
        status,
        rows: total_rows,
        failed_rows,
        failed_ratio,
        threshold_ratio,
        fail_detail_path: String::new(),
        uniqueness_enabled,
    }
}
