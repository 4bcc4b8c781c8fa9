// gradus-core/src/domain/pipeline/state.rs

use serde::Serialize;

/// Pipeline progression. Transitions are strictly sequential: a stage may
/// start only after its predecessor's output is recorded as materialized.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    PendingBuild,
    PendingReport,
    PendingDq,
    Halted,
    Completed,
}

impl PipelineState {
    /// The next waiting state in the chain. Terminal states stay put.
    pub fn advance(self) -> PipelineState {
        match self {
            PipelineState::PendingBuild => PipelineState::PendingReport,
            PipelineState::PendingReport => PipelineState::PendingDq,
            PipelineState::PendingDq => PipelineState::Completed,
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Halted | PipelineState::Completed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PipelineState::PendingBuild => "PENDING_BUILD",
            PipelineState::PendingReport => "PENDING_REPORT",
            PipelineState::PendingDq => "PENDING_DQ",
            PipelineState::Halted => "HALTED",
            PipelineState::Completed => "COMPLETED",
        };
        write!(f, "{label}")
    }
}
