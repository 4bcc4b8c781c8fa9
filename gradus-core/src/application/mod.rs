// gradus-core/src/application/mod.rs

pub mod clean;
pub mod gate;
pub mod gold;
pub mod pipeline;
pub mod report;
pub mod stage;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Cela permet au CLI de faire :
// `use gradus_core::application::{run_pipeline, run_quality_gate, ...};`
// sans avoir à connaître la structure interne des fichiers.

pub use clean::clean_project;
pub use gate::run_quality_gate;
pub use gold::build_gold;
pub use pipeline::{PipelineSummary, run_pipeline};
pub use report::build_reports;
pub use stage::run_stage;
