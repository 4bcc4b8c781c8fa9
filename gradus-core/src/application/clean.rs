// gradus-core/src/application/clean.rs

use crate::error::GradusError;
use crate::infrastructure::config::project::load_project_config;
use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::path::Path;

/// Remove the configured build artifacts (gold layer, reports).
/// The logs directory is never a default target: the runs log is an
/// append-only audit trail and survives cleanups.
pub fn clean_project(project_dir: &Path) -> Result<(), GradusError> {
    tracing::info!("🧹 Initializing gradus cleanup sequence...");

    let config = load_project_config(project_dir).map_err(GradusError::Infrastructure)?;

    let targets = if config.clean_targets.is_empty() {
        vec!["data/gold".to_string(), "reports".to_string()]
    } else {
        config.clean_targets
    };

    for target_rel_path in targets {
        // Zero-Trust Path Traversal Guard
        let rel = Path::new(&target_rel_path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(GradusError::UnsafePath(target_rel_path));
        }

        let full_path = project_dir.join(&target_rel_path);

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)
                    .map_err(|e| GradusError::Infrastructure(InfrastructureError::Io(e)))?;
            } else {
                fs::remove_file(&full_path)
                    .map_err(|e| GradusError::Infrastructure(InfrastructureError::Io(e)))?;
            }
            println!("   🗑️  Artifact removed: {}", target_rel_path);
        }
    }

    Ok(())
}
