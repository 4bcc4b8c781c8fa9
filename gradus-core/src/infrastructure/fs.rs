// gradus-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write content to a file atomically using a temporary file.
///
/// The content lands in a temp file in the target's directory, then is
/// persisted (renamed) over the target. The target is either fully written
/// or untouched — a partial write never corrupts an existing artifact.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Same directory as the target so the rename stays on one filesystem
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Latest artifact whose file name starts with `prefix`, by lexicographic
/// file name order. Artifact names embed a `%Y%m%d_%H%M%S` timestamp, so
/// name order is chronological order.
pub fn latest_artifact(dir: &Path, prefix: &str) -> Option<PathBuf> {
    if !dir.exists() {
        return None;
    }
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .max_by(|a, b| a.file_name().cmp(b.file_name()))
        .map(|e| e.path().to_path_buf())
}

/// All Parquet files under `dir`, recursively, in stable sorted order.
pub fn collect_parquet_files(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("parquet"))
        .map(|e| e.path().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}
