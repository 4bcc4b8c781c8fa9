// gradus-core/src/application/gold.rs

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::domain::error::DomainError;
use crate::error::GradusError;
use crate::infrastructure::config::ProjectConfig;
use crate::ports::connector::Connector;

/// Build the gold layer: every raw student CSV, unioned with its subject
/// label, key numeric columns coerced, derived features appended, written
/// as a single Parquet file.
///
/// Returns the number of gold rows. No raw CSVs is a fatal input error —
/// there is nothing to retry.
pub async fn build_gold(
    connector: &dyn Connector,
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<u64, GradusError> {
    let raw_dir = config.raw_dir(project_dir);
    let gold_dir = config.gold_dir(project_dir);

    let sources = discover_raw_sources(&raw_dir);
    if sources.is_empty() {
        return Err(DomainError::MissingArtifact {
            stage: "gold".to_string(),
            expected: format!("student CSVs under {}", raw_dir.display()),
        }
        .into());
    }

    println!("📦 Building gold layer from {} raw file(s)...", sources.len());

    // One view per raw file, then one union with the subject literal
    let mut selects = Vec::new();
    for (i, (path, subject)) in sources.iter().enumerate() {
        let view = format!("raw_{i}");
        connector.register_csv(&view, path).await?;
        selects.push(format!(
            "SELECT * REPLACE (\
             TRY_CAST(G1 AS INTEGER) AS G1, \
             TRY_CAST(G2 AS INTEGER) AS G2, \
             TRY_CAST(G3 AS INTEGER) AS G3, \
             TRY_CAST(absences AS INTEGER) AS absences, \
             TRY_CAST(age AS INTEGER) AS age), \
             '{subject}' AS subject FROM \"{view}\""
        ));
    }

    let union = selects.join(" UNION ALL BY NAME ");
    connector
        .execute(&format!(
            "CREATE OR REPLACE TABLE student_all AS \
             SELECT *, ROUND((G1 + G2 + G3) / 3.0, 2) AS g_avg, \
             CAST(G3 >= 10 AS INTEGER) AS passed \
             FROM ({union})"
        ))
        .await?;

    fs::create_dir_all(&gold_dir)?;
    let out_path = gold_dir.join("student_all.parquet");
    connector
        .execute(&format!(
            "COPY student_all TO '{}' (FORMAT PARQUET)",
            out_path.to_string_lossy().replace('\'', "''")
        ))
        .await?;

    let rows = connector
        .query_scalar("SELECT count(*) FROM student_all")
        .await?;
    println!("   Gold ready: {} ({} rows)", out_path.display(), rows);

    Ok(rows)
}

/// Raw CSVs classified by subject from the file name. Files matching
/// neither pattern are skipped with a warning rather than mislabeled.
fn discover_raw_sources(raw_dir: &Path) -> Vec<(String, &'static str)> {
    if !raw_dir.exists() {
        return Vec::new();
    }

    let mut sources = Vec::new();
    let mut entries: Vec<_> = walkdir::WalkDir::new(raw_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("csv"))
        .collect();
    entries.sort_by_key(|e| e.path().to_path_buf());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        let subject = if name.contains("mat") {
            "Math"
        } else if name.contains("por") {
            "Portuguese"
        } else {
            warn!(file = %entry.path().display(), "Unclassified raw CSV, skipping");
            continue;
        };
        sources.push((entry.path().to_string_lossy().into_owned(), subject));
    }

    sources
}
