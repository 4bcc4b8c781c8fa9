// gradus-core/src/infrastructure/history.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::quality::verdict::{Verdict, VerdictStatus};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::tabular::{split_line, write_line};

/// Fixed column schema of the runs log. Records are keyed by `run_ts` and
/// never updated or deleted once written.
const COLUMNS: [&str; 8] = [
    "run_ts",
    "status",
    "rows",
    "failed_rows",
    "failed_ratio",
    "threshold_ratio",
    "fail_detail_path",
    "uniqueness_enabled",
];

/// Append-only audit log of DQ verdicts.
///
/// Appends rewrite the whole file through a fresh buffer + atomic rename,
/// never in place, so a partial write cannot corrupt prior records.
/// Single-writer assumption: concurrent pipelines sharing one log are not a
/// supported configuration.
pub struct RunHistoryStore {
    path: PathBuf,
}

impl RunHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one verdict as one more row, preserving prior rows unchanged.
    /// Creates the log with its header on first write.
    pub fn append(&self, verdict: &Verdict) -> Result<(), InfrastructureError> {
        let mut content = match fs::read_to_string(&self.path) {
            Ok(existing) => {
                self.reconcile_header(&existing)?;
                existing
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("{}\n", COLUMNS.join(","))
            }
            Err(e) => return Err(InfrastructureError::Io(e)),
        };

        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&write_line(&record_fields(verdict)));
        content.push('\n');

        atomic_write(&self.path, content)
    }

    /// Every record ever written, in append order.
    pub fn read_all(&self) -> Result<Vec<Verdict>, InfrastructureError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(InfrastructureError::Io(e)),
        };

        self.reconcile_header(&content)?;

        content
            .lines()
            .skip(1)
            .filter(|line| !line.is_empty())
            .map(parse_record)
            .collect()
    }

    /// An existing log must carry the fixed schema. Anything else means the
    /// file was edited out-of-band and appending would silently lose data.
    fn reconcile_header(&self, content: &str) -> Result<(), InfrastructureError> {
        let header = content.lines().next().unwrap_or_default();
        if split_line(header) != COLUMNS {
            return Err(InfrastructureError::HistoryError(format!(
                "unexpected header in {:?}: '{}'",
                self.path, header
            )));
        }
        Ok(())
    }
}

fn record_fields(verdict: &Verdict) -> Vec<String> {
    vec![
        verdict.run_ts.clone(),
        verdict.status.to_string(),
        verdict.rows.to_string(),
        verdict.failed_rows.to_string(),
        format!("{:.6}", verdict.failed_ratio),
        verdict.threshold_ratio.to_string(),
        verdict.fail_detail_path.clone(),
        verdict.uniqueness_enabled.to_string(),
    ]
}

fn parse_record(line: &str) -> Result<Verdict, InfrastructureError> {
    let fields = split_line(line);
    if fields.len() != COLUMNS.len() {
        return Err(InfrastructureError::HistoryError(format!(
            "expected {} fields, found {}: '{}'",
            COLUMNS.len(),
            fields.len(),
            line
        )));
    }

    let bad = |what: &str| InfrastructureError::HistoryError(format!("{what} in '{line}'"));

    Ok(Verdict {
        run_ts: fields[0].clone(),
        status: match fields[1].as_str() {
            "PASS" => VerdictStatus::Pass,
            "FAIL" => VerdictStatus::Fail,
            _ => return Err(bad("unknown status")),
        },
        rows: fields[2].parse().map_err(|_| bad("bad rows"))?,
        failed_rows: fields[3].parse().map_err(|_| bad("bad failed_rows"))?,
        failed_ratio: fields[4].parse().map_err(|_| bad("bad failed_ratio"))?,
        threshold_ratio: fields[5].parse().map_err(|_| bad("bad threshold_ratio"))?,
        fail_detail_path: fields[6].clone(),
        uniqueness_enabled: fields[7].parse().map_err(|_| bad("bad uniqueness flag"))?,
    })
}
