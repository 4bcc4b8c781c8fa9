// gradus-core/src/domain/quality/key.rs

use sha2::{Digest, Sha256};

use crate::domain::snapshot::Row;

/// Deterministic composite key for the uniqueness check.
///
/// The values of `id_columns` are rendered, joined with `|` and hashed.
/// A column missing from the row contributes an empty segment, so two rows
/// missing the same column still collide. The digest only has to be stable
/// across runs (reproducible audit trails), not cryptographically meaningful.
pub fn composite_key(row: &Row, id_columns: &[String]) -> String {
    let mut joined = String::new();
    for (i, column) in id_columns.iter().enumerate() {
        if i > 0 {
            joined.push('|');
        }
        if let Some(value) = row.get(column) {
            joined.push_str(&value.render());
        }
    }

    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(digest)
}
