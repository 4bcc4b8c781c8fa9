// gradus-core/src/ports/connector.rs

// This file defines what the application needs from a tabular engine,
// without knowing how it is done. The DQ Gate only requires that required
// columns either exist with a scalar type or are reported as absent.

use crate::domain::snapshot::Row;
use crate::error::GradusError;
use async_trait::async_trait;

// Struct simple pour décrire une colonne (indépendant de la DB)
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    /// Run a statement for its side effects (DDL, COPY ...).
    async fn execute(&self, query: &str) -> Result<(), GradusError>;

    /// Named, typed schema of a registered table or view.
    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, GradusError>;

    /// Full materialized read of a table, row by row.
    async fn fetch_rows(&self, table_name: &str) -> Result<Vec<Row>, GradusError>;

    /// Single scalar result (COUNT(*) and friends).
    async fn query_scalar(&self, query: &str) -> Result<u64, GradusError>;

    /// Expose a CSV file as a named view.
    async fn register_csv(&self, name: &str, path: &str) -> Result<(), GradusError>;

    /// Expose a set of Parquet files as a named view.
    async fn register_parquet(&self, name: &str, paths: &[String]) -> Result<(), GradusError>;
}
