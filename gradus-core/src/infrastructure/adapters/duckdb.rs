// gradus-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::ValueRef;
use duckdb::{Config, Connection};
use std::sync::{Arc, Mutex};

// Imports Hexagonaux
use crate::domain::snapshot::{Row, Scalar};
use crate::error::GradusError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector};

pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, GradusError> {
        self.conn.lock().map_err(|_| {
            GradusError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_err(e: duckdb::Error) -> GradusError {
    GradusError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

/// Single-quote a path for interpolation into a DuckDB literal.
fn sql_quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', "''"))
}

fn scalar_from_ref(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Boolean(b) => Scalar::Int(i64::from(b)),
        ValueRef::TinyInt(i) => Scalar::Int(i64::from(i)),
        ValueRef::SmallInt(i) => Scalar::Int(i64::from(i)),
        ValueRef::Int(i) => Scalar::Int(i64::from(i)),
        ValueRef::BigInt(i) => Scalar::Int(i),
        ValueRef::UTinyInt(i) => Scalar::Int(i64::from(i)),
        ValueRef::USmallInt(i) => Scalar::Int(i64::from(i)),
        ValueRef::UInt(i) => Scalar::Int(i64::from(i)),
        ValueRef::UBigInt(i) => Scalar::Int(i as i64),
        ValueRef::Float(f) => Scalar::Float(f64::from(f)),
        ValueRef::Double(f) => Scalar::Float(f),
        ValueRef::Text(bytes) => Scalar::Text(String::from_utf8_lossy(bytes).into_owned()),
        // Exotic engine types (decimal, timestamp, blob...) are not part of
        // the student schema; keep them visible rather than crash.
        other => Scalar::Text(format!("{:?}", other)),
    }
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, query: &str) -> Result<(), GradusError> {
        let conn = self.lock()?;
        conn.execute_batch(query).map_err(db_err)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, GradusError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info('{}')", table_name))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnSchema {
                    name: row.get("name")?,
                    data_type: row.get("type")?,
                    is_nullable: !row.get::<_, bool>("notnull")?,
                })
            })
            .map_err(db_err)?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(db_err)?);
        }

        Ok(columns)
    }

    async fn fetch_rows(&self, table_name: &str) -> Result<Vec<Row>, GradusError> {
        // Schema first: the row walk below indexes cells by position.
        let columns = self.fetch_columns(table_name).await?;
        let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM \"{}\"", table_name))
            .map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            let mut mapped = Row::default();
            for (i, name) in names.iter().enumerate() {
                let value = row.get_ref(i).map_err(db_err)?;
                mapped.insert(name.clone(), scalar_from_ref(value));
            }
            out.push(mapped);
        }

        Ok(out)
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, GradusError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query).map_err(db_err)?;

        let mut rows = stmt.query([]).map_err(db_err)?;

        let row = rows
            .next()
            .map_err(db_err)?
            .ok_or_else(|| GradusError::InternalError("No scalar value returned".into()))?;

        let value: u64 = row.get(0).map_err(db_err)?;

        Ok(value)
    }

    async fn register_csv(&self, name: &str, path: &str) -> Result<(), GradusError> {
        let query = format!(
            "CREATE OR REPLACE VIEW \"{}\" AS SELECT * FROM read_csv_auto({})",
            name,
            sql_quote(path)
        );
        self.execute(&query).await
    }

    async fn register_parquet(&self, name: &str, paths: &[String]) -> Result<(), GradusError> {
        let list = paths
            .iter()
            .map(|p| sql_quote(p))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "CREATE OR REPLACE VIEW \"{}\" AS SELECT * FROM read_parquet([{}])",
            name, list
        );
        self.execute(&query).await
    }
}
