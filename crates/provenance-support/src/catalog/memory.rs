//! In-memory [`Catalog`] for tests.

use std::collections::HashMap;

use provenance_core::{ColumnInfo, ProvenanceRow, QualifiedName};
use serde_json::Value;

use super::{Catalog, row_from_json};
use crate::error::{ProvenanceError, Result};

/// Catalog backed by plain maps. Audit rows are returned in insertion
/// order, so tests supply them already ordered.
///
/// A simulated database error leaves the catalog aborted, like a
/// PostgreSQL transaction: every later call fails until the work is rolled
/// back to a savepoint.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: Vec<QualifiedName>,
    columns: HashMap<QualifiedName, Vec<ColumnInfo>>,
    keys: HashMap<QualifiedName, Vec<String>>,
    definitions: HashMap<QualifiedName, String>,
    rows: HashMap<String, Vec<Value>>,
    failing: Vec<String>,
    failing_scans: Vec<String>,
    aborted: bool,
    savepoints: usize,
    /// Tables whose definition was requested, in request order.
    pub definition_requests: Vec<QualifiedName>,
    /// Audit scans performed: table and ordering columns.
    pub scans: Vec<(String, Vec<String>)>,
    /// Number of rollbacks to a savepoint.
    pub rollbacks: usize,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, schema: &str, table: &str) -> Self {
        self.tables.push(QualifiedName::new(schema, table));
        self
    }

    pub fn with_columns(mut self, schema: &str, table: &str, columns: Vec<ColumnInfo>) -> Self {
        self.columns.insert(QualifiedName::new(schema, table), columns);
        self
    }

    pub fn with_key(mut self, schema: &str, table: &str, key: &[&str]) -> Self {
        self.keys.insert(
            QualifiedName::new(schema, table),
            key.iter().map(|c| (*c).to_string()).collect(),
        );
        self
    }

    pub fn with_definition(mut self, schema: &str, table: &str, definition: &str) -> Self {
        self.definitions
            .insert(QualifiedName::new(schema, table), definition.to_string());
        self
    }

    pub fn with_rows(mut self, provenance_table: &str, rows: Vec<Value>) -> Self {
        self.rows.insert(provenance_table.to_string(), rows);
        self
    }

    /// Makes every column query for `schema.table` fail like a dropped
    /// connection would.
    pub fn with_failing_columns(mut self, schema: &str, table: &str) -> Self {
        self.failing.push(format!("{schema}.{table}"));
        self
    }

    /// Makes the audit scan of `provenance_table` fail like an `ORDER BY`
    /// on a column the shadow table lacks.
    pub fn with_failing_scan(mut self, provenance_table: &str) -> Self {
        self.failing_scans.push(provenance_table.to_string());
        self
    }

    fn check_open(&self) -> Result<()> {
        if self.aborted {
            return Err(ProvenanceError::Database(sqlx::Error::Protocol(
                "current transaction is aborted, commands ignored until end of transaction block"
                    .to_string(),
            )));
        }
        Ok(())
    }

    fn abort(&mut self, error: sqlx::Error) -> ProvenanceError {
        self.aborted = true;
        ProvenanceError::Database(error)
    }
}

impl Catalog for MemoryCatalog {
    async fn base_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        self.check_open()?;
        Ok(self
            .tables
            .iter()
            .filter(|t| t.schema == schema)
            .map(|t| t.table.clone())
            .collect())
    }

    async fn columns(&mut self, table: &QualifiedName) -> Result<Vec<ColumnInfo>> {
        self.check_open()?;
        if self.failing.contains(&table.to_string()) {
            return Err(self.abort(sqlx::Error::PoolClosed));
        }
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }

    async fn primary_key(&mut self, table: &QualifiedName) -> Result<Vec<String>> {
        self.check_open()?;
        Ok(self.keys.get(table).cloned().unwrap_or_default())
    }

    async fn table_definition(&mut self, table: &QualifiedName) -> Result<String> {
        self.check_open()?;
        self.definition_requests.push(table.clone());
        self.definitions
            .get(table)
            .cloned()
            .ok_or_else(|| ProvenanceError::MissingDefinition {
                schema: table.schema.clone(),
                table: table.table.clone(),
            })
    }

    async fn scan_provenance(
        &mut self,
        provenance_table: &str,
        order_by: &[String],
        visit: &mut dyn FnMut(ProvenanceRow<Value>),
    ) -> Result<()> {
        self.check_open()?;
        self.scans
            .push((provenance_table.to_string(), order_by.to_vec()));
        if self.failing_scans.iter().any(|t| t == provenance_table) {
            return Err(self.abort(sqlx::Error::Protocol(format!(
                "column \"{}\" does not exist",
                order_by.first().map_or("", String::as_str)
            ))));
        }
        for value in self.rows.get(provenance_table).cloned().unwrap_or_default() {
            visit(row_from_json(provenance_table, value)?);
        }
        Ok(())
    }

    async fn savepoint(&mut self) -> Result<()> {
        self.check_open()?;
        self.savepoints += 1;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<()> {
        if self.savepoints == 0 {
            return Err(ProvenanceError::Database(sqlx::Error::Protocol(
                "savepoint does not exist".to_string(),
            )));
        }
        self.savepoints -= 1;
        self.aborted = false;
        self.rollbacks += 1;
        Ok(())
    }
}
