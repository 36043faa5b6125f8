//! Catalog access.
//!
//! Every database read the tools perform goes through [`Catalog`]: table
//! listings, column descriptions, primary keys, table definitions and the
//! audit rows themselves. [`PgCatalog`] runs the queries against a live
//! connection.

mod postgres;

#[cfg(test)]
pub(crate) mod memory;

pub use postgres::PgCatalog;

use provenance_core::naming::{EVENT_COLUMN, PROVENANCE_SCHEMA, TRACK_ID_COLUMN, is_provenance_name};
use provenance_core::{ColumnInfo, ProvenanceRow, QualifiedName};
use serde_json::Value;

use crate::error::{ProvenanceError, Result};

/// A row of `information_schema.tables`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TableRow {
    /// Table name.
    pub table_name: String,
}

/// A row of `information_schema.columns`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnRow {
    /// Column name.
    pub column_name: String,
    /// SQL data type.
    pub data_type: String,
    /// Underlying type name.
    pub udt_name: String,
}

impl From<ColumnRow> for ColumnInfo {
    fn from(row: ColumnRow) -> Self {
        Self::new(row.column_name, row.data_type, row.udt_name)
    }
}

/// A primary key column from `information_schema.key_column_usage`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeyColumnRow {
    /// Column name.
    pub column_name: String,
}

/// Result of `pg_get_tabledef`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TableDefinitionRow {
    /// The dump, `NULL` when the function found nothing.
    pub definition: Option<String>,
}

/// Read-only view of the database the tools inspect.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Lists the base tables of a schema.
    async fn base_tables(&mut self, schema: &str) -> Result<Vec<String>>;

    /// Describes the columns of a table, in ordinal order.
    async fn columns(&mut self, table: &QualifiedName) -> Result<Vec<ColumnInfo>>;

    /// Lists the primary key columns of a table, in key order. Empty when
    /// the table has no primary key.
    async fn primary_key(&mut self, table: &QualifiedName) -> Result<Vec<String>>;

    /// Returns the `pg_get_tabledef` dump of a table.
    async fn table_definition(&mut self, table: &QualifiedName) -> Result<String>;

    /// Feeds every row of `provenance.<provenance_table>` to `visit`,
    /// ordered by `order_by` then by provenance timestamp.
    async fn scan_provenance(
        &mut self,
        provenance_table: &str,
        order_by: &[String],
        visit: &mut dyn FnMut(ProvenanceRow<Value>),
    ) -> Result<()>;

    /// Opens a savepoint before one table's work.
    async fn savepoint(&mut self) -> Result<()>;

    /// Undoes everything since [`Catalog::savepoint`] and releases it. A
    /// failed statement aborts the whole transaction; this makes it usable
    /// again.
    async fn rollback_to_savepoint(&mut self) -> Result<()>;
}


/// Lists the shadow tables of the provenance schema, skipping the
/// provenance machinery's own `provenance_*` tables.
pub async fn shadow_tables<C: Catalog>(catalog: &mut C) -> Result<Vec<String>> {
    let tables = catalog.base_tables(PROVENANCE_SCHEMA).await?;
    Ok(tables
        .into_iter()
        .filter(|name| !is_provenance_name(name))
        .collect())
}

/// Converts a `to_jsonb(row)` object into an audit row.
pub fn row_from_json(table: &str, value: Value) -> Result<ProvenanceRow<Value>> {
    let malformed = |message: &str| ProvenanceError::MalformedRow {
        table: table.to_string(),
        message: message.to_string(),
    };

    let Value::Object(columns) = value else {
        return Err(malformed("row is not a JSON object"));
    };
    let track_id = columns
        .get(TRACK_ID_COLUMN)
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed("missing provenance_track_id"))?;
    let event = columns
        .get(EVENT_COLUMN)
        .and_then(Value::as_i64)
        .and_then(|code| i32::try_from(code).ok())
        .ok_or_else(|| malformed("missing provenance_event"))?;

    Ok(ProvenanceRow::from_columns(track_id, event, columns))
}
