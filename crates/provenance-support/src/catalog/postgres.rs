//! PostgreSQL catalog queries.

use futures::TryStreamExt;
use provenance_core::naming::{PROVENANCE_SCHEMA, TIMESTAMP_COLUMN, quote_identifier};
use provenance_core::{ColumnInfo, ProvenanceRow, QualifiedName};
use serde_json::Value;
use sqlx::PgConnection;
use tracing::debug;

use super::{Catalog, ColumnRow, KeyColumnRow, TableDefinitionRow, TableRow, row_from_json};
use crate::error::{ProvenanceError, Result};

const BASE_TABLES_SQL: &str = r#"
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_type = 'BASE TABLE' AND table_schema = $1
ORDER BY table_name
"#;

const COLUMNS_SQL: &str = r#"
SELECT column_name::text AS column_name,
       data_type::text AS data_type,
       udt_name::text AS udt_name
FROM information_schema.columns
WHERE table_schema = $1 AND table_name = $2
ORDER BY ordinal_position
"#;

const PRIMARY_KEY_SQL: &str = r#"
SELECT kcu.column_name::text AS column_name
FROM information_schema.table_constraints AS tc
JOIN information_schema.key_column_usage AS kcu
  ON tc.constraint_name = kcu.constraint_name
 AND tc.table_schema = kcu.table_schema
 AND tc.table_name = kcu.table_name
WHERE tc.table_schema = $1
  AND tc.table_name = $2
  AND tc.constraint_type = 'PRIMARY KEY'
ORDER BY kcu.ordinal_position
"#;

const TABLE_DEFINITION_SQL: &str = "SELECT pg_get_tabledef($1, $2, false) AS definition";

const SAVEPOINT_SQL: &str = "SAVEPOINT provenance_table_scan";

const ROLLBACK_TO_SAVEPOINT_SQL: &str = "ROLLBACK TO SAVEPOINT provenance_table_scan";

const RELEASE_SAVEPOINT_SQL: &str = "RELEASE SAVEPOINT provenance_table_scan";

/// Builds the ordered audit row query for a shadow table.
pub(crate) fn provenance_rows_sql(provenance_table: &str, order_by: &[String]) -> String {
    let mut order: Vec<String> = order_by.iter().map(|c| quote_identifier(c)).collect();
    order.push(quote_identifier(TIMESTAMP_COLUMN));
    format!(
        "SELECT to_jsonb(p) AS audit_row FROM {}.{} AS p ORDER BY {}",
        quote_identifier(PROVENANCE_SCHEMA),
        quote_identifier(provenance_table),
        order.join(", ")
    )
}

/// [`Catalog`] over a live PostgreSQL connection.
///
/// Usually borrowed from a read-only transaction, see
/// [`crate::session::ReadOnlyTransaction::catalog`].
pub struct PgCatalog<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCatalog<'c> {
    /// Wraps a connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl Catalog for PgCatalog<'_> {
    async fn base_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        let rows: Vec<TableRow> = sqlx::query_as(BASE_TABLES_SQL)
            .bind(schema)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.table_name).collect())
    }

    async fn columns(&mut self, table: &QualifiedName) -> Result<Vec<ColumnInfo>> {
        let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(ColumnInfo::from).collect())
    }

    async fn primary_key(&mut self, table: &QualifiedName) -> Result<Vec<String>> {
        let rows: Vec<KeyColumnRow> = sqlx::query_as(PRIMARY_KEY_SQL)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.column_name).collect())
    }

    async fn table_definition(&mut self, table: &QualifiedName) -> Result<String> {
        let row: TableDefinitionRow = sqlx::query_as(TABLE_DEFINITION_SQL)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_one(&mut *self.conn)
            .await?;
        row.definition
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
        let sql = provenance_rows_sql(provenance_table, order_by);
        debug!(sql = %sql, "Scanning audit rows");

        let mut rows = sqlx::query_scalar::<_, Value>(&sql).fetch(&mut *self.conn);
        while let Some(value) = rows.try_next().await? {
            visit(row_from_json(provenance_table, value)?);
        }
        Ok(())
    }

    async fn savepoint(&mut self) -> Result<()> {
        sqlx::query(SAVEPOINT_SQL).execute(&mut *self.conn).await?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<()> {
        sqlx::query(ROLLBACK_TO_SAVEPOINT_SQL)
            .execute(&mut *self.conn)
            .await?;
        sqlx::query(RELEASE_SAVEPOINT_SQL)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_rows_sql() {
        let sql = provenance_rows_sql("shop_orders", &["order_id".to_string(), "line".to_string()]);
        assert_eq!(
            sql,
            "SELECT to_jsonb(p) AS audit_row FROM \"provenance\".\"shop_orders\" AS p \
             ORDER BY \"order_id\", \"line\", \"provenance_timestamp\""
        );
    }

    #[test]
    fn test_queries_are_parameterized() {
        for sql in [BASE_TABLES_SQL, COLUMNS_SQL, PRIMARY_KEY_SQL, TABLE_DEFINITION_SQL] {
            assert!(sql.contains("$1"));
        }
        assert!(PRIMARY_KEY_SQL.contains("'PRIMARY KEY'"));
    }

    #[test]
    fn test_savepoint_statements_share_a_name() {
        let name = SAVEPOINT_SQL.trim_start_matches("SAVEPOINT ");
        assert!(ROLLBACK_TO_SAVEPOINT_SQL.ends_with(name));
        assert!(RELEASE_SAVEPOINT_SQL.ends_with(name));
    }
}
