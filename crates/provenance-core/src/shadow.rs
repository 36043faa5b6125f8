//! Shadow table derivation and DDL rendering.
//!
//! A [`ShadowTable`] is built from the text returned by `pg_get_tabledef`:
//!
//! ```text
//! CREATE TABLE public.users (
//!   id integer NOT NULL,
//!   name text NULL,
//!   CONSTRAINT users_pkey PRIMARY KEY (id)
//! ) TABLESPACE pg_default;
//!
//! ALTER TABLE public.users OWNER TO app;
//! ```
//!
//! The first line and the last two non-blank lines are framing. Column
//! lines run until the first constraint line.

use crate::column::{ColumnParseError, parse_column};
use crate::naming::QualifiedName;

/// Identity column prepended to every shadow table.
pub const TRACK_ID_CLAUSE: &str =
    "provenance_track_id integer not null generated always as identity primary key";

/// Audit columns appended to every shadow table.
pub const PROVENANCE_CLAUSES: [&str; 3] = [
    "provenance_timestamp timestamp with time zone not null default now()",
    "provenance_user text not null",
    "provenance_event integer not null",
];

/// Procedure called by the row-level trigger.
pub const RECORD_PROCEDURE: &str = "public.record_provenance()";

/// Procedure called by the truncate trigger.
pub const TRUNCATE_PROCEDURE: &str = "public.dont_truncate_provenance()";

const CONSTRAINT_LINE_PREFIX: &str = "  CONSTRAINT";

const COLUMN_INDENT: &str = "   ";

/// A shadow table ready to be rendered as DDL.
///
/// Always framed by the identity column and the audit columns; the fields
/// are private so that framing cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTable {
    source: QualifiedName,
    columns: Vec<String>,
}

impl ShadowTable {
    /// Builds a shadow table from already-normalized column clauses.
    #[must_use]
    pub fn new(source: QualifiedName, clauses: impl IntoIterator<Item = String>) -> Self {
        let mut columns = vec![TRACK_ID_CLAUSE.to_string()];
        columns.extend(clauses);
        columns.extend(PROVENANCE_CLAUSES.iter().map(|c| (*c).to_string()));
        Self { source, columns }
    }

    /// Builds a shadow table from a `pg_get_tabledef` dump.
    ///
    /// # Errors
    ///
    /// Fails on the first column line the normalizer cannot handle.
    pub fn from_definition(
        source: QualifiedName,
        definition: &str,
    ) -> Result<Self, ColumnParseError> {
        let mut clauses = Vec::new();
        for line in column_lines(definition) {
            if let Some(clause) = parse_column(line)? {
                clauses.push(clause);
            }
        }
        Ok(Self::new(source, clauses))
    }

    /// The live table being shadowed.
    #[must_use]
    pub const fn source(&self) -> &QualifiedName {
        &self.source
    }

    /// Column clauses in output order, identity key and audit columns
    /// included.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column clauses copied from the live table.
    #[must_use]
    pub fn source_columns(&self) -> &[String] {
        let end = self.columns.len() - PROVENANCE_CLAUSES.len();
        &self.columns[1..end]
    }

    /// Renders the `CREATE TABLE` statement.
    #[must_use]
    pub fn create_table_sql(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(|c| format!("{COLUMN_INDENT}{c}"))
            .collect::<Vec<_>>()
            .join(",\n");
        format!(
            "CREATE TABLE {} (\n{body}\n);\n",
            self.source.provenance_qualified()
        )
    }

    /// Renders the row-level trigger pair.
    #[must_use]
    pub fn row_trigger_sql(&self) -> String {
        let trigger = self.source.row_trigger();
        let table = &self.source;
        format!(
            "DROP TRIGGER IF EXISTS {trigger} on {table};\n\
             CREATE TRIGGER {trigger}\n\
             BEFORE\n\
             INSERT or UPDATE or DELETE\n\
             ON {table} FOR EACH ROW EXECUTE PROCEDURE {RECORD_PROCEDURE};\n"
        )
    }

    /// Renders the truncate-prevention trigger pair.
    #[must_use]
    pub fn truncate_trigger_sql(&self) -> String {
        let trigger = self.source.truncate_trigger();
        let table = &self.source;
        format!(
            "DROP TRIGGER IF EXISTS {trigger} on {table};\n\
             CREATE TRIGGER {trigger}\n\
             BEFORE\n\
             TRUNCATE\n\
             ON {table} EXECUTE PROCEDURE {TRUNCATE_PROCEDURE};\n"
        )
    }

    /// Renders the full DDL block: table, then both trigger pairs.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "{}{}\n{}\n",
            self.create_table_sql(),
            self.row_trigger_sql(),
            self.truncate_trigger_sql()
        )
    }
}

/// Extracts the column lines of a `pg_get_tabledef` dump.
#[must_use]
pub fn column_lines(definition: &str) -> Vec<&str> {
    let lines: Vec<&str> = definition
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < 3 {
        return Vec::new();
    }
    lines[1..lines.len() - 2]
        .iter()
        .copied()
        .take_while(|line| !line.starts_with(CONSTRAINT_LINE_PREFIX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS_DEF: &str = "CREATE TABLE public.users (\n\
        \x20 id integer NOT NULL GENERATED ALWAYS AS IDENTITY,\n\
        \x20 email text NOT NULL,\n\
        \n\
        \x20 nickname text NULL,\n\
        \x20 CONSTRAINT users_pkey PRIMARY KEY (id),\n\
        \x20 CONSTRAINT users_email_key UNIQUE (email)\n\
        ) TABLESPACE pg_default;\n\
        \n\
        ALTER TABLE public.users OWNER TO app;\n";

    #[test]
    fn test_column_lines_stop_at_constraints() {
        let lines = column_lines(USERS_DEF);
        assert_eq!(
            lines,
            vec![
                "  id integer NOT NULL GENERATED ALWAYS AS IDENTITY,",
                "  email text NOT NULL,",
                "  nickname text NULL,",
            ]
        );
    }

    #[test]
    fn test_column_lines_short_dump() {
        assert!(column_lines("CREATE TABLE x (\n);\n").is_empty());
    }

    #[test]
    fn test_from_definition_orders_columns() {
        let table =
            ShadowTable::from_definition(QualifiedName::new("public", "users"), USERS_DEF)
                .unwrap();
        assert_eq!(table.columns.len(), 7);
        assert_eq!(table.columns[0], TRACK_ID_CLAUSE);
        assert_eq!(
            table.source_columns(),
            &[
                "id integer NOT NULL".to_string(),
                "email text NOT NULL".to_string(),
                "nickname text NULL".to_string(),
            ]
        );
        assert_eq!(&table.columns[4..], &PROVENANCE_CLAUSES.map(String::from));
    }

    #[test]
    fn test_table_without_copied_columns() {
        let table = ShadowTable::new(QualifiedName::new("public", "empty"), Vec::new());
        assert!(table.source_columns().is_empty());
        assert_eq!(table.columns().len(), 1 + PROVENANCE_CLAUSES.len());
        assert_eq!(table.source(), &QualifiedName::new("public", "empty"));
    }

    #[test]
    fn test_from_definition_propagates_parse_error() {
        let def = "CREATE TABLE public.t (\n  name text,\n) ;\n\nALTER TABLE x;\n";
        let err = ShadowTable::from_definition(QualifiedName::new("public", "t"), def);
        assert!(matches!(err, Err(ColumnParseError::Unparsed { .. })));
    }

    #[test]
    fn test_create_table_sql() {
        let table = ShadowTable::new(
            QualifiedName::new("public", "tags"),
            vec!["label text NOT NULL".to_string()],
        );
        let sql = table.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE provenance.public_tags (\n"));
        assert!(sql.contains("   label text NOT NULL,\n"));
        assert!(sql.ends_with("   provenance_event integer not null\n);\n"));
    }

    #[test]
    fn test_trigger_sql() {
        let table = ShadowTable::new(QualifiedName::new("shop", "orders"), Vec::new());
        let row = table.row_trigger_sql();
        assert!(row.starts_with("DROP TRIGGER IF EXISTS provenance_trigger_shop_orders on shop.orders;\n"));
        assert!(row.contains("INSERT or UPDATE or DELETE"));
        assert!(row.contains("EXECUTE PROCEDURE public.record_provenance();"));

        let truncate = table.truncate_trigger_sql();
        assert!(truncate.contains("CREATE TRIGGER provenance_truncate_trigger_shop_orders\n"));
        assert!(truncate.contains("TRUNCATE\nON shop.orders EXECUTE PROCEDURE"));
    }

    #[test]
    fn test_to_sql_order() {
        let table = ShadowTable::new(QualifiedName::new("shop", "orders"), Vec::new());
        let sql = table.to_sql();
        let create = sql.find("CREATE TABLE").unwrap();
        let row = sql.find("provenance_trigger_shop_orders").unwrap();
        let truncate = sql.find("provenance_truncate_trigger_shop_orders").unwrap();
        assert!(create < row && row < truncate);
    }
}
