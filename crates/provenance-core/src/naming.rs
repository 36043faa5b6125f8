//! Names of provenance objects.
//!
//! A live table `schema.table` is shadowed by `provenance.schema_table`.
//! The mapping is lossy: `a_b.c` and `a.b_c` both map to `provenance.a_b_c`,
//! and the reverse split always cuts at the first underscore. Schemas with
//! underscores in their name cannot be round-tripped.

use std::fmt;

/// Schema holding every shadow table.
pub const PROVENANCE_SCHEMA: &str = "provenance";

/// Schema assumed when a table name is not qualified.
pub const DEFAULT_SCHEMA: &str = "public";

/// Prefix shared by every audit column (and by internal provenance tables).
pub const PROVENANCE_PREFIX: &str = "provenance_";

/// Identity column of every shadow table.
pub const TRACK_ID_COLUMN: &str = "provenance_track_id";

/// Timestamp audit column.
pub const TIMESTAMP_COLUMN: &str = "provenance_timestamp";

/// User audit column.
pub const USER_COLUMN: &str = "provenance_user";

/// Event code audit column.
pub const EVENT_COLUMN: &str = "provenance_event";

/// Errors building or recovering table names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The argument is not `table` or `schema.table`.
    #[error("Invalid table name '{0}': expected 'table' or 'schema.table'")]
    InvalidQualifiedName(String),

    /// A provenance table name without the schema separator.
    #[error("Provenance table '{0}' is not of the form 'schema_table'")]
    InvalidProvenanceName(String),
}

/// Returns whether a column or table name belongs to the provenance machinery.
#[must_use]
pub fn is_provenance_name(name: &str) -> bool {
    name.starts_with(PROVENANCE_PREFIX)
}

/// A `schema.table` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Schema name.
    pub schema: String,
    /// Table name.
    pub table: String,
}

impl QualifiedName {
    /// Creates a qualified name from its parts.
    #[must_use]
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parses `table` (schema `public`) or `schema.table`.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidQualifiedName`] for empty parts or more
    /// than one dot.
    pub fn parse(name: &str) -> Result<Self, NameError> {
        let invalid = || NameError::InvalidQualifiedName(name.to_string());
        let mut parts = name.split('.');
        let (schema, table) = match (parts.next(), parts.next(), parts.next()) {
            (Some(table), None, None) => (DEFAULT_SCHEMA, table),
            (Some(schema), Some(table), None) => (schema, table),
            _ => return Err(invalid()),
        };
        if schema.is_empty() || table.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(schema, table))
    }

    /// Recovers the live table from a provenance table name, splitting at
    /// the first underscore.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidProvenanceName`] when there is no
    /// underscore or either side is empty.
    pub fn from_provenance_table(name: &str) -> Result<Self, NameError> {
        match name.split_once('_') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                Ok(Self::new(schema, table))
            }
            _ => Err(NameError::InvalidProvenanceName(name.to_string())),
        }
    }

    /// Name of the shadow table inside [`PROVENANCE_SCHEMA`].
    #[must_use]
    pub fn provenance_table(&self) -> String {
        format!("{}_{}", self.schema, self.table)
    }

    /// Fully qualified shadow table name.
    #[must_use]
    pub fn provenance_qualified(&self) -> String {
        format!("{PROVENANCE_SCHEMA}.{}", self.provenance_table())
    }

    /// Row-level trigger name.
    #[must_use]
    pub fn row_trigger(&self) -> String {
        format!("provenance_trigger_{}_{}", self.schema, self.table)
    }

    /// Truncate-prevention trigger name.
    #[must_use]
    pub fn truncate_trigger(&self) -> String {
        format!("provenance_truncate_trigger_{}_{}", self.schema, self.table)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Quotes a PostgreSQL identifier.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
