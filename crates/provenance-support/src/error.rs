//! Error types for the provenance tools.

use std::path::PathBuf;

use provenance_core::{ColumnParseError, NameError};

/// Errors that can occur while generating or checking provenance tables.
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// Database error during a catalog or data query.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (writing generated DDL).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration document is not valid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A column line of a table definition could not be normalized.
    #[error(transparent)]
    Column(#[from] ColumnParseError),

    /// A table name could not be interpreted.
    #[error(transparent)]
    Name(#[from] NameError),

    /// `pg_get_tabledef` returned nothing for the table.
    #[error("No table definition for {schema}.{table}")]
    MissingDefinition {
        /// Schema name.
        schema: String,
        /// Table name.
        table: String,
    },

    /// The live table has no primary key to order audit rows by.
    #[error("No primary key information for {schema}.{table}")]
    NoPrimaryKey {
        /// Schema name.
        schema: String,
        /// Table name.
        table: String,
    },

    /// An audit row is missing a provenance column or has the wrong shape.
    #[error("Malformed audit row in {table}: {message}")]
    MalformedRow {
        /// Provenance table name.
        table: String,
        /// What is wrong with the row.
        message: String,
    },
}

/// Result type for provenance operations.
pub type Result<T> = std::result::Result<T, ProvenanceError>;
