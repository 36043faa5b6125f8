//! Command-line support for a PostgreSQL provenance schema.
//!
//! `provenance-support` connects the database-agnostic logic of
//! [`provenance_core`] to a live database:
//!
//! - **Catalog** - typed metadata queries behind the [`catalog::Catalog`] trait
//! - **Session** - one connection, one read-only transaction, always rolled back
//! - **Generate** - shadow table DDL for a table or a whole schema
//! - **Audit** - column drift between shadow tables and live tables
//! - **Dedup** - repeated INSERT audit rows (detection only)
//!
//! # CLI Usage
//!
//! ```bash
//! # DDL for one table (schema defaults to public)
//! ptsupport create-table shop.orders -o orders.sql
//!
//! # DDL for a whole schema, skipping *_history tables
//! ptsupport model-schema shop --exclude _history
//!
//! # Report drift between provenance and live tables
//! ptsupport --yaml prod.yaml audit
//!
//! # Log candidate duplicate audit rows
//! ptsupport --database staging dedup
//! ```

pub mod audit;
pub mod catalog;
pub mod config;
pub mod dedup;
pub mod error;
pub mod generate;
pub mod logging;
pub mod report;
pub mod session;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::audit::{ProvenanceAudit, TableDrift};
    pub use crate::catalog::{Catalog, PgCatalog};
    pub use crate::config::{Config, DatabaseConfig, DEFAULT_CONFIG_PATH};
    pub use crate::dedup::ProvenanceDedup;
    pub use crate::error::{ProvenanceError, Result};
    pub use crate::generate::{DEFAULT_EXCLUDE_SUFFIX, SchemaMaker, TableMaker};
    pub use crate::logging::LogLevel;
    pub use crate::report::{ScanReport, TableOutcome};
    pub use crate::session::{ReadOnlyTransaction, Session};
}
