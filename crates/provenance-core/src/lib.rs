//! # provenance-core
//!
//! Database-agnostic building blocks for maintaining a `provenance` shadow
//! schema next to a live PostgreSQL schema.
//!
//! Every live table `schema.table` gets a shadow table
//! `provenance.schema_table` with the same columns plus an identity key and
//! three audit columns, filled by a row-level trigger.
//!
//! This crate provides:
//! - [`column`] - normalizes column lines of a `pg_get_tabledef` dump
//! - [`shadow`] - derives a shadow table and renders its DDL and triggers
//! - [`naming`] - live/shadow/trigger naming rules
//! - [`drift`] - column-set comparison between a shadow and its live table
//! - [`dedup`] - detection of repeated consecutive INSERT audit rows
//!
//! ```rust
//! use provenance_core::{QualifiedName, ShadowTable};
//!
//! let table = ShadowTable::new(
//!     QualifiedName::parse("shop.orders").unwrap(),
//!     vec!["id integer NOT NULL".to_string()],
//! );
//! assert!(table.to_sql().starts_with("CREATE TABLE provenance.shop_orders ("));
//! ```

pub mod column;
pub mod dedup;
pub mod drift;
pub mod naming;
pub mod shadow;

pub use column::{ColumnParseError, parse_column};
pub use dedup::{CandidateDuplicate, DuplicateScanner, INSERT_EVENT, ProvenanceRow, find_duplicates};
pub use drift::{ColumnDrift, ColumnInfo};
pub use naming::{NameError, QualifiedName};
pub use shadow::ShadowTable;
