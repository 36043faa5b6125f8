//! Drift audit between shadow tables and live tables.

use std::fmt;

use provenance_core::naming::PROVENANCE_SCHEMA;
use provenance_core::{ColumnDrift, QualifiedName};
use tracing::debug;

use crate::catalog::{Catalog, shadow_tables};
use crate::error::Result;
use crate::report::ScanReport;

/// Drift found for one live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDrift {
    /// The live table.
    pub source: QualifiedName,
    /// Column differences.
    pub drift: ColumnDrift,
}

impl fmt::Display for TableDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.source.schema, self.source.table, self.drift)
    }
}

/// Compares every shadow table with its live table.
pub struct ProvenanceAudit<C> {
    catalog: C,
}

impl<C: Catalog> ProvenanceAudit<C> {
    /// Creates an auditor reading from `catalog`.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Audits every shadow table. Failing tables are recorded in the
    /// report, each table runs under its own savepoint; only a failure to
    /// list the shadow tables or to manage a savepoint aborts.
    pub async fn audit(&mut self) -> Result<ScanReport<Option<TableDrift>>> {
        let tables = shadow_tables(&mut self.catalog).await?;
        debug!(tables = %tables.join(","), "Shadow tables");

        let mut report = ScanReport::new();
        for table in tables {
            self.catalog.savepoint().await?;
            let result = self.compare(&table).await;
            self.catalog.rollback_to_savepoint().await?;
            report.record(table, result);
        }
        Ok(report)
    }

    /// Compares one shadow table (name without schema) with its live table.
    pub async fn compare(&mut self, provenance_table: &str) -> Result<Option<TableDrift>> {
        let source = QualifiedName::from_provenance_table(provenance_table)?;
        let shadow = QualifiedName::new(PROVENANCE_SCHEMA, provenance_table);

        let shadow_columns = self.catalog.columns(&shadow).await?;
        let live_columns = self.catalog.columns(&source).await?;

        Ok(ColumnDrift::between(shadow_columns, live_columns)
            .map(|drift| TableDrift { source, drift }))
    }
}
