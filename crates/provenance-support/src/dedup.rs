//! Duplicate audit row detection.
//!
//! Detection only: candidates are logged and reported, never deleted.

use provenance_core::{CandidateDuplicate, DuplicateScanner, QualifiedName};
use tracing::{debug, info};

use crate::catalog::{Catalog, shadow_tables};
use crate::error::{ProvenanceError, Result};
use crate::report::ScanReport;

/// Looks for repeated INSERT audit rows in every shadow table.
pub struct ProvenanceDedup<C> {
    catalog: C,
}

impl<C: Catalog> ProvenanceDedup<C> {
    /// Creates a deduplicator reading from `catalog`.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Scans every shadow table. Failing tables are recorded in the report,
    /// each table runs under its own savepoint; only a failure to list the
    /// shadow tables or to manage a savepoint aborts.
    pub async fn remove_dups(&mut self) -> Result<ScanReport<Vec<CandidateDuplicate>>> {
        let tables = shadow_tables(&mut self.catalog).await?;
        debug!(tables = %tables.join(","), "Shadow tables");

        let mut report = ScanReport::new();
        for table in tables {
            self.catalog.savepoint().await?;
            let result = self.scan_table(&table).await;
            self.catalog.rollback_to_savepoint().await?;
            report.record(table, result);
        }
        Ok(report)
    }

    /// Scans one shadow table (name without schema).
    pub async fn scan_table(&mut self, provenance_table: &str) -> Result<Vec<CandidateDuplicate>> {
        let source = QualifiedName::from_provenance_table(provenance_table)?;
        let keys = self.catalog.primary_key(&source).await?;
        if keys.is_empty() {
            return Err(ProvenanceError::NoPrimaryKey {
                schema: source.schema,
                table: source.table,
            });
        }
        info!(table = %provenance_table, keys = %keys.join(","), "Scanning for duplicates");

        let mut scanner = DuplicateScanner::new();
        let mut found = Vec::new();
        self.catalog
            .scan_provenance(provenance_table, &keys, &mut |row| {
                let Some(duplicate) = scanner.push(row) else {
                    return;
                };
                if let Some(prior) = scanner.prior() {
                    for (column, value) in prior {
                        debug!(table = %provenance_table, column = %column, value = %value, "Repeated value");
                    }
                }
                info!("duplicate {} {}", provenance_table, duplicate.track_id);
                found.push(duplicate);
            })
            .await?;
        Ok(found)
    }
}
