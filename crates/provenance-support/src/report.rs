//! Per-table scan results.
//!
//! The audit and dedup scans visit every shadow table. A failure on one
//! table is recorded (and logged) in the report and the scan moves on.

use tracing::error;

use crate::error::{ProvenanceError, Result};

/// Result of scanning one shadow table.
#[derive(Debug)]
pub struct TableOutcome<T> {
    /// Shadow table name, without schema.
    pub table: String,
    /// What the scan found, or why it failed.
    pub result: Result<T>,
}

/// Collected outcomes of a scan, in scan order.
#[derive(Debug)]
pub struct ScanReport<T> {
    outcomes: Vec<TableOutcome<T>>,
}

impl<T> Default for ScanReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }
}

impl<T> ScanReport<T> {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for a table. Failures are logged here.
    pub fn record(&mut self, table: impl Into<String>, result: Result<T>) {
        let table = table.into();
        if let Err(err) = &result {
            error!(table = %table, error = %err, "Table scan failed");
        }
        self.outcomes.push(TableOutcome { table, result });
    }

    /// All outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[TableOutcome<T>] {
        &self.outcomes
    }

    /// Successful outcomes.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &T)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|v| (o.table.as_str(), v)))
    }

    /// Failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProvenanceError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.table.as_str(), e)))
    }

    /// Number of tables visited.
    #[must_use]
    pub fn scanned(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of tables whose scan failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order_and_failures() {
        let mut report: ScanReport<u32> = ScanReport::new();
        report.record("public_a", Ok(1));
        report.record(
            "public_b",
            Err(ProvenanceError::NoPrimaryKey {
                schema: "public".to_string(),
                table: "b".to_string(),
            }),
        );
        report.record("public_c", Ok(3));

        assert_eq!(report.scanned(), 3);
        assert_eq!(report.failed(), 1);
        let ok: Vec<_> = report.successes().collect();
        assert_eq!(ok, vec![("public_a", &1), ("public_c", &3)]);
        let failed: Vec<&str> = report.failures().map(|(t, _)| t).collect();
        assert_eq!(failed, vec!["public_b"]);
    }
}
