//! Detection of duplicate consecutive audit rows.
//!
//! Rows must arrive ordered by the live table's primary key, then by
//! provenance timestamp. The scanner keeps one "prior" row: the last INSERT
//! that was not itself a duplicate. Any non-INSERT event clears it, so an
//! INSERT following an UPDATE or DELETE is never flagged.
//!
//! The primary key columns are part of the compared values, so a change of
//! key always differs from the prior row and cannot carry it across groups.

use std::collections::BTreeMap;

use crate::naming::{EVENT_COLUMN, TRACK_ID_COLUMN, USER_COLUMN};

/// Event code recorded for INSERT.
pub const INSERT_EVENT: i32 = 1;

/// Audit columns left out of the compared values. `provenance_timestamp`
/// stays in, so only INSERTs recorded at the same instant can repeat.
pub const UNCOMPARED_COLUMNS: [&str; 3] = [TRACK_ID_COLUMN, USER_COLUMN, EVENT_COLUMN];

/// One audit row, with audit columns split out.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceRow<V> {
    /// Identity of the audit row.
    pub track_id: i64,
    /// Event code (see [`INSERT_EVENT`]).
    pub event: i32,
    /// Compared columns: live table columns plus the audit timestamp.
    pub values: BTreeMap<String, V>,
}

impl<V> ProvenanceRow<V> {
    /// Builds a row from all of its columns, discarding the
    /// [`UNCOMPARED_COLUMNS`] from the compared values.
    #[must_use]
    pub fn from_columns(
        track_id: i64,
        event: i32,
        columns: impl IntoIterator<Item = (String, V)>,
    ) -> Self {
        Self {
            track_id,
            event,
            values: columns
                .into_iter()
                .filter(|(name, _)| !UNCOMPARED_COLUMNS.contains(&name.as_str()))
                .collect(),
        }
    }

    /// Returns whether this row records an INSERT.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        self.event == INSERT_EVENT
    }
}

/// An INSERT row whose values repeat the prior retained INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateDuplicate {
    /// `provenance_track_id` of the repeated row.
    pub track_id: i64,
}

/// Streaming duplicate detector.
#[derive(Debug, Clone)]
pub struct DuplicateScanner<V> {
    prior: Option<BTreeMap<String, V>>,
}

impl<V> Default for DuplicateScanner<V> {
    fn default() -> Self {
        Self { prior: None }
    }
}

impl<V: PartialEq> DuplicateScanner<V> {
    /// Creates a scanner with no prior row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The prior retained row, if any.
    #[must_use]
    pub const fn prior(&self) -> Option<&BTreeMap<String, V>> {
        self.prior.as_ref()
    }

    /// Feeds the next row in scan order.
    pub fn push(&mut self, row: ProvenanceRow<V>) -> Option<CandidateDuplicate> {
        if !row.is_insert() {
            self.prior = None;
            return None;
        }
        let repeated = self
            .prior
            .as_ref()
            .is_some_and(|prior| same_values(prior, &row.values));
        if repeated {
            return Some(CandidateDuplicate {
                track_id: row.track_id,
            });
        }
        self.prior = Some(row.values);
        None
    }
}

/// Runs a scanner over a full ordered row sequence.
pub fn find_duplicates<V: PartialEq>(
    rows: impl IntoIterator<Item = ProvenanceRow<V>>,
) -> Vec<CandidateDuplicate> {
    let mut scanner = DuplicateScanner::new();
    rows.into_iter().filter_map(|row| scanner.push(row)).collect()
}

/// Every field of `prior` must match in `current`. Extra fields in
/// `current` are ignored.
fn same_values<V: PartialEq>(prior: &BTreeMap<String, V>, current: &BTreeMap<String, V>) -> bool {
    prior
        .iter()
        .all(|(key, value)| current.get(key) == Some(value))
}
