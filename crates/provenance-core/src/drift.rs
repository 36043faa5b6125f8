//! Column drift between a shadow table and its live table.

use std::collections::BTreeSet;
use std::fmt;

use crate::naming::is_provenance_name;

/// One column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnInfo {
    /// Column name.
    pub column: String,
    /// SQL data type (`integer`, `USER-DEFINED`, `ARRAY`, ...).
    pub data_type: String,
    /// Underlying type name (`int4`, `my_enum`, `_text`, ...).
    pub udt_name: String,
}

impl ColumnInfo {
    /// Creates a column description.
    #[must_use]
    pub fn new(
        column: impl Into<String>,
        data_type: impl Into<String>,
        udt_name: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            data_type: data_type.into(),
            udt_name: udt_name.into(),
        }
    }
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}({})", self.column, self.data_type, self.udt_name)
    }
}

/// Builds the comparison set for a table, dropping audit columns.
#[must_use]
pub fn comparable_columns(columns: impl IntoIterator<Item = ColumnInfo>) -> BTreeSet<ColumnInfo> {
    columns
        .into_iter()
        .filter(|c| !is_provenance_name(&c.column))
        .collect()
}

/// Columns present on only one side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDrift {
    /// Columns the shadow table has and the live table lacks.
    pub only_provenance: BTreeSet<ColumnInfo>,
    /// Columns the live table has and the shadow table lacks.
    pub only_live: BTreeSet<ColumnInfo>,
}

impl ColumnDrift {
    /// Compares the two column sets. Returns `None` when they match.
    ///
    /// A column whose type changed shows up on both sides.
    #[must_use]
    pub fn between(
        provenance: impl IntoIterator<Item = ColumnInfo>,
        live: impl IntoIterator<Item = ColumnInfo>,
    ) -> Option<Self> {
        let provenance = comparable_columns(provenance);
        let live = comparable_columns(live);
        if provenance == live {
            return None;
        }
        Some(Self {
            only_provenance: provenance.difference(&live).cloned().collect(),
            only_live: live.difference(&provenance).cloned().collect(),
        })
    }
}

struct ColumnSet<'a>(&'a BTreeSet<ColumnInfo>);

impl fmt::Display for ColumnSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, column) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for ColumnDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            ColumnSet(&self.only_provenance),
            ColumnSet(&self.only_live)
        )
    }
}
