//! Column definition normalizer.
//!
//! `pg_get_tabledef` dumps one column per line. Every column line carries
//! either a nullability marker (`NULL` / `NOT NULL`) or an identity marker
//! (`GENERATED ...`). Everything after the marker (defaults, checks,
//! identity options) is dropped so the clause can be replayed in a shadow
//! table that has none of the source constraints.
//!
//! This is a narrow normalizer for that dump format, not a SQL parser.

/// Marker that ends a nullability clause.
const NULL_MARKER: &str = "NULL";

/// Marker that starts an identity / generated clause.
const GENERATED_MARKER: &str = "GENERATED";

/// Prefix of table constraint lines.
const CONSTRAINT_PREFIX: &str = "CONSTRAINT";

/// A column line that matches none of the known shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnParseError {
    /// The line has no `NULL` or `GENERATED` marker and is not a constraint.
    #[error("Unparsed column definition: {line}")]
    Unparsed {
        /// The offending line, trimmed.
        line: String,
    },
}

/// Normalizes one column line of a table definition dump.
///
/// Returns `Ok(None)` for constraint lines, which are not copied.
///
/// # Errors
///
/// Returns [`ColumnParseError::Unparsed`] when the line carries none of the
/// expected markers.
///
/// # Example
///
/// ```rust
/// use provenance_core::column::parse_column;
///
/// let clause = parse_column("  id integer NOT NULL DEFAULT nextval('id_seq')").unwrap();
/// assert_eq!(clause.as_deref(), Some("id integer NOT NULL"));
/// ```
pub fn parse_column(line: &str) -> Result<Option<String>, ColumnParseError> {
    let raw = line.trim();
    if raw.starts_with(CONSTRAINT_PREFIX) {
        return Ok(None);
    }

    // Position 0 is always the column name, so a marker there does not count.
    if let Some(pos) = marker_position(raw, NULL_MARKER) {
        let end = pos + NULL_MARKER.len();
        return Ok(Some(raw[..end].trim().to_string()));
    }

    if let Some(pos) = marker_position(raw, GENERATED_MARKER) {
        return Ok(Some(format!("{} NOT NULL", raw[..pos].trim())));
    }

    Err(ColumnParseError::Unparsed {
        line: raw.to_string(),
    })
}

fn marker_position(raw: &str, marker: &str) -> Option<usize> {
    raw.find(marker).filter(|&pos| pos > 0)
}
