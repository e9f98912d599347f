use tracing::{debug, instrument};

use crate::observatum::tools::error::Result;
use crate::observatum::tools::model::KeyField;
use crate::observatum::tools::source::TabularSource;

/// Substrings that mark a column as key-related. Matched case-insensitively.
pub const KEY_MARKERS: [&str; 3] = ["KEY", "TVK", "VERSION"];

/// Returns whether a column name looks key-related.
pub fn is_key_column(column: &str) -> bool {
    let upper = column.to_ascii_uppercase();
    KEY_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Fetches one sample row matching `name_pattern` and lists its key-related
/// columns in the source's native column order, for manual inspection.
///
/// Returns an empty sequence when no row matches; that is not an error.
#[instrument(level = "info", skip(source), fields(pattern = %name_pattern))]
pub fn key_field_inventory(
    source: &mut dyn TabularSource,
    name_pattern: &str,
) -> Result<Vec<KeyField>> {
    let Some(row) = source.sample_row(name_pattern)? else {
        debug!("no sample row matched");
        return Ok(Vec::new());
    };

    let fields: Vec<KeyField> = row
        .into_iter()
        .filter(|(column, _)| is_key_column(column))
        .map(|(column, value)| KeyField { column, value })
        .collect();
    debug!(field_count = fields.len(), "inventory extracted");
    Ok(fields)
}
