use std::path::Path;
use std::time::Duration;

use crate::observatum::tools::error::Result;
use crate::observatum::tools::model::FieldValue;

pub mod excel;
pub mod sqlite;

pub use excel::ExcelSource;
pub use sqlite::SqliteSource;

/// Column layout of the queryable table inside a source.
///
/// `key_column` is optional so that an inventory run, whose whole point is to
/// discover the key columns, can open a source without naming one.
#[derive(Debug, Clone)]
pub struct SourceColumns {
    /// Table name (SQLite) or worksheet name (Excel).
    pub table: String,
    /// Column holding the entity name used for prefix lookups.
    pub name_column: String,
    /// Column holding the key identifier, if configured.
    pub key_column: Option<String>,
    /// Column holding the parent key identifier, if the source has one.
    pub parent_column: Option<String>,
}

impl SourceColumns {
    /// Creates a column layout with just a table and a name column.
    pub fn new(table: impl Into<String>, name_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name_column: name_column.into(),
            key_column: None,
            parent_column: None,
        }
    }

    /// Sets the key column.
    pub fn with_key(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = Some(key_column.into());
        self
    }

    /// Sets the parent key column.
    pub fn with_parent(mut self, parent_column: impl Into<String>) -> Self {
        self.parent_column = Some(parent_column.into());
        self
    }
}

/// Row selected by a prefix lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRecord {
    /// Full value of the name column for the selected row.
    pub name: String,
    /// Value of the configured key column.
    pub key: FieldValue,
    /// Value of the parent key column, `None` when the source has none
    /// configured. A stored SQL `NULL` is `Some(FieldValue::Null)`.
    pub parent_key: Option<FieldValue>,
}

/// A read-only tabular dataset that can be probed by name prefix.
///
/// Lookups are case-sensitive prefix matches against the configured name
/// column. When several rows match, the row that sorts first by
/// `(name, key)` ascending is selected, so the tie-break does not depend on
/// the source's incidental row order.
pub trait TabularSource {
    /// Returns the first row whose name starts with `prefix`, or `None` if
    /// no row matches.
    fn find_by_prefix(&mut self, prefix: &str) -> Result<Option<KeyRecord>>;

    /// Returns one full sample row matching `prefix` as `(column, value)`
    /// pairs in the source's native column order, or `None` if no row
    /// matches.
    fn sample_row(&mut self, prefix: &str) -> Result<Option<Vec<(String, FieldValue)>>>;
}

/// Supported source backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// SQLite database file.
    Sqlite,
    /// Excel workbook, one worksheet per table.
    Excel,
}

/// Guesses the backend from the file extension.
pub fn detect_format(path: &Path) -> Option<SourceFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "db" | "sqlite" | "sqlite3" => Some(SourceFormat::Sqlite),
        "xlsx" | "xlsm" => Some(SourceFormat::Excel),
        _ => None,
    }
}

/// Opens a source with the requested backend.
///
/// `busy_timeout` applies to the SQLite backend only; the Excel backend has
/// no equivalent and ignores it.
pub fn open_source(
    path: &Path,
    format: SourceFormat,
    columns: SourceColumns,
    busy_timeout: Option<Duration>,
) -> Result<Box<dyn TabularSource>> {
    match format {
        SourceFormat::Sqlite => Ok(Box::new(SqliteSource::open(path, columns, busy_timeout)?)),
        SourceFormat::Excel => Ok(Box::new(ExcelSource::open(path, columns)?)),
    }
}
