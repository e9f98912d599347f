use std::path::Path;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::debug;

use crate::observatum::tools::error::{Result, ToolError};
use crate::observatum::tools::model::FieldValue;
use crate::observatum::tools::source::{KeyRecord, SourceColumns, TabularSource};

/// SQLite-backed tabular source.
///
/// The connection is opened read-only, owned by the source value, and
/// released when the source is dropped, on every exit path.
pub struct SqliteSource {
    conn: Connection,
    columns: SourceColumns,
}

impl SqliteSource {
    /// Opens the database at `path` and verifies the configured table and
    /// name column exist. Any failure here is a `SourceUnavailable`: the
    /// source cannot be used as configured and the run must not start.
    pub fn open(
        path: &Path,
        columns: SourceColumns,
        busy_timeout: Option<Duration>,
    ) -> Result<Self> {
        let unavailable = |reason: String| ToolError::SourceUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|error| unavailable(error.to_string()))?;

        if let Some(timeout) = busy_timeout {
            conn.busy_timeout(timeout)
                .map_err(|error| unavailable(error.to_string()))?;
        }

        // Probe the table and name column up front so a misconfigured source
        // fails the run instead of failing every entity.
        let probe = format!(
            "SELECT {} FROM {} LIMIT 0",
            quote_ident(&columns.name_column),
            quote_ident(&columns.table),
        );
        conn.prepare(&probe)
            .map_err(|error| unavailable(error.to_string()))?;

        debug!(path = %path.display(), table = %columns.table, "opened sqlite source");
        Ok(Self { conn, columns })
    }

    fn key_column(&self) -> Result<&str> {
        self.columns
            .key_column
            .as_deref()
            .ok_or_else(|| ToolError::Query("no key column configured for source".into()))
    }
}

impl TabularSource for SqliteSource {
    fn find_by_prefix(&mut self, prefix: &str) -> Result<Option<KeyRecord>> {
        let name = quote_ident(&self.columns.name_column);
        let key = quote_ident(self.key_column()?);
        let table = quote_ident(&self.columns.table);

        // substr comparison keeps the prefix match case-sensitive; LIKE
        // would fold ASCII case. Tie-break is (name, key) ascending.
        let sql = match &self.columns.parent_column {
            Some(parent) => format!(
                "SELECT {name}, {key}, {parent} FROM {table} \
                 WHERE substr({name}, 1, length(?1)) = ?1 \
                 ORDER BY {name}, {key} LIMIT 1",
                parent = quote_ident(parent),
            ),
            None => format!(
                "SELECT {name}, {key} FROM {table} \
                 WHERE substr({name}, 1, length(?1)) = ?1 \
                 ORDER BY {name}, {key} LIMIT 1",
            ),
        };

        let has_parent = self.columns.parent_column.is_some();
        let record = self
            .conn
            .query_row(&sql, params![prefix], |row| {
                Ok(KeyRecord {
                    name: field_value(row.get_ref(0)?).to_string(),
                    key: field_value(row.get_ref(1)?),
                    parent_key: if has_parent {
                        Some(field_value(row.get_ref(2)?))
                    } else {
                        None
                    },
                })
            })
            .optional()
            .map_err(|error| ToolError::Query(error.to_string()))?;
        Ok(record)
    }

    fn sample_row(&mut self, prefix: &str) -> Result<Option<Vec<(String, FieldValue)>>> {
        let name = quote_ident(&self.columns.name_column);
        let sql = format!(
            "SELECT * FROM {} WHERE substr({name}, 1, length(?1)) = ?1 \
             ORDER BY {name} LIMIT 1",
            quote_ident(&self.columns.table),
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|error| ToolError::Query(error.to_string()))?;
        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|column| column.to_string())
            .collect();

        let cells = stmt
            .query_row(params![prefix], |row| {
                let mut cells = Vec::with_capacity(column_names.len());
                for index in 0..column_names.len() {
                    cells.push(field_value(row.get_ref(index)?));
                }
                Ok(cells)
            })
            .optional()
            .map_err(|error| ToolError::Query(error.to_string()))?;

        Ok(cells.map(|cells| column_names.into_iter().zip(cells).collect()))
    }
}

fn field_value(value: ValueRef<'_>) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(value) => FieldValue::Integer(value),
        ValueRef::Real(value) => FieldValue::Real(value),
        ValueRef::Text(bytes) => FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => FieldValue::Text(format!("<blob {} bytes>", bytes.len())),
    }
}

/// Quotes an identifier for embedding in SQL text. Table and column names
/// come from configuration, not from query parameters, so they cannot be
/// bound and must be escaped instead.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
