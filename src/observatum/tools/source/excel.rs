use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::observatum::tools::error::{Result, ToolError};
use crate::observatum::tools::model::FieldValue;
use crate::observatum::tools::source::{KeyRecord, SourceColumns, TabularSource};

/// Excel-backed tabular source.
///
/// One worksheet plays the role of the table: the first row holds column
/// names and every following row is a record. The sheet is read once at open
/// time; lookups scan the in-memory rows.
pub struct ExcelSource {
    headers: Vec<String>,
    rows: Vec<Vec<DataType>>,
    columns: SourceColumns,
    name_index: usize,
    key_index: Option<usize>,
    parent_index: Option<usize>,
}

impl ExcelSource {
    /// Opens the workbook at `path` and loads the configured worksheet.
    /// A missing file, unreadable workbook, missing sheet, or missing name
    /// column is a `SourceUnavailable`. A missing key or parent column is
    /// deferred to lookup time as a `Query` error, since an inventory run
    /// does not need either.
    pub fn open(path: &Path, columns: SourceColumns) -> Result<Self> {
        let unavailable = |reason: String| ToolError::SourceUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|error: calamine::XlsxError| unavailable(error.to_string()))?;
        let range = workbook
            .worksheet_range(&columns.table)
            .ok_or_else(|| unavailable(format!("missing sheet '{}'", columns.table)))?
            .map_err(|error| unavailable(error.to_string()))?;

        let headers: Vec<String> = match range.rows().next() {
            Some(first_row) => first_row
                .iter()
                .map(|cell| cell_to_string(Some(cell)))
                .collect(),
            None => Vec::new(),
        };

        let name_index = column_index(&headers, &columns.name_column).ok_or_else(|| {
            unavailable(format!(
                "missing column '{}' in sheet '{}'",
                columns.name_column, columns.table
            ))
        })?;
        let key_index = columns
            .key_column
            .as_deref()
            .and_then(|column| column_index(&headers, column));
        let parent_index = columns
            .parent_column
            .as_deref()
            .and_then(|column| column_index(&headers, column));

        let rows: Vec<Vec<DataType>> = range.rows().skip(1).map(|row| row.to_vec()).collect();
        debug!(path = %path.display(), sheet = %columns.table, row_count = rows.len(), "loaded excel source");

        Ok(Self {
            headers,
            rows,
            columns,
            name_index,
            key_index,
            parent_index,
        })
    }

    fn key_index(&self) -> Result<usize> {
        match (&self.columns.key_column, self.key_index) {
            (Some(_), Some(index)) => Ok(index),
            (Some(column), None) => Err(ToolError::Query(format!(
                "missing column '{}' in sheet '{}'",
                column, self.columns.table
            ))),
            (None, _) => Err(ToolError::Query(
                "no key column configured for source".into(),
            )),
        }
    }

    fn parent_index(&self) -> Result<Option<usize>> {
        match (&self.columns.parent_column, self.parent_index) {
            (Some(_), Some(index)) => Ok(Some(index)),
            (Some(column), None) => Err(ToolError::Query(format!(
                "missing column '{}' in sheet '{}'",
                column, self.columns.table
            ))),
            (None, _) => Ok(None),
        }
    }

    /// First matching row index by the `(name, key)` ascending tie-break.
    fn best_match(&self, prefix: &str, key_index: Option<usize>) -> Option<usize> {
        let mut best: Option<(usize, (String, String))> = None;
        for (index, row) in self.rows.iter().enumerate() {
            let name = cell_to_string(row.get(self.name_index));
            if name.is_empty() || !name.starts_with(prefix) {
                continue;
            }
            let key_text = match key_index {
                Some(key_index) => cell_to_value(row.get(key_index)).to_string(),
                None => String::new(),
            };
            let token = (name, key_text);
            match &best {
                Some((_, current)) if *current <= token => {}
                _ => best = Some((index, token)),
            }
        }
        best.map(|(index, _)| index)
    }
}

impl TabularSource for ExcelSource {
    fn find_by_prefix(&mut self, prefix: &str) -> Result<Option<KeyRecord>> {
        let key_index = self.key_index()?;
        let parent_index = self.parent_index()?;

        let Some(row_index) = self.best_match(prefix, Some(key_index)) else {
            return Ok(None);
        };
        let row = &self.rows[row_index];

        Ok(Some(KeyRecord {
            name: cell_to_string(row.get(self.name_index)),
            key: cell_to_value(row.get(key_index)),
            parent_key: parent_index.map(|index| cell_to_value(row.get(index))),
        }))
    }

    fn sample_row(&mut self, prefix: &str) -> Result<Option<Vec<(String, FieldValue)>>> {
        let Some(row_index) = self.best_match(prefix, self.key_index) else {
            return Ok(None);
        };
        let row = &self.rows[row_index];

        let cells = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.clone(), cell_to_value(row.get(index))))
            .collect();
        Ok(Some(cells))
    }
}

fn column_index(headers: &[String], column: &str) -> Option<usize> {
    headers.iter().position(|header| header == column)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn cell_to_value(cell: Option<&DataType>) -> FieldValue {
    match cell {
        Some(DataType::String(value)) => FieldValue::Text(value.clone()),
        Some(DataType::Float(value)) => FieldValue::Real(*value),
        Some(DataType::Int(value)) => FieldValue::Integer(*value),
        Some(DataType::Bool(value)) => FieldValue::Text(value.to_string()),
        Some(DataType::Empty) | None => FieldValue::Null,
        Some(other) => FieldValue::Text(other.to_string()),
    }
}
