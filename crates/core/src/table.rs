//! Tabular input.
//!
//! Scoring charts, recommendation tables and vitamin sheets are all spreadsheets
//! whose first row is a header. [`Table`] is the in-memory form of such a sheet:
//! cells are kept as strings, and columns are addressed by header name matched
//! trimmed and case-insensitively (the source sheets are hand-edited and carry
//! stray whitespace such as `"Medical Condition "`).

use crate::{ReportError, ReportResult};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// A header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table from a header row and data rows.
    ///
    /// Short rows are padded with empty cells.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.into_iter().map(Into::into).collect();
                if cells.len() < width {
                    cells.resize(width, String::new());
                }
                cells
            })
            .collect();
        Self { headers, rows }
    }

    /// Reads the first worksheet of a spreadsheet (`xlsx`, `xls`, `ods`).
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ReportError::SourceNotFound`] if `path` is not a file
    /// - [`ReportError::Spreadsheet`] if the workbook cannot be parsed
    /// - [`ReportError::EmptyWorkbook`] if it has no worksheets
    pub fn load(path: &Path) -> ReportResult<Self> {
        if !path.is_file() {
            return Err(ReportError::SourceNotFound(path.to_path_buf()));
        }

        let spreadsheet_err = |source| ReportError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = open_workbook_auto(path).map_err(spreadsheet_err)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ReportError::EmptyWorkbook(path.to_path_buf()))?
            .map_err(spreadsheet_err)?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(cell_text).collect(),
            None => Vec::new(),
        };
        let data: Vec<Vec<String>> = rows
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        tracing::debug!("loaded {} rows from {}", data.len(), path.display());
        Ok(Self::from_rows(headers, data))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose header matches `name` (trimmed, case-insensitive).
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    }

    /// Iterates over the data rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }
}

/// A borrowed data row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell under the column named `name`, or `None` if the column is absent.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.table
            .column(name)
            .and_then(|idx| self.cells.get(idx))
            .map(String::as_str)
    }

    /// Whether the cell under `name` holds the single-letter "y" marker.
    pub fn is_marked(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|cell| cell.trim().eq_ignore_ascii_case("y"))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}
