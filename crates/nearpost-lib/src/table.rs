//! Generic tabular payloads handed to ingestion by source readers.

use std::io::Read;

use csv::{ReaderBuilder, Trim};

use crate::error::Result;

/// Column-named rows of raw cell text.
///
/// Every row holds exactly `headers.len()` cells; readers pad short rows with
/// empty strings and drop trailing surplus cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from headers and rows, normalising row widths.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Build a table from `(column name, values)` pairs.
    ///
    /// Columns of unequal length are padded with empty cells.
    pub fn from_columns<N, V, I>(columns: I) -> Self
    where
        N: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (N, Vec<V>)>,
    {
        let mut headers = Vec::new();
        let mut values: Vec<Vec<String>> = Vec::new();
        for (name, column) in columns {
            headers.push(name.into());
            values.push(column.into_iter().map(Into::into).collect());
        }

        let height = values.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..height)
            .map(|row| {
                values
                    .iter()
                    .map(|column| column.get(row).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self::new(headers, rows)
    }

    /// Parse a CSV payload with a header row.
    ///
    /// Fields are trimmed and rows may vary in length. A leading UTF-8 byte
    /// order mark on the first header is discarded.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                if idx == 0 {
                    header.trim_start_matches('\u{feff}').to_string()
                } else {
                    header.to_string()
                }
            })
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Column names in source order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows of cell text, each `headers().len()` wide.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first column whose name matches exactly.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Position of the first column matching any of `names`.
    ///
    /// Exact matches win over ASCII-case-insensitive ones, and earlier names
    /// win over later ones within each pass.
    pub fn find_column(&self, names: &[String]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.column(name))
            .or_else(|| {
                names.iter().find_map(|name| {
                    self.headers
                        .iter()
                        .position(|header| header.eq_ignore_ascii_case(name))
                })
            })
    }
}
