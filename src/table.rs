//! CSV table loading and saving
//!
//! Every cell is kept as a string so postal codes with leading zeros are
//! written back exactly as they were read.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while reading or writing a table
#[derive(Debug, Error)]
pub enum TableError {
    /// The CSV could not be read, parsed or written
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A column the caller depends on is not present
    #[error("'{0}' column not found in the CSV file. Please check the column name.")]
    MissingColumn(String),

    /// A row was given the wrong number of values for a new column
    #[error("Column '{column}' has {got} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
}

/// An in-memory CSV table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table from a header row and data rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Reads a CSV file with a header row
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let csv_error = |source| TableError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut reader = Self::reader_builder()
            .from_path(path)
            .map_err(csv_error)?;
        Self::from_reader(&mut reader).map_err(csv_error)
    }

    /// Parses a CSV table from an in-memory string
    pub fn parse(content: &str) -> Result<Self, TableError> {
        let mut reader = Self::reader_builder().from_reader(content.as_bytes());
        Self::from_reader(&mut reader).map_err(|source| TableError::Csv {
            path: "<memory>".to_string(),
            source,
        })
    }

    /// Rows may have fewer fields than the header; they are padded with empty cells
    fn reader_builder() -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.flexible(true);
        builder
    }

    fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();
        let rows = reader
            .records()
            .map(|record| {
                record.map(|r| {
                    let mut row: Vec<String> = r.iter().map(str::to_string).collect();
                    if row.len() < width {
                        row.resize(width, String::new());
                    }
                    row
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Writes the table as CSV, header row first, without an index column
    pub fn write(&self, path: &Path) -> Result<(), TableError> {
        let csv_error = |source| TableError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;
        writer.write_record(&self.headers).map_err(csv_error)?;
        for row in &self.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.flush().map_err(|e| csv_error(csv::Error::from(e)))?;
        Ok(())
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

    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`Table::column_index`] but fails with `MissingColumn`
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Value of column `index` in row `row`, empty for short rows
    pub fn cell(&self, row: usize, index: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some((0..self.rows.len()).map(|row| self.cell(row, index)).collect())
    }

    /// Sets a column to `values`, replacing it if it exists or appending it
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= index {
                row.resize(index + 1, String::new());
            }
            row[index] = value;
        }
        Ok(())
    }
}
