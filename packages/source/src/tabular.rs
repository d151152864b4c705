//! Delimited-text reading with header lookup.

use std::collections::BTreeMap;

use csv::StringRecord;

use crate::SourceError;
use crate::config::delimiter_byte;

/// A CSV file read fully into memory.
pub struct CsvTable {
    file: String,
    columns: BTreeMap<String, usize>,
    /// Data rows, header excluded.
    pub records: Vec<StringRecord>,
}

impl CsvTable {
    /// Parses delimited text. `file` labels errors. Headers are trimmed,
    /// a UTF-8 byte order mark is ignored, and rows may have fewer fields
    /// than the header.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the text is not valid delimited text or
    /// the delimiter is invalid.
    pub fn from_bytes(file: &str, bytes: &[u8], delimiter: &str) -> Result<Self, SourceError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_byte(delimiter)?)
            .flexible(true)
            .from_reader(bytes);

        let columns = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_owned(), i))
            .collect();

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        log::debug!("Read {} rows from {file}", records.len());

        Ok(Self {
            file: file.to_string(),
            columns,
            records,
        })
    }

    /// Index of a required column.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumn`] if the header lacks it.
    pub fn require(&self, column: &str) -> Result<usize, SourceError> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| SourceError::MissingColumn {
                file: self.file.clone(),
                column: column.to_string(),
            })
    }

    /// Index of an optional column; logs when a configured column is
    /// absent.
    #[must_use]
    pub fn optional(&self, column: Option<&str>) -> Option<usize> {
        let column = column?;
        let index = self.columns.get(column).copied();
        if index.is_none() {
            log::warn!("{}: column '{column}' not found, treating as blank", self.file);
        }
        index
    }

    /// Label used in record ids and log lines.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }
}

/// Cell at `index`, or `""` when the row is short.
#[must_use]
pub fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

/// Cell at an optional index.
#[must_use]
pub fn optional_cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index.and_then(|i| record.get(i))
}
