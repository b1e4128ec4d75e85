//! Readers that supply source tables to the consolidator.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SourceFiles;
use crate::error::{EngineError, EngineResult};
use crate::models::SourceTable;

use super::Table;

/// Supplies source tables by logical name.
///
/// `Ok(None)` means the source does not exist; `Err` means it exists but
/// could not be read.
pub trait TableReader {
    /// Reads one table.
    fn read(&self, table: SourceTable) -> EngineResult<Option<Table>>;
}

/// Reads CSV exports from a directory, one file per table.
///
/// Files are decoded as UTF-8, falling back to Latin-1. The delimiter is `;`
/// when the header line has more semicolons than commas, otherwise `,`.
/// Cells are trimmed and rows may be ragged.
#[derive(Debug, Clone)]
pub struct CsvDirectoryReader {
    dir: PathBuf,
    files: SourceFiles,
}

impl CsvDirectoryReader {
    /// Creates a reader over `dir` using the configured file names.
    pub fn new<P: AsRef<Path>>(dir: P, files: SourceFiles) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            files,
        }
    }

    /// The full path of a table's file.
    pub fn path_for(&self, table: SourceTable) -> PathBuf {
        self.dir.join(self.files.file_for(table))
    }
}

impl TableReader for CsvDirectoryReader {
    fn read(&self, table: SourceTable) -> EngineResult<Option<Table>> {
        let path = self.path_for(table);
        if !path.exists() {
            return Ok(None);
        }

        let read_error = |message: String| EngineError::SourceReadError {
            table: table.to_string(),
            message,
        };

        let bytes = fs::read(&path).map_err(|e| read_error(e.to_string()))?;
        let content = decode_export(bytes);
        let parsed = parse_csv(&content).map_err(|e| read_error(e.to_string()))?;

        debug!(table = %table, path = %path.display(), rows = parsed.len(), "read CSV table");
        Ok(Some(parsed))
    }
}

/// Decodes an exported file, stripping a UTF-8 byte order mark.
///
/// Bytes that are not valid UTF-8 are read as Latin-1, the encoding
/// spreadsheet exports commonly use for accented column names.
pub fn decode_export(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        },
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Parses CSV text into a [`Table`].
pub fn parse_csv(content: &str) -> Result<Table, csv::Error> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Tables held in memory, as supplied by the HTTP API.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: HashMap<SourceTable, Table>,
}

impl InMemoryTables {
    /// Creates an empty set of tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, table: SourceTable, data: Table) {
        self.tables.insert(table, data);
    }
}

impl FromIterator<(SourceTable, Table)> for InMemoryTables {
    fn from_iter<I: IntoIterator<Item = (SourceTable, Table)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

impl TableReader for InMemoryTables {
    fn read(&self, table: SourceTable) -> EngineResult<Option<Table>> {
        Ok(self.tables.get(&table).cloned())
    }
}
