//! Request types for the Voucher Benefit Engine API.
//!
//! This module defines the JSON request structures for the `/runs` endpoint.
//! Source tables travel inline as headers plus string rows, exactly as the
//! CSV reader would produce them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ingest::{InMemoryTables, Table};
use crate::models::SourceTable;

use super::response::ApiError;

/// Request body for the `/runs` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// The month to process (`YYYY-MM` or `MM.YYYY`). Falls back to the
    /// configured competence, then the current month.
    #[serde(default)]
    pub competence: Option<String>,
    /// The source tables of the run. Absent tables are treated as missing.
    pub tables: Vec<TablePayload>,
}

/// One source table in a run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePayload {
    /// Which source table this is.
    pub table: SourceTable,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows, one string per cell.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl RunRequest {
    /// Checks the payload shape and builds the in-memory reader.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a table appears twice, has no
    /// headers, or has a row wider than its headers.
    pub fn into_tables(self) -> Result<InMemoryTables, ApiError> {
        let mut seen = BTreeSet::new();
        let mut tables = InMemoryTables::new();

        for payload in self.tables {
            if !seen.insert(payload.table) {
                return Err(ApiError::validation_error(format!(
                    "table '{}' appears more than once",
                    payload.table
                )));
            }
            if payload.headers.is_empty() {
                return Err(ApiError::validation_error(format!(
                    "table '{}' has no headers",
                    payload.table
                )));
            }
            if let Some(index) = payload
                .rows
                .iter()
                .position(|row| row.len() > payload.headers.len())
            {
                return Err(ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("table '{}' has a row wider than its headers", payload.table),
                    format!("row {} has more cells than the {} headers", index + 1, payload.headers.len()),
                ));
            }
            tables.insert(payload.table, Table::new(payload.headers, payload.rows));
        }
        Ok(tables)
    }
}
