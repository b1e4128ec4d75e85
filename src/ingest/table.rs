//! In-memory tabular data with alias-tolerant column lookup.

use serde::{Deserialize, Serialize};

/// A table of text cells with a header row.
///
/// # Example
///
/// ```
/// use voucher_engine::ingest::Table;
///
/// let table = Table::new(
///     vec!["MATRICULA".to_string(), "Sindicato".to_string()],
///     vec![vec!["1001".to_string(), "SINDPD SP".to_string()]],
/// );
/// let column = table.column(&["SINDICATO"]);
/// assert_eq!(column, Some(1));
/// assert_eq!(Table::cell(&table.rows()[0], column), "SINDPD SP");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table from a header row and data rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// The header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header matching any alias, in alias order.
    ///
    /// Headers and aliases are compared trimmed and lower-cased.
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        let headers: Vec<String> = self
            .headers
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        aliases.iter().find_map(|alias| {
            let alias = alias.trim().to_lowercase();
            headers.iter().position(|h| *h == alias)
        })
    }

    /// The trimmed cell at `column`, or `""` when the column or cell is missing.
    pub fn cell(row: &[String], column: Option<usize>) -> &str {
        column
            .and_then(|idx| row.get(idx))
            .map(|c| c.trim())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec![
                "MATRICULA ".to_string(),
                "Nome".to_string(),
                "DATA DEMISSÃO".to_string(),
            ],
            vec![
                vec!["1".to_string(), " Ana ".to_string(), "2025-05-20".to_string()],
                vec!["2".to_string()],
            ],
        )
    }

    #[test]
    fn test_column_lookup_trims_and_ignores_case() {
        let table = table();
        assert_eq!(table.column(&["MATRICULA"]), Some(0));
        assert_eq!(table.column(&["NOME COMPLETO", "NOME"]), Some(1));
        assert_eq!(table.column(&["data demissão"]), Some(2));
        assert_eq!(table.column(&["CPF"]), None);
    }

    #[test]
    fn test_alias_order_wins() {
        let table = Table::new(
            vec!["CARGO".to_string(), "TITULO DO CARGO".to_string()],
            Vec::new(),
        );
        assert_eq!(table.column(&["TITULO DO CARGO", "CARGO"]), Some(1));
    }

    #[test]
    fn test_cell_handles_short_rows_and_missing_columns() {
        let table = table();
        assert_eq!(Table::cell(&table.rows()[0], Some(1)), "Ana");
        assert_eq!(Table::cell(&table.rows()[1], Some(2)), "");
        assert_eq!(Table::cell(&table.rows()[0], None), "");
    }
}
