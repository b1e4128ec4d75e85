//! Source-table ingestion.
//!
//! This module turns raw tables (CSV files on disk or tables posted to the
//! HTTP API) into a typed [`Dataset`](crate::models::Dataset):
//!
//! - [`Table`]: header row plus text cells, with alias-tolerant column lookup
//! - [`TableReader`]: the seam between the pipeline and where tables come from
//! - [`run_consolidator`]: the first pipeline stage

mod consolidator;
mod reader;
mod table;
mod union_names;
mod values;

pub use consolidator::run_consolidator;
pub use reader::{CsvDirectoryReader, InMemoryTables, TableReader, decode_export, parse_csv};
pub use table::Table;
pub use union_names::{canonical_union, normalize_union};
pub use values::{parse_count, parse_date, parse_days, parse_decimal};
