//! Spreadsheet Import
//!
//! Turns a shareable spreadsheet link into a CSV export URL, downloads
//! it and maps the rows onto gear, patch and lesson records.

mod sheet_link;
mod csv_rows;
mod fetch;

pub use sheet_link::{derive_csv_url, DEFAULT_EXPORT_TEMPLATE};
pub use csv_rows::{parse_gear_csv, parse_lesson_csv, parse_patch_csv};
pub use fetch::SheetFetcher;

/// Import failures, worded for display
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("Could not download the sheet: {0}")]
    Fetch(String),
    #[error("The sheet download failed with HTTP status {0}")]
    Status(u16),
    #[error("The sheet is not valid CSV: {0}")]
    Parse(String),
    #[error("The sheet has no \"{0}\" column")]
    MissingColumn(&'static str),
}
