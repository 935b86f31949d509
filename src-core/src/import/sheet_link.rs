//! Spreadsheet link to CSV export URL

use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_EXPORT_TEMPLATE: &str =
    "https://docs.google.com/spreadsheets/d/{id}/export?format=csv";

static SHEET_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").ok());

/// Extract the sheet id from a `/d/<id>/...` link
pub fn sheet_id(link: &str) -> Option<&str> {
    SHEET_ID
        .as_ref()?
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Export URL for links carrying a sheet id; any other link is returned
/// unchanged
pub fn derive_csv_url(link: &str, template: &str) -> String {
    match sheet_id(link) {
        Some(id) => template.replace("{id}", id),
        None => link.to_string(),
    }
}
