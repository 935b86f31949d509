//! CSV Row Mapping
//!
//! Headered CSV with a fixed header-to-field table per record kind.
//! Header matching ignores case and surrounding whitespace. Rows whose
//! required name column is empty are dropped.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;

use crate::domain::{GearItem, GearStatus, PatchCategory, PatchRow, TrainingLesson};
use super::ImportError;

/// (field key, accepted header spellings)
type ColumnTable = &'static [(&'static str, &'static [&'static str])];

const GEAR_COLUMNS: ColumnTable = &[
    ("name", &["name"]),
    ("category", &["category"]),
    ("status", &["status"]),
    ("location", &["location"]),
    ("serial", &["serial", "serial number"]),
    ("brand", &["brand", "manufacturer"]),
    ("model", &["model"]),
    ("purchase_date", &["purchase date"]),
    ("purchase_cost", &["purchase cost", "cost"]),
    ("replacement_cost", &["replacement cost"]),
    ("install_date", &["install date"]),
    ("last_maintenance", &["last maintenance"]),
    ("notes", &["notes"]),
];

const PATCH_COLUMNS: ColumnTable = &[
    ("name", &["name"]),
    ("input", &["input"]),
    ("output", &["output"]),
    ("source", &["source"]),
    ("destination", &["destination"]),
    ("notes", &["notes"]),
    ("channels", &["channels", "channel count"]),
    ("universe", &["universe", "dmx universe"]),
];

const LESSON_COLUMNS: ColumnTable = &[
    ("title", &["title"]),
    ("category", &["category"]),
    ("url", &["url", "video url", "link"]),
];

/// Column positions resolved from the header row
struct HeaderIndex {
    columns: HashMap<&'static str, usize>,
}

fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl HeaderIndex {
    fn resolve(headers: &StringRecord, table: ColumnTable) -> Self {
        let mut columns = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            let header = normalize_header(header);
            let matched = table
                .iter()
                .find(|(_, spellings)| spellings.iter().any(|s| *s == header));
            if let Some((key, _)) = matched {
                // First matching column wins
                columns.entry(*key).or_insert(position);
            }
        }
        Self { columns }
    }

    fn require(&self, key: &'static str) -> Result<(), ImportError> {
        if self.columns.contains_key(key) {
            Ok(())
        } else {
            Err(ImportError::MissingColumn(key))
        }
    }

    fn get<'r>(&self, record: &'r StringRecord, key: &str) -> &'r str {
        self.columns
            .get(key)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn optional(&self, record: &StringRecord, key: &str) -> Option<String> {
        let value = self.get(record, key);
        (!value.is_empty()).then(|| value.to_string())
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d.%m.%Y"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_money(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned.parse().ok()
}

fn parse_count(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Read all records, handing each non-malformed one to `map`
fn read_rows<T>(
    text: &str,
    table: ColumnTable,
    required: &'static str,
    mut map: impl FnMut(&HeaderIndex, &StringRecord) -> T,
) -> Result<Vec<T>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Parse(e.to_string()))?
        .clone();
    let index = HeaderIndex::resolve(&headers, table);
    index.require(required)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping malformed CSV row {}: {}", line + 2, e);
                continue;
            }
        };
        if index.get(&record, required).is_empty() {
            continue;
        }
        rows.push(map(&index, &record));
    }
    Ok(rows)
}

pub fn parse_gear_csv(text: &str) -> Result<Vec<GearItem>, ImportError> {
    read_rows(text, GEAR_COLUMNS, "name", |index, record| {
        let mut item = GearItem::new(
            index.get(record, "name").to_string(),
            index.get(record, "category").to_string(),
            GearStatus::from_label(index.get(record, "status")),
        );
        item.location = index.optional(record, "location");
        item.serial_number = index.optional(record, "serial");
        item.brand = index.optional(record, "brand");
        item.model = index.optional(record, "model");
        item.purchase_date = parse_date(index.get(record, "purchase_date"));
        item.purchase_cost = parse_money(index.get(record, "purchase_cost"));
        item.replacement_cost = parse_money(index.get(record, "replacement_cost"));
        item.install_date = parse_date(index.get(record, "install_date"));
        item.last_maintenance = parse_date(index.get(record, "last_maintenance"));
        item.notes = index.optional(record, "notes");
        item
    })
}

/// Rows are imported into one category; lighting sheets fill the
/// channel count and universe columns instead of input/output
pub fn parse_patch_csv(text: &str, category: PatchCategory) -> Result<Vec<PatchRow>, ImportError> {
    read_rows(text, PATCH_COLUMNS, "name", |index, record| {
        let mut row = PatchRow::new(category, index.get(record, "name").to_string());
        row.source = index.get(record, "source").to_string();
        row.destination = index.get(record, "destination").to_string();
        row.notes = index.get(record, "notes").to_string();
        match category {
            PatchCategory::Lighting => {
                row.channel_count = parse_count(index.get(record, "channels"));
                row.universe = parse_count(index.get(record, "universe"));
            }
            _ => {
                row.input = index.get(record, "input").to_string();
                row.output = index.get(record, "output").to_string();
            }
        }
        row
    })
}

pub fn parse_lesson_csv(text: &str) -> Result<Vec<TrainingLesson>, ImportError> {
    read_rows(text, LESSON_COLUMNS, "title", |index, record| {
        let mut lesson = TrainingLesson::new(
            index.get(record, "title").to_string(),
            index.get(record, "category").to_string(),
        );
        lesson.video_url = index.optional(record, "url");
        lesson
    })
}
