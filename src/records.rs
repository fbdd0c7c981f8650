// 📄 Budget Records - tagged field values, typed accessors, loaders
//
// A record is one budget line as it arrived from the upload: an ordered
// list of (field name, value) pairs. Values are tagged (number, text,
// absent) and coerced explicitly when a logical field is read.

use crate::attributes::{self, Attribute};
use crate::error::LoadError;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// FIELD VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Absent,
}

impl FieldValue {
    /// Blank text counts as missing, same as an empty CSV cell.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::Number(_) => true,
            FieldValue::Absent => false,
        }
    }

    /// Truthiness used for optional columns: empty text, zero and NaN are
    /// all "not set".
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Absent => false,
        }
    }

    /// Numeric reading of the value; anything unparsable is 0.
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) if n.is_finite() => *n,
            FieldValue::Number(_) => 0.0,
            FieldValue::Text(s) => parse_numeric(s),
            FieldValue::Absent => 0.0,
        }
    }

    /// Display form, used for category names and ledger keys.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Absent => None,
        }
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Absent,
            serde_json::Value::Number(n) => n.as_f64().map_or(FieldValue::Absent, FieldValue::Number),
            serde_json::Value::String(s) if s.trim().is_empty() => FieldValue::Absent,
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Bool(b) => FieldValue::Text(b.to_string()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Defensive numeric parse for spreadsheet text.
///
/// Accepts surrounding whitespace, a `$` directly after an optional sign
/// (`-$45.99`), and `,` only as a thousands separator in the integer part
/// (`1,250.75`). Anything else that fails to parse, or parses to a
/// non-finite value, reads as 0.
pub fn parse_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let body = rest.strip_prefix('$').unwrap_or(rest);
    if body.starts_with(['+', '-']) {
        return 0.0;
    }

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (body, None),
    };

    if frac_part.is_some_and(|frac| frac.contains(',')) || !has_valid_grouping(int_part) {
        return 0.0;
    }

    let cleaned = format!("{}{}", sign, body.replace(',', ""));
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// `1234` or `1,234,567`; commas must split the digits into groups of three.
fn has_valid_grouping(int_part: &str) -> bool {
    if !int_part.contains(',') {
        return true;
    }

    let mut groups = int_part.split(',');
    let leading_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()));

    leading_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Builder pattern: append or overwrite a field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Exact-name field access. Logical fields go through the typed accessors.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // ========================================================================
    // TYPED ACCESSORS
    // ========================================================================

    /// Fiscal year; the current calendar year when missing or unparsable.
    pub fn year(&self) -> i32 {
        attributes::lookup(self, Attribute::Year)
            .and_then(parse_year)
            .unwrap_or_else(current_year)
    }

    pub fn budget(&self) -> f64 {
        attributes::lookup(self, Attribute::Budget).map_or(0.0, FieldValue::as_number)
    }

    pub fn actual(&self) -> f64 {
        attributes::lookup(self, Attribute::Actual).map_or(0.0, FieldValue::as_number)
    }

    pub fn category(&self) -> String {
        attributes::lookup(self, Attribute::Category)
            .and_then(FieldValue::as_text)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut record = Record::new();
        for (name, value) in object {
            record.insert(name, FieldValue::from_json(value));
        }
        record
    }
}

fn parse_year(value: &FieldValue) -> Option<i32> {
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        FieldValue::Absent => return None,
    };

    if n.is_finite() && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
        Some(n.trunc() as i32)
    } else {
        None
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

// ============================================================================
// RECORD SET
// ============================================================================

/// The records of one upload, in input order. Replaced wholesale, never
/// edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        RecordSet { records }
    }

    /// Build from a JSON array of objects (API payloads, `.json` uploads).
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, LoadError> {
        let rows = match value {
            serde_json::Value::Array(rows) => rows,
            other => {
                return Err(LoadError::InvalidShape(format!(
                    "expected a JSON array of records, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                serde_json::Value::Object(object) => records.push(Record::from_json_object(object)),
                other => {
                    return Err(LoadError::InvalidShape(format!(
                        "record {} is {}, expected an object",
                        index + 1,
                        json_kind(&other)
                    )))
                }
            }
        }

        Ok(RecordSet::new(records))
    }

    /// Field names of the first record; empty when there are no records.
    pub fn field_names(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.field_names().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl Deref for RecordSet {
    type Target = [Record];

    fn deref(&self) -> &[Record] {
        &self.records
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        RecordSet::new(records)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ============================================================================
// LOADERS
// ============================================================================

/// Load a CSV export. Headers become field names; cells stay text and empty
/// cells are absent.
pub fn load_csv(csv_path: &Path) -> Result<RecordSet, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(csv_path)?;

    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result?;
        let mut record = Record::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            let value = if cell.trim().is_empty() {
                FieldValue::Absent
            } else {
                FieldValue::Text(cell.to_string())
            };
            record.insert(name, value);
        }
        records.push(record);
    }

    info!(path = %csv_path.display(), records = records.len(), "loaded CSV records");
    Ok(RecordSet::new(records))
}

/// Load a JSON array of record objects.
pub fn load_json(json_path: &Path) -> Result<RecordSet, LoadError> {
    let content = std::fs::read_to_string(json_path).map_err(|source| LoadError::Io {
        path: json_path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value = serde_json::from_str(&content)?;
    let records = RecordSet::from_json_value(value)?;

    info!(path = %json_path.display(), records = records.len(), "loaded JSON records");
    Ok(records)
}

/// Load by file extension (`.csv` or `.json`).
pub fn load_path(path: &Path) -> Result<RecordSet, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    debug!(path = %path.display(), ?extension, "dispatching loader");

    match extension.as_deref() {
        Some("csv") => load_csv(path),
        Some("json") => load_json(path),
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

// ============================================================================
// TESTS
// ============================================================================
