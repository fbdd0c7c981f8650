// 🏛️ Attribute Layer - logical budget fields and their accepted spellings
//
// Uploaded sheets spell their headers differently ("Year", "year", ...).
// Every read of a logical field goes through `lookup`, which walks a fixed
// priority list of spellings and returns the first value that is present.

use crate::records::{FieldValue, Record};
use serde::{Deserialize, Serialize};

// ============================================================================
// LOGICAL ATTRIBUTES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Year,
    Budget,
    Actual,
    Category,
}

impl Attribute {
    /// Accepted header spellings, highest priority first.
    pub fn spellings(&self) -> &'static [&'static str] {
        match self {
            Attribute::Year => &["Year", "year", "YEAR"],
            Attribute::Budget => &["Budget", "budget", "BUDGET"],
            Attribute::Actual => &["Actual", "actual", "ACTUAL"],
            Attribute::Category => &[
                "Category",
                "category",
                "CATEGORY",
                "Description",
                "description",
                "DESCRIPTION",
            ],
        }
    }
}

/// First present value for `attribute`, following its spelling priority.
pub fn lookup(record: &Record, attribute: Attribute) -> Option<&FieldValue> {
    attribute
        .spellings()
        .iter()
        .filter_map(|name| record.get(name))
        .find(|value| value.is_present())
}

// ============================================================================
// LEDGER FIELDS
// ============================================================================

/// Name fragments that mark a column as a ledger code.
pub const LEDGER_MARKERS: [&str; 3] = ["gl", "account", "code"];

/// Whether a field name looks like a ledger-code column (case-insensitive).
pub fn is_ledger_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    LEDGER_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Ledger-code fields of a record, in the record's column order.
pub fn ledger_fields(record: &Record) -> Vec<String> {
    record
        .field_names()
        .filter(|name| is_ledger_field(name))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
