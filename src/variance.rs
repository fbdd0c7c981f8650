// ⚖️ Variance Helpers - shared math, grouping and formatting
//
// Formula used everywhere:
//   variance % = (actual - budget) / budget * 100
//
// A zero budget has no meaningful percentage; we report 0 for it. That is
// a reporting policy, not something the numbers imply.

use crate::records::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variance of `actual` against `budget`, in percent. 0 when `budget` is 0.
pub fn variance_pct(budget: f64, actual: f64) -> f64 {
    if budget == 0.0 {
        0.0
    } else {
        (actual - budget) / budget * 100.0
    }
}

// ============================================================================
// RECORD VIEW (chart rows)
// ============================================================================

/// One record flattened for chart and table payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    /// Position in the uploaded record set (0-based)
    pub index: usize,
    pub year: i32,
    pub category: String,
    pub budget: f64,
    pub actual: f64,
    pub variance_pct: f64,
}

impl RecordView {
    pub fn from_record(index: usize, record: &Record) -> Self {
        let budget = record.budget();
        let actual = record.actual();
        RecordView {
            index,
            year: record.year(),
            category: record.category(),
            budget,
            actual,
            variance_pct: variance_pct(budget, actual),
        }
    }

    pub fn abs_variance(&self) -> f64 {
        self.variance_pct.abs()
    }

    pub fn abs_difference(&self) -> f64 {
        (self.actual - self.budget).abs()
    }
}

/// Flatten every record, keeping input order.
pub fn record_views(records: &[Record]) -> Vec<RecordView> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| RecordView::from_record(index, record))
        .collect()
}

// ============================================================================
// GROUPING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub budget: f64,
    pub actual: f64,
    pub count: usize,
}

impl Totals {
    pub fn add(&mut self, budget: f64, actual: f64) {
        self.budget += budget;
        self.actual += actual;
        self.count += 1;
    }

    pub fn variance_pct(&self) -> f64 {
        variance_pct(self.budget, self.actual)
    }
}

/// Budget/actual sums per year, ascending by year.
pub fn group_by_year(records: &[Record]) -> BTreeMap<i32, Totals> {
    let mut by_year: BTreeMap<i32, Totals> = BTreeMap::new();
    for record in records {
        by_year
            .entry(record.year())
            .or_default()
            .add(record.budget(), record.actual());
    }
    by_year
}

// ============================================================================
// FORMATTING
// ============================================================================

/// `$1,234.56` style amount; negatives as `-$1,234.56`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Signed percentage with one decimal, e.g. `+5.0%`.
pub fn format_percent(value: f64) -> String {
    format!("{:+.1}%", value)
}
