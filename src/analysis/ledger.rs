// 📒 Ledger (GL) Analysis - budget accuracy per general-ledger code
//
// Ledger columns are detected from the first record's field names. All
// detected columns feed ONE keyspace keyed by cell value, so "4000" under
// `GL_Account` and "4000" under `Cost Code` land in the same bucket. That
// collision is known and deliberately left as is.

use super::{AnalysisKind, ChartData, ChartKind, Insight, LedgerRow};
use crate::attributes;
use crate::records::Record;
use crate::variance::{format_currency, format_percent, Totals};

/// Codes whose variance magnitude exceeds this need review.
pub const REVIEW_THRESHOLD_PCT: f64 = 15.0;

pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReport {
    /// Detected ledger columns; empty when the data has none
    pub fields: Vec<String>,
    /// Every code, largest |variance| first (ties in first-seen order)
    pub entries: Vec<LedgerRow>,
    pub needing_review: usize,
}

impl LedgerReport {
    pub fn has_ledger_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn top(&self) -> &[LedgerRow] {
        &self.entries[..self.entries.len().min(TOP_N)]
    }

    pub fn entry(&self, code: &str) -> Option<&LedgerRow> {
        self.entries.iter().find(|row| row.code == code)
    }

    pub fn narrative(&self) -> String {
        if !self.has_ledger_fields() {
            return "📒 **No general ledger fields found.** Add a column whose name contains \
                    \"GL\", \"Account\" or \"Code\" to analyze spending by ledger code."
                .to_string();
        }

        let mut text = format!(
            "📒 **General Ledger Analysis**\n\nLedger fields: {}\n{} GL codes analyzed, {} need review (variance over 15%).",
            self.fields.join(", "),
            self.entries.len(),
            self.needing_review
        );

        if !self.entries.is_empty() {
            text.push_str(&format!("\n\nTop {} codes by variance:", self.top().len()));
            for row in self.top() {
                text.push_str(&format!(
                    "\n• {}: {} line(s), Budget {}, Actual {}, Variance {}",
                    row.code,
                    row.count,
                    format_currency(row.budget),
                    format_currency(row.actual),
                    format_percent(row.variance_pct)
                ));
            }
        }

        text
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        let insight = Insight::text(AnalysisKind::Ledger, narrative);
        if self.entries.is_empty() {
            return insight;
        }
        let top = self.top().to_vec();
        insight.with_chart(ChartKind::Table, ChartData::Ledger(top))
    }
}

pub fn analyze(records: &[Record]) -> LedgerReport {
    let fields = records
        .first()
        .map(attributes::ledger_fields)
        .unwrap_or_default();

    // first-seen order keeps the ranking deterministic on ties
    let mut buckets: Vec<(String, Totals)> = Vec::new();

    for field in &fields {
        for record in records {
            let code = match record.get(field) {
                Some(value) if value.is_truthy() => value.as_text(),
                _ => None,
            };
            let Some(code) = code else { continue };

            let index = match buckets.iter().position(|(existing, _)| *existing == code) {
                Some(index) => index,
                None => {
                    buckets.push((code, Totals::default()));
                    buckets.len() - 1
                }
            };
            buckets[index].1.add(record.budget(), record.actual());
        }
    }

    let mut entries: Vec<LedgerRow> = buckets
        .into_iter()
        .map(|(code, totals)| LedgerRow::from_totals(code, &totals))
        .collect();
    entries.sort_by(|a, b| b.variance_pct.abs().total_cmp(&a.variance_pct.abs()));

    let needing_review = entries
        .iter()
        .filter(|row| row.variance_pct.abs() > REVIEW_THRESHOLD_PCT)
        .count();

    LedgerReport {
        fields,
        entries,
        needing_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gl_line(code: &str, budget: f64, actual: f64) -> Record {
        Record::new()
            .with("Year", 2022.0)
            .with("Budget", budget)
            .with("Actual", actual)
            .with("GL_Account", code)
    }

    #[test]
    fn test_two_codes_summed_separately() {
        let records = vec![
            gl_line("4000", 100.0, 120.0),
            gl_line("4100", 200.0, 190.0),
            gl_line("4000", 100.0, 100.0),
        ];

        let report = analyze(&records);
        assert_eq!(report.fields, vec!["GL_Account"]);
        assert_eq!(report.entries.len(), 2);

        let gl4000 = report.entry("4000").unwrap();
        assert_eq!(gl4000.count, 2);
        assert_eq!(gl4000.budget, 200.0);
        assert_eq!(gl4000.actual, 220.0);
        assert!((gl4000.variance_pct - 10.0).abs() < 1e-9);

        let gl4100 = report.entry("4100").unwrap();
        assert_eq!(gl4100.count, 1);
        assert!((gl4100.variance_pct + 5.0).abs() < 1e-9);

        assert_eq!(report.entries[0].code, "4000");
        assert_eq!(report.needing_review, 0);
    }

    #[test]
    fn test_no_ledger_fields() {
        let records = vec![Record::new().with("Budget", 10.0).with("Actual", 12.0)];

        let report = analyze(&records);
        assert!(!report.has_ledger_fields());
        assert!(report.narrative().contains("No general ledger fields"));
        assert_eq!(report.into_insight().data, None);
    }

    #[test]
    fn test_falsy_codes_are_skipped() {
        let records = vec![
            gl_line("4000", 100.0, 130.0),
            gl_line("", 100.0, 500.0),
            Record::new()
                .with("Budget", 50.0)
                .with("Actual", 50.0)
                .with("GL_Account", 0.0),
        ];

        let report = analyze(&records);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.needing_review, 1);
    }

    #[test]
    fn test_fields_share_one_keyspace() {
        let records = vec![
            Record::new()
                .with("Budget", 100.0)
                .with("Actual", 100.0)
                .with("GL_Account", "4000")
                .with("Cost Code", "4000"),
        ];

        let report = analyze(&records);
        assert_eq!(report.fields.len(), 2);
        assert_eq!(report.entries.len(), 1);
        // the same line counted once per column
        assert_eq!(report.entries[0].count, 2);
    }

    #[test]
    fn test_top_five_limit() {
        let records: Vec<Record> = (0..7)
            .map(|i| gl_line(&format!("50{}0", i), 100.0, 100.0 + i as f64 * 10.0))
            .collect();

        let report = analyze(&records);
        assert_eq!(report.entries.len(), 7);
        assert_eq!(report.top().len(), 5);
        assert_eq!(report.top()[0].code, "5060");
        // 20%, 30%, 40%, 50% and 60% exceed the review threshold
        assert_eq!(report.needing_review, 5);
    }
}
