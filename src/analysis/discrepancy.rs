// 🔍 Discrepancy Analysis - lines whose variance exceeds 5%

use super::{AnalysisKind, ChartData, ChartKind, Insight};
use crate::records::Record;
use crate::variance::{format_currency, format_percent, record_views, RecordView};

/// Lines at or under this absolute variance are considered accurate.
pub const DISCREPANCY_THRESHOLD_PCT: f64 = 5.0;

/// How many of the largest discrepancies are listed.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyReport {
    pub total_records: usize,
    /// Lines over the threshold, in input order
    pub flagged: Vec<RecordView>,
    /// Sum of |actual - budget| across flagged lines
    pub total_abs_discrepancy: f64,
    /// Mean |variance %| across flagged lines; 0 when nothing is flagged
    pub mean_abs_variance: f64,
    /// Largest |variance %| first, ties in input order
    pub top: Vec<RecordView>,
}

impl DiscrepancyReport {
    pub fn narrative(&self) -> String {
        if self.flagged.is_empty() {
            return format!(
                "✅ **Excellent accuracy!** All {} budget lines are within 5% of their planned amounts.",
                self.total_records
            );
        }

        let mut text = format!(
            "🔍 **Discrepancy Analysis**\n\n{} of {} budget lines differ from plan by more than 5%.\n\
             • Total absolute discrepancy: {}\n\
             • Average variance: {:.1}%\n\nTop {} discrepancies:",
            self.flagged.len(),
            self.total_records,
            format_currency(self.total_abs_discrepancy),
            self.mean_abs_variance,
            self.top.len()
        );

        for (rank, view) in self.top.iter().enumerate() {
            text.push_str(&format!(
                "\n{}. {} ({}): Budget {}, Actual {}, Variance {}",
                rank + 1,
                view.category,
                view.year,
                format_currency(view.budget),
                format_currency(view.actual),
                format_percent(view.variance_pct)
            ));
        }

        text
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        let insight = Insight::text(AnalysisKind::Discrepancy, narrative);
        if self.top.is_empty() {
            insight
        } else {
            insight.with_chart(ChartKind::Table, ChartData::Records(self.top))
        }
    }
}

pub fn analyze(records: &[Record]) -> DiscrepancyReport {
    let flagged: Vec<RecordView> = record_views(records)
        .into_iter()
        .filter(|view| view.abs_variance() > DISCREPANCY_THRESHOLD_PCT)
        .collect();

    let total_abs_discrepancy: f64 = flagged.iter().map(RecordView::abs_difference).sum();
    let mean_abs_variance = if flagged.is_empty() {
        0.0
    } else {
        flagged.iter().map(RecordView::abs_variance).sum::<f64>() / flagged.len() as f64
    };

    // sort_by is stable, so equal variances keep input order
    let mut top = flagged.clone();
    top.sort_by(|a, b| b.abs_variance().total_cmp(&a.abs_variance()));
    top.truncate(TOP_N);

    DiscrepancyReport {
        total_records: records.len(),
        flagged,
        total_abs_discrepancy,
        mean_abs_variance,
        top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(category: &str, budget: f64, actual: f64) -> Record {
        Record::new()
            .with("Year", 2021.0)
            .with("Budget", budget)
            .with("Actual", actual)
            .with("Category", category)
    }

    #[test]
    fn test_threshold_boundary() {
        let records = vec![
            line("Exactly five", 100.0, 105.0),
            line("Just over", 100.0, 105.01),
        ];

        let report = analyze(&records);
        assert_eq!(report.flagged.len(), 1);
        assert_eq!(report.flagged[0].category, "Just over");
    }

    #[test]
    fn test_totals_and_mean() {
        let records = vec![
            line("A", 100.0, 120.0), // 20%
            line("B", 200.0, 180.0), // -10%
            line("C", 100.0, 101.0), // 1%, ignored
        ];

        let report = analyze(&records);
        assert_eq!(report.flagged.len(), 2);
        assert!((report.total_abs_discrepancy - 40.0).abs() < 1e-9);
        assert!((report.mean_abs_variance - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_five_is_stable() {
        let records = vec![
            line("first-10", 100.0, 110.0),
            line("big", 100.0, 150.0),
            line("second-10", 100.0, 90.0),
            line("third-10", 100.0, 110.0),
            line("fourth-10", 100.0, 110.0),
            line("fifth-10", 100.0, 90.0),
            line("seventh", 100.0, 107.0),
        ];

        let report = analyze(&records);
        let names: Vec<&str> = report.top.iter().map(|v| v.category.as_str()).collect();
        assert_eq!(
            names,
            vec!["big", "first-10", "second-10", "third-10", "fourth-10"]
        );
    }

    #[test]
    fn test_excellent_accuracy_when_nothing_flagged() {
        let records = vec![line("A", 100.0, 103.0), line("B", 0.0, 50.0)];

        let report = analyze(&records);
        assert!(report.flagged.is_empty());
        assert_eq!(report.mean_abs_variance, 0.0);
        assert!(report.narrative().contains("Excellent accuracy"));

        let insight = report.into_insight();
        assert_eq!(insight.data, None);
    }
}
