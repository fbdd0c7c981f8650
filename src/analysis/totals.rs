// 💰 Totals Analysis - overall budget vs. actual

use super::{AnalysisKind, ChartData, ChartKind, Insight, SummaryBar};
use crate::records::Record;
use crate::variance::{format_currency, format_percent, variance_pct};
use serde::{Deserialize, Serialize};

/// Overall variance within this band (inclusive) counts as under control.
pub const CONTROL_BAND_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsLabel {
    ExcellentControl,
    OverBudget,
    UnderBudget,
}

impl TotalsLabel {
    pub fn from_variance(variance_pct: f64) -> Self {
        if variance_pct.abs() <= CONTROL_BAND_PCT {
            TotalsLabel::ExcellentControl
        } else if variance_pct > 0.0 {
            TotalsLabel::OverBudget
        } else {
            TotalsLabel::UnderBudget
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TotalsLabel::ExcellentControl => "excellent control",
            TotalsLabel::OverBudget => "over budget",
            TotalsLabel::UnderBudget => "under budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalsReport {
    pub record_count: usize,
    pub total_budget: f64,
    pub total_actual: f64,
    pub variance_pct: f64,
    pub label: TotalsLabel,
}

impl TotalsReport {
    pub fn narrative(&self) -> String {
        let label = self.label.as_str();
        let verdict = match self.label {
            TotalsLabel::ExcellentControl => {
                format!("✅ Spending shows **{}**: within 5% of plan.", label)
            }
            TotalsLabel::OverBudget => format!(
                "⚠️ Spending is **{}** by {}.",
                label,
                format_currency(self.total_actual - self.total_budget)
            ),
            TotalsLabel::UnderBudget => format!(
                "💡 Spending is **{}** by {}.",
                label,
                format_currency(self.total_budget - self.total_actual)
            ),
        };

        format!(
            "💰 **Budget Totals** ({} budget lines)\n\n\
             • Total budget: {}\n\
             • Total actual: {}\n\
             • Overall variance: {}\n\n{}",
            self.record_count,
            format_currency(self.total_budget),
            format_currency(self.total_actual),
            format_percent(self.variance_pct),
            verdict
        )
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        let bar = SummaryBar {
            label: "Total".to_string(),
            budget: self.total_budget,
            actual: self.total_actual,
            variance_pct: self.variance_pct,
        };
        Insight::text(AnalysisKind::Totals, narrative)
            .with_chart(ChartKind::Bar, ChartData::Summary(vec![bar]))
    }
}

pub fn analyze(records: &[Record]) -> TotalsReport {
    let total_budget: f64 = records.iter().map(Record::budget).sum();
    let total_actual: f64 = records.iter().map(Record::actual).sum();
    let variance = variance_pct(total_budget, total_actual);

    TotalsReport {
        record_count: records.len(),
        total_budget,
        total_actual,
        variance_pct: variance,
        label: TotalsLabel::from_variance(variance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_year_scenario() {
        let records = vec![
            Record::new().with("Year", 2021.0).with("Budget", 100.0).with("Actual", 120.0),
            Record::new().with("Year", 2022.0).with("Budget", 100.0).with("Actual", 90.0),
        ];

        let report = analyze(&records);
        assert_eq!(report.total_budget, 200.0);
        assert_eq!(report.total_actual, 210.0);
        assert!((report.variance_pct - 5.0).abs() < 1e-9);
        assert_eq!(report.label, TotalsLabel::ExcellentControl);

        let text = report.narrative();
        assert!(text.contains("+5.0%"));
        assert!(text.contains("excellent control"));
    }

    #[test]
    fn test_sums_parse_text_values() {
        let records = vec![
            Record::new().with("Budget", "1,000").with("Actual", "$1,500"),
            Record::new().with("budget", 500.0).with("actual", "oops"),
            Record::new(),
        ];

        let report = analyze(&records);
        assert_eq!(report.total_budget, 1500.0);
        assert_eq!(report.total_actual, 1500.0);
        assert_eq!(report.label, TotalsLabel::ExcellentControl);
    }

    #[test]
    fn test_over_and_under_labels() {
        assert_eq!(TotalsLabel::from_variance(12.0), TotalsLabel::OverBudget);
        assert_eq!(TotalsLabel::from_variance(-12.0), TotalsLabel::UnderBudget);
        assert_eq!(TotalsLabel::from_variance(-4.9), TotalsLabel::ExcellentControl);

        let records = vec![Record::new().with("Budget", 100.0).with("Actual", 150.0)];
        let text = analyze(&records).narrative();
        assert!(text.contains("over budget** by $50.00"));
    }

    #[test]
    fn test_zero_budget_total() {
        let records = vec![Record::new().with("Actual", 80.0)];
        let report = analyze(&records);

        assert_eq!(report.variance_pct, 0.0);
        assert_eq!(report.label, TotalsLabel::ExcellentControl);
    }

    #[test]
    fn test_narrative_uses_label_text() {
        for (budget, actual) in [(100.0, 103.0), (100.0, 140.0), (100.0, 60.0)] {
            let records = vec![Record::new().with("Budget", budget).with("Actual", actual)];
            let report = analyze(&records);
            let text = report.narrative();
            assert!(
                text.contains(&format!("**{}**", report.label.as_str())),
                "narrative: {}",
                text
            );
        }
    }
}
