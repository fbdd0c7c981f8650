// 📊 Averages Analysis - mean budget vs. mean actual per line

use super::{AnalysisKind, ChartData, ChartKind, Insight, SummaryBar};
use crate::error::AnalysisError;
use crate::records::Record;
use crate::variance::{format_currency, format_percent, variance_pct};
use serde::{Deserialize, Serialize};

/// Average variance under this magnitude is "good consistency".
pub const CONSISTENCY_BAND_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLabel {
    GoodConsistency,
    ReviewNeeded,
}

impl ConsistencyLabel {
    pub fn from_variance(variance_pct: f64) -> Self {
        if variance_pct.abs() < CONSISTENCY_BAND_PCT {
            ConsistencyLabel::GoodConsistency
        } else {
            ConsistencyLabel::ReviewNeeded
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLabel::GoodConsistency => "Good consistency",
            ConsistencyLabel::ReviewNeeded => "Review Needed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AveragesReport {
    pub record_count: usize,
    pub avg_budget: f64,
    pub avg_actual: f64,
    pub variance_pct: f64,
    pub label: ConsistencyLabel,
}

impl AveragesReport {
    pub fn narrative(&self) -> String {
        let verdict = match self.label {
            ConsistencyLabel::GoodConsistency => format!(
                "✅ **{}**: average spend tracks the average budget closely.",
                self.label.as_str()
            ),
            ConsistencyLabel::ReviewNeeded => format!(
                "⚠️ **{}**: average spend deviates from the average budget by 10% or more.",
                self.label.as_str()
            ),
        };

        format!(
            "📊 **Average per Budget Line** ({} lines)\n\n\
             • Average budget: {}\n\
             • Average actual: {}\n\
             • Variance: {}\n\n{}",
            self.record_count,
            format_currency(self.avg_budget),
            format_currency(self.avg_actual),
            format_percent(self.variance_pct),
            verdict
        )
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        let bar = SummaryBar {
            label: "Average".to_string(),
            budget: self.avg_budget,
            actual: self.avg_actual,
            variance_pct: self.variance_pct,
        };
        Insight::text(AnalysisKind::Averages, narrative)
            .with_chart(ChartKind::Bar, ChartData::Summary(vec![bar]))
    }
}

/// Requires at least one record: the means divide by the record count.
pub fn analyze(records: &[Record]) -> Result<AveragesReport, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyRecordSet);
    }

    let count = records.len() as f64;
    let avg_budget = records.iter().map(Record::budget).sum::<f64>() / count;
    let avg_actual = records.iter().map(Record::actual).sum::<f64>() / count;
    let variance = variance_pct(avg_budget, avg_actual);

    Ok(AveragesReport {
        record_count: records.len(),
        avg_budget,
        avg_actual,
        variance_pct: variance,
        label: ConsistencyLabel::from_variance(variance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(budget: f64, actual: f64) -> Record {
        Record::new().with("Budget", budget).with("Actual", actual)
    }

    #[test]
    fn test_means_and_label() {
        let records = vec![line(100.0, 110.0), line(300.0, 290.0)];

        let report = analyze(&records).unwrap();
        assert_eq!(report.avg_budget, 200.0);
        assert_eq!(report.avg_actual, 200.0);
        assert_eq!(report.variance_pct, 0.0);
        assert_eq!(report.label, ConsistencyLabel::GoodConsistency);
    }

    #[test]
    fn test_review_needed_at_ten_percent() {
        let records = vec![line(100.0, 110.0)];

        let report = analyze(&records).unwrap();
        assert_eq!(report.label, ConsistencyLabel::ReviewNeeded);
        assert!(report.narrative().contains("Review Needed"));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert_eq!(analyze(&[]), Err(AnalysisError::EmptyRecordSet));
    }
}
