// 🚨 Missed-Budget Analysis - lines that overspent by more than 5%

use super::{AnalysisKind, ChartData, ChartKind, Insight};
use crate::error::AnalysisError;
use crate::records::Record;
use crate::variance::RecordView;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spend above `budget * MISS_FACTOR` counts as a miss (strictly above).
pub const MISS_FACTOR: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    HighRisk,
    ModerateConcern,
}

impl RiskLevel {
    /// `None` when the miss rate does not warrant a warning.
    pub fn from_miss_rate(missed_pct: f64) -> Option<Self> {
        if missed_pct > 30.0 {
            Some(RiskLevel::HighRisk)
        } else if missed_pct > 15.0 {
            Some(RiskLevel::ModerateConcern)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::HighRisk => "high risk",
            RiskLevel::ModerateConcern => "moderate concern",
        }
    }
}

pub fn is_missed(record: &Record) -> bool {
    record.actual() > record.budget() * MISS_FACTOR
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissedReport {
    pub total: usize,
    /// Missed lines in input order
    pub missed: Vec<RecordView>,
    pub missed_pct: f64,
    pub risk: Option<RiskLevel>,
    pub by_year: BTreeMap<i32, usize>,
}

impl MissedReport {
    pub fn missed_count(&self) -> usize {
        self.missed.len()
    }

    pub fn narrative(&self) -> String {
        if self.missed.is_empty() {
            return format!(
                "✅ **No missed budgets.** None of the {} budget lines exceeded its budget by more than 5%.",
                self.total
            );
        }

        let mut text = format!(
            "🚨 **Missed Budget Analysis**\n\n{} of {} budget lines ({:.1}%) exceeded their budget by more than 5%.",
            self.missed_count(),
            self.total,
            self.missed_pct
        );

        match self.risk {
            Some(risk @ RiskLevel::HighRisk) => text.push_str(&format!(
                "\n\n⚠️ This is a **{}** level of overspending.",
                risk.as_str()
            )),
            Some(risk @ RiskLevel::ModerateConcern) => text.push_str(&format!(
                "\n\n⚠️ This is a **{}**; keep an eye on these lines.",
                risk.as_str()
            )),
            None => {}
        }

        text.push_str("\n\nBreakdown by year:");
        for (year, count) in &self.by_year {
            text.push_str(&format!("\n• {}: {} missed", year, count));
        }

        text
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        Insight::text(AnalysisKind::MissedBudget, narrative)
            .with_chart(ChartKind::Bar, ChartData::Records(self.missed))
    }
}

/// Requires at least one record: the miss rate divides by the record count.
pub fn analyze(records: &[Record]) -> Result<MissedReport, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyRecordSet);
    }

    let missed: Vec<RecordView> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| is_missed(record))
        .map(|(index, record)| RecordView::from_record(index, record))
        .collect();

    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for view in &missed {
        *by_year.entry(view.year).or_insert(0) += 1;
    }

    let missed_pct = missed.len() as f64 / records.len() as f64 * 100.0;

    Ok(MissedReport {
        total: records.len(),
        missed_pct,
        risk: RiskLevel::from_miss_rate(missed_pct),
        missed,
        by_year,
    })
}
