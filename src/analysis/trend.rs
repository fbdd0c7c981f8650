// 📈 Trend Analysis - year-over-year budget accuracy
//
// Groups by year, then asks whether the size of the variance shrinks from
// one year to the next. "Positive" needs strictly more than half of the
// consecutive year pairs to improve.

use super::{AnalysisKind, ChartData, ChartKind, Insight, YearPoint};
use crate::records::Record;
use crate::variance::{format_currency, format_percent, group_by_year};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearStatus {
    Good,
    Warning,
    Poor,
}

impl YearStatus {
    pub fn from_variance(variance_pct: f64) -> Self {
        let magnitude = variance_pct.abs();
        if magnitude < 5.0 {
            YearStatus::Good
        } else if magnitude < 15.0 {
            YearStatus::Warning
        } else {
            YearStatus::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YearStatus::Good => "good",
            YearStatus::Warning => "warning",
            YearStatus::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Positive,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Positive => "positive",
            TrendDirection::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    /// Ascending by year
    pub years: Vec<YearPoint>,
    pub improving_pairs: usize,
    /// `None` when fewer than two distinct years exist
    pub direction: Option<TrendDirection>,
}

impl TrendReport {
    pub fn is_insufficient(&self) -> bool {
        self.direction.is_none()
    }

    pub fn total_pairs(&self) -> usize {
        self.years.len().saturating_sub(1)
    }

    pub fn variance_for(&self, year: i32) -> Option<f64> {
        self.years
            .iter()
            .find(|p| p.year == year)
            .map(|p| p.variance_pct)
    }

    pub fn narrative(&self) -> String {
        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                return format!(
                    "📈 **Trend analysis needs more data.** Found records for {} distinct year(s); \
                     at least 2 years are required to compare budget performance over time.",
                    self.years.len()
                )
            }
        };

        let mut text = format!(
            "📈 **Yearly Budget Trend** ({}–{})\n",
            self.years[0].year,
            self.years[self.years.len() - 1].year
        );

        for point in &self.years {
            text.push_str(&format!(
                "\n• {}: Budget {}, Actual {}, Variance {} ({})",
                point.year,
                format_currency(point.budget),
                format_currency(point.actual),
                format_percent(point.variance_pct),
                point.status.as_str()
            ));
        }

        text.push_str(&format!(
            "\n\nOverall trend: **{}**. Budget accuracy improved in {} of {} year-over-year comparisons.",
            direction.as_str(),
            self.improving_pairs,
            self.total_pairs()
        ));

        text
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        let insight = Insight::text(AnalysisKind::Trend, narrative);
        if self.is_insufficient() {
            insight
        } else {
            insight.with_chart(ChartKind::Line, ChartData::YearSeries(self.years))
        }
    }
}

pub fn analyze(records: &[Record]) -> TrendReport {
    let years: Vec<YearPoint> = group_by_year(records)
        .into_iter()
        .map(|(year, totals)| {
            let variance_pct = totals.variance_pct();
            YearPoint {
                year,
                budget: totals.budget,
                actual: totals.actual,
                variance_pct,
                status: YearStatus::from_variance(variance_pct),
            }
        })
        .collect();

    if years.len() < 2 {
        return TrendReport {
            years,
            improving_pairs: 0,
            direction: None,
        };
    }

    let improving_pairs = years
        .windows(2)
        .filter(|pair| pair[1].variance_pct.abs() < pair[0].variance_pct.abs())
        .count();

    let total_pairs = years.len() - 1;
    let direction = if improving_pairs * 2 > total_pairs {
        TrendDirection::Positive
    } else {
        TrendDirection::Declining
    };

    TrendReport {
        years,
        improving_pairs,
        direction: Some(direction),
    }
}
