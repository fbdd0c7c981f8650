// Analysis Routines - one module per question kind
//
// Each routine is a pure function of the record set. It returns a typed
// report (the computed metrics) that renders into an `Insight`: narrative
// text plus an optional chart payload and chart hint.

pub mod averages;
pub mod discrepancy;
pub mod general;
pub mod ledger;
pub mod missed;
pub mod performance;
pub mod totals;
pub mod trend;

use crate::variance::{RecordView, Totals};
use serde::{Deserialize, Serialize};

// ============================================================================
// ANALYSIS KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Trend,
    MissedBudget,
    Discrepancy,
    Totals,
    Averages,
    Performance,
    Ledger,
    GeneralInsight,
}

impl AnalysisKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Trend => "trend-analysis",
            AnalysisKind::MissedBudget => "missed-budget-analysis",
            AnalysisKind::Discrepancy => "discrepancy-analysis",
            AnalysisKind::Totals => "totals-analysis",
            AnalysisKind::Averages => "averages-analysis",
            AnalysisKind::Performance => "performance-analysis",
            AnalysisKind::Ledger => "ledger-analysis",
            AnalysisKind::GeneralInsight => "general-insight",
        }
    }

    /// Whether the routine reads individual records (and so needs some).
    pub fn needs_records(&self) -> bool {
        !matches!(self, AnalysisKind::GeneralInsight)
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// INSIGHT (engine output)
// ============================================================================

/// Suggested visualization; a rendering hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i32,
    pub budget: f64,
    pub actual: f64,
    pub variance_pct: f64,
    pub status: trend::YearStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBar {
    pub label: String,
    pub budget: f64,
    pub actual: f64,
    pub variance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub code: String,
    pub count: usize,
    pub budget: f64,
    pub actual: f64,
    pub variance_pct: f64,
}

impl LedgerRow {
    pub fn from_totals(code: String, totals: &Totals) -> Self {
        LedgerRow {
            code,
            count: totals.count,
            budget: totals.budget,
            actual: totals.actual,
            variance_pct: totals.variance_pct(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCount {
    pub band: performance::ScoreBand,
    pub count: usize,
}

/// Chart-ready payload, shape depends on the analysis kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "rows", rename_all = "snake_case")]
pub enum ChartData {
    YearSeries(Vec<YearPoint>),
    Records(Vec<RecordView>),
    Summary(Vec<SummaryBar>),
    Ledger(Vec<LedgerRow>),
    Bands(Vec<BandCount>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: AnalysisKind,
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartKind>,
}

impl Insight {
    pub fn text(kind: AnalysisKind, narrative: String) -> Self {
        Insight {
            kind,
            narrative,
            data: None,
            chart: None,
        }
    }

    /// Builder pattern: attach a chart payload and hint
    pub fn with_chart(mut self, chart: ChartKind, data: ChartData) -> Self {
        self.chart = Some(chart);
        self.data = Some(data);
        self
    }
}
