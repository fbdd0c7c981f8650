// 🏆 Performance Analysis - score each line by how close it landed to plan

use super::{AnalysisKind, BandCount, ChartData, ChartKind, Insight};
use crate::records::Record;
use crate::variance::{format_percent, record_views, RecordView};
use serde::{Deserialize, Serialize};

/// Best/worst lists take the first N lines of their band, in input order.
pub const PERFORMERS_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 4] = [
        ScoreBand::Excellent,
        ScoreBand::Good,
        ScoreBand::Fair,
        ScoreBand::Poor,
    ];

    pub fn from_variance(variance_pct: f64) -> Self {
        let magnitude = variance_pct.abs();
        if magnitude < 5.0 {
            ScoreBand::Excellent
        } else if magnitude < 15.0 {
            ScoreBand::Good
        } else if magnitude < 25.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub total: usize,
    /// One entry per band, Excellent through Poor
    pub bands: Vec<BandCount>,
    pub best: Vec<RecordView>,
    pub worst: Vec<RecordView>,
}

impl PerformanceReport {
    pub fn count(&self, band: ScoreBand) -> usize {
        self.bands
            .iter()
            .find(|b| b.band == band)
            .map_or(0, |b| b.count)
    }

    pub fn narrative(&self) -> String {
        let mut text = format!("🏆 **Budget Performance** ({} budget lines)\n", self.total);

        for band in &self.bands {
            text.push_str(&format!("\n• {}: {}", band.band.as_str(), band.count));
        }

        text.push_str("\n\nBest performers:");
        push_performers(&mut text, &self.best, "no lines within 5% of plan");

        text.push_str("\n\nNeeds attention:");
        push_performers(&mut text, &self.worst, "no lines off plan by 25% or more");

        text
    }

    pub fn into_insight(self) -> Insight {
        let narrative = self.narrative();
        Insight::text(AnalysisKind::Performance, narrative)
            .with_chart(ChartKind::Bar, ChartData::Bands(self.bands))
    }
}

fn push_performers(text: &mut String, views: &[RecordView], empty: &str) {
    if views.is_empty() {
        text.push_str(&format!("\n• {}", empty));
        return;
    }
    for view in views {
        text.push_str(&format!(
            "\n• {} ({}): variance {}",
            view.category,
            view.year,
            format_percent(view.variance_pct)
        ));
    }
}

pub fn analyze(records: &[Record]) -> PerformanceReport {
    let scored: Vec<(ScoreBand, RecordView)> = record_views(records)
        .into_iter()
        .map(|view| (ScoreBand::from_variance(view.variance_pct), view))
        .collect();

    let bands = ScoreBand::ALL
        .iter()
        .map(|band| BandCount {
            band: *band,
            count: scored.iter().filter(|(b, _)| b == band).count(),
        })
        .collect();

    let first_in_band = |band: ScoreBand| -> Vec<RecordView> {
        scored
            .iter()
            .filter(|(b, _)| *b == band)
            .take(PERFORMERS_LIMIT)
            .map(|(_, view)| view.clone())
            .collect()
    };

    PerformanceReport {
        total: records.len(),
        best: first_in_band(ScoreBand::Excellent),
        worst: first_in_band(ScoreBand::Poor),
        bands,
    }
}
