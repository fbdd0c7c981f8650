// 🧠 Insight Engine - question in, insight out
//
// Classify the question, run the matching routine over the full record
// set, render the result. Nothing is cached between calls.

use crate::analysis::{
    averages, discrepancy, general, ledger, missed, performance, totals, trend, AnalysisKind,
    Insight,
};
use crate::config::FallbackMode;
use crate::error::AnalysisError;
use crate::records::Record;
use crate::rules::QueryClassifier;
use tracing::debug;

pub struct InsightEngine {
    classifier: QueryClassifier,
    fallback: FallbackMode,
}

impl InsightEngine {
    pub fn new() -> Self {
        InsightEngine {
            classifier: QueryClassifier::new(),
            fallback: FallbackMode::default(),
        }
    }

    pub fn with_fallback(fallback: FallbackMode) -> Self {
        InsightEngine {
            classifier: QueryClassifier::new(),
            fallback,
        }
    }

    /// Answer a free-text question about `records`.
    ///
    /// # Errors
    /// `AnalysisError::EmptyRecordSet` when `records` is empty and the
    /// question routes to a record-based analysis. The general-insight
    /// fallback answers even without data.
    pub fn ask(&self, question: &str, records: &[Record]) -> Result<Insight, AnalysisError> {
        let classification = self.classifier.explain(question);
        debug!(
            kind = %classification.kind,
            keyword = ?classification.keyword,
            records = records.len(),
            "classified question"
        );
        self.run(classification.kind, records)
    }

    /// Run one analysis kind directly, skipping classification.
    pub fn run(&self, kind: AnalysisKind, records: &[Record]) -> Result<Insight, AnalysisError> {
        if kind.needs_records() && records.is_empty() {
            return Err(AnalysisError::EmptyRecordSet);
        }

        let insight = match kind {
            AnalysisKind::Trend => trend::analyze(records).into_insight(),
            AnalysisKind::MissedBudget => missed::analyze(records)?.into_insight(),
            AnalysisKind::Discrepancy => discrepancy::analyze(records).into_insight(),
            AnalysisKind::Totals => totals::analyze(records).into_insight(),
            AnalysisKind::Averages => averages::analyze(records)?.into_insight(),
            AnalysisKind::Performance => performance::analyze(records).into_insight(),
            AnalysisKind::Ledger => ledger::analyze(records).into_insight(),
            AnalysisKind::GeneralInsight => general::respond(records, self.fallback),
        };

        Ok(insight)
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}
