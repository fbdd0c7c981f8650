// Budget Insight - Core Library
// Answers free-text questions about budget records; used by the CLI, the
// API server and tests

pub mod analysis;
pub mod attributes;
pub mod config;
pub mod engine;
pub mod error;
pub mod records;
pub mod rules;
pub mod session;
pub mod variance;

// Re-export commonly used types
pub use analysis::{
    AnalysisKind, BandCount, ChartData, ChartKind, Insight, LedgerRow, SummaryBar, YearPoint,
};
pub use attributes::{Attribute, is_ledger_field, ledger_fields, lookup};
pub use config::{FallbackMode, InsightConfig};
pub use engine::InsightEngine;
pub use error::{AnalysisError, LoadError};
pub use records::{
    FieldValue, Record, RecordSet,
    load_csv, load_json, load_path, parse_numeric,
};
pub use rules::{ClassificationResult, ClassificationRule, QueryClassifier, classify};
pub use session::{Session, SessionError, SessionStore};
pub use variance::{RecordView, Totals, variance_pct};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
