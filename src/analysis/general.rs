// 💬 General Insight - fallback for questions no other routine claims

use super::{AnalysisKind, Insight};
use crate::config::FallbackMode;
use crate::records::Record;
use rand::Rng;

pub const EXAMPLE_QUESTIONS: [&str; 7] = [
    "Show me the yearly trend",
    "Which budgets did we miss?",
    "Where are the biggest discrepancies?",
    "What is the total budget vs actual?",
    "What is the average spend per line?",
    "Which lines performed best and worst?",
    "Break down spending by GL code",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Help,
    Snapshot,
}

pub fn help() -> String {
    let mut text = String::from(
        "💬 I can analyze your budget data. Try asking about trends, missed budgets, \
         discrepancies, totals, averages, performance or general ledger codes. For example:\n",
    );
    for question in EXAMPLE_QUESTIONS {
        text.push_str(&format!("\n• \"{}\"", question));
    }
    text
}

pub fn snapshot(records: &[Record]) -> String {
    let fields: Vec<&str> = records
        .first()
        .map(|r| r.field_names().collect())
        .unwrap_or_default();

    let field_list = if fields.is_empty() {
        "none".to_string()
    } else {
        fields.join(", ")
    };

    format!(
        "📋 **Data Snapshot**\n\n• Records loaded: {}\n• Fields: {}\n\n\
         Ask about trends, totals, averages, discrepancies, missed budgets, performance or GL codes.",
        records.len(),
        field_list
    )
}

/// Pick the template for this call. `Sampled` is the only nondeterministic
/// path in the engine.
pub fn choose(mode: FallbackMode) -> Template {
    match mode {
        FallbackMode::Snapshot => Template::Snapshot,
        FallbackMode::Help => Template::Help,
        FallbackMode::Sampled => {
            if rand::rng().random_bool(0.5) {
                Template::Help
            } else {
                Template::Snapshot
            }
        }
    }
}

pub fn respond(records: &[Record], mode: FallbackMode) -> Insight {
    let narrative = match choose(mode) {
        Template::Help => help(),
        Template::Snapshot => snapshot(records),
    };
    Insight::text(AnalysisKind::GeneralInsight, narrative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lists_count_and_fields() {
        let records = vec![
            Record::new().with("Year", 2021.0).with("Budget", 10.0),
            Record::new().with("Year", 2022.0).with("Budget", 20.0),
        ];

        let insight = respond(&records, FallbackMode::Snapshot);
        assert_eq!(insight.kind, AnalysisKind::GeneralInsight);
        assert!(insight.narrative.contains("Records loaded: 2"));
        assert!(insight.narrative.contains("Fields: Year, Budget"));
        assert_eq!(insight.data, None);
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let records = vec![Record::new().with("Actual", 1.0)];
        let first = respond(&records, FallbackMode::Snapshot);
        let second = respond(&records, FallbackMode::Snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_help_lists_examples() {
        let text = help();
        for question in EXAMPLE_QUESTIONS {
            assert!(text.contains(question));
        }
    }

    #[test]
    fn test_sampled_returns_one_of_the_templates() {
        let records = vec![Record::new().with("Budget", 1.0)];
        let expected = [help(), snapshot(&records)];

        for _ in 0..20 {
            let insight = respond(&records, FallbackMode::Sampled);
            assert!(expected.contains(&insight.narrative));
        }
    }
}
