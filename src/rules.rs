// 🏷️ Query Classification Rules - Rules as Data
// Keyword rules that route a free-text question to an analysis kind.
//
// Matching is plain substring search on the lower-cased question. Rules
// are tried in priority order and the first hit wins; a question that
// mentions both "trend" and "variance" is a trend question.

use crate::analysis::AnalysisKind;
use serde::Serialize;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRule {
    /// Kind selected when this rule matches
    pub kind: AnalysisKind,

    /// Lower-case fragments; any one of them is enough
    pub keywords: &'static [&'static str],

    /// Position in the evaluation order (lower = tried first)
    pub priority: u8,
}

impl ClassificationRule {
    /// First keyword found in an already lower-cased question
    pub fn matched_keyword(&self, question_lower: &str) -> Option<&'static str> {
        self.keywords
            .iter()
            .copied()
            .find(|keyword| question_lower.contains(keyword))
    }
}

/// The routing table. Keyword lists and order are part of the observable
/// behavior; changing either changes which answer a question gets.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule {
            kind: AnalysisKind::Trend,
            keywords: &["trend", "yearly"],
            priority: 1,
        },
        ClassificationRule {
            kind: AnalysisKind::MissedBudget,
            keywords: &["missed", "miss", "over budget"],
            priority: 2,
        },
        ClassificationRule {
            kind: AnalysisKind::Discrepancy,
            keywords: &["discrepan", "variance", "difference"],
            priority: 3,
        },
        ClassificationRule {
            kind: AnalysisKind::Totals,
            keywords: &["total", "sum"],
            priority: 4,
        },
        ClassificationRule {
            kind: AnalysisKind::Averages,
            keywords: &["average", "mean"],
            priority: 5,
        },
        ClassificationRule {
            kind: AnalysisKind::Performance,
            keywords: &["best", "worst", "performance"],
            priority: 6,
        },
        ClassificationRule {
            kind: AnalysisKind::Ledger,
            keywords: &["gl", "general ledger"],
            priority: 7,
        },
    ]
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub kind: AnalysisKind,
    /// `None` for the general-insight fallback
    pub keyword: Option<&'static str>,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        ClassificationResult {
            kind: AnalysisKind::GeneralInsight,
            keyword: None,
        }
    }
}

// ============================================================================
// QUERY CLASSIFIER
// ============================================================================

pub struct QueryClassifier {
    rules: Vec<ClassificationRule>,
}

impl QueryClassifier {
    pub fn new() -> Self {
        let mut rules = default_rules();
        rules.sort_by_key(|rule| rule.priority);
        QueryClassifier { rules }
    }

    pub fn classify(&self, question: &str) -> AnalysisKind {
        self.explain(question).kind
    }

    /// Classification plus the keyword that decided it
    pub fn explain(&self, question: &str) -> ClassificationResult {
        let question_lower = question.to_lowercase();

        for rule in &self.rules {
            if let Some(keyword) = rule.matched_keyword(&question_lower) {
                return ClassificationResult {
                    kind: rule.kind,
                    keyword: Some(keyword),
                };
            }
        }

        ClassificationResult::default()
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the built-in routing table.
pub fn classify(question: &str) -> AnalysisKind {
    QueryClassifier::new().classify(question)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_kind_is_reachable() {
        let cases = [
            ("Show the yearly numbers", AnalysisKind::Trend),
            ("Which lines MISSED their target?", AnalysisKind::MissedBudget),
            ("Are we over budget?", AnalysisKind::MissedBudget),
            ("Any discrepancies?", AnalysisKind::Discrepancy),
            ("What's the difference?", AnalysisKind::Discrepancy),
            ("Give me the totals", AnalysisKind::Totals),
            ("What is the mean spend?", AnalysisKind::Averages),
            ("Who are the worst offenders?", AnalysisKind::Performance),
            ("Break it down by GL", AnalysisKind::Ledger),
            ("Hello there", AnalysisKind::GeneralInsight),
        ];

        let classifier = QueryClassifier::new();
        for (question, expected) in cases {
            assert_eq!(classifier.classify(question), expected, "question: {}", question);
        }
    }

    #[test]
    fn test_priority_order_wins() {
        assert_eq!(classify("total trend please"), AnalysisKind::Trend);
        assert_eq!(classify("trend of the variance"), AnalysisKind::Trend);
        assert_eq!(classify("sum of missed lines"), AnalysisKind::MissedBudget);
        assert_eq!(classify("average difference"), AnalysisKind::Discrepancy);
    }

    #[test]
    fn test_substring_matching_is_literal() {
        // "summary" contains "sum"; "mission" contains "miss"
        assert_eq!(classify("Give me a summary"), AnalysisKind::Totals);
        assert_eq!(classify("our mission"), AnalysisKind::MissedBudget);
        // no "gl" fragment here, only the full phrase
        assert_eq!(classify("general ledger view"), AnalysisKind::Ledger);
    }

    #[test]
    fn test_explain_reports_keyword() {
        let result = QueryClassifier::new().explain("Show Performance");
        assert_eq!(result.kind, AnalysisKind::Performance);
        assert_eq!(result.keyword, Some("performance"));

        assert_eq!(QueryClassifier::new().explain("hi"), ClassificationResult::default());
    }

    #[test]
    fn test_rules_are_sorted() {
        let classifier = QueryClassifier::new();
        let priorities: Vec<u8> = classifier.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
