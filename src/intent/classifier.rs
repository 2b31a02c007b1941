//! Signal collection and primary-intent resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calc::is_math_query;
use crate::context::QueryContext;
use crate::intent::rules::{IntentKind, RuleInput, RULES};
use crate::models::ResponseCategory;

/// One fired rule: intent tag plus the static weight the rule carries.
///
/// The confidence is a hand-assigned constant, not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentSignal {
    pub kind: IntentKind,
    pub confidence: f32,
}

/// Resolved view of a query's signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub primary: IntentKind,
    pub confidence: f32,
    pub secondary: Vec<IntentKind>,
    pub signals: Vec<IntentSignal>,
}

impl IntentAnalysis {
    pub fn has_secondary(&self, kind: IntentKind) -> bool {
        self.secondary.contains(&kind)
    }
}

/// Evaluates the rule bank and resolves signals into a primary intent.
#[derive(Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every rule independently; any number may fire. Signals are
    /// returned ordered by confidence descending (stable for ties).
    pub fn classify(
        &self,
        query: &str,
        last_category: Option<ResponseCategory>,
    ) -> Vec<IntentSignal> {
        let lower = query.trim().to_lowercase();
        let input = RuleInput {
            raw: query,
            lower: &lower,
            last_category,
        };

        let mut signals: Vec<IntentSignal> = RULES
            .iter()
            .filter(|rule| (rule.test)(&input))
            .map(|rule| IntentSignal {
                kind: rule.kind,
                confidence: rule.confidence,
            })
            .collect();

        signals.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        signals
    }

    /// Resolve signals to a primary intent.
    ///
    /// The highest-confidence signal wins, except that an answer to a
    /// pending system question outranks an unrelated classification: when
    /// the previous output ended in a question and a confirmation or
    /// negation signal fired as secondary, that signal is promoted.
    pub fn analyze(&self, query: &str, context: &QueryContext) -> IntentAnalysis {
        let mut signals = self.classify(query, context.last_response_category);

        // Well-formed but unmatched queries should not fall through with
        // zero signals.
        if signals.is_empty() {
            let words = query.split_whitespace().count();
            let has_capitalized = query.chars().any(|c| c.is_ascii_uppercase());
            if words > 1 && !is_math_query(&query.to_lowercase()) && (has_capitalized || words > 3)
            {
                signals.push(IntentSignal {
                    kind: IntentKind::Question,
                    confidence: 0.5,
                });
            }
        }

        let Some(first) = signals.first().copied() else {
            return IntentAnalysis {
                primary: IntentKind::General,
                confidence: 0.5,
                secondary: Vec::new(),
                signals,
            };
        };

        let mut primary = first.kind;
        let mut confidence = first.confidence;

        let mut secondary: Vec<IntentKind> = Vec::new();
        for signal in signals.iter().skip(1) {
            if signal.kind != primary && !secondary.contains(&signal.kind) {
                secondary.push(signal.kind);
            }
        }

        if context.last_system_question.is_some() {
            let promoted = if secondary.contains(&IntentKind::Confirmation) {
                Some(IntentKind::Confirmation)
            } else if secondary.contains(&IntentKind::Negation) {
                Some(IntentKind::Negation)
            } else {
                None
            };
            if let Some(kind) = promoted {
                debug!(?primary, ?kind, "Pending question promotes answer intent");
                secondary.retain(|k| *k != kind);
                secondary.insert(0, primary);
                primary = kind;
                confidence = signals
                    .iter()
                    .find(|s| s.kind == kind)
                    .map(|s| s.confidence)
                    .unwrap_or(confidence);
            }
        }

        IntentAnalysis {
            primary,
            confidence,
            secondary,
            signals,
        }
    }
}
