//! Shared output types for the answer pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag attached to every turn's output.
///
/// The next turn's context tracker consults this to interpret short
/// follow-up inputs ("again", "in 24 hour format", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    Conversational,
    Time,
    Date,
    Coin,
    Dice,
    Rng,
    Spell,
    Calc,
    Search,
    Factual,
    Definition,
    Comparison,
    Creative,
    Brainstorm,
    Rewrite,
    Summary,
    Meta,
    Fallback,
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResponseCategory::Conversational => "conversational",
            ResponseCategory::Time => "time",
            ResponseCategory::Date => "date",
            ResponseCategory::Coin => "coin",
            ResponseCategory::Dice => "dice",
            ResponseCategory::Rng => "rng",
            ResponseCategory::Spell => "spell",
            ResponseCategory::Calc => "calc",
            ResponseCategory::Search => "search",
            ResponseCategory::Factual => "factual",
            ResponseCategory::Definition => "definition",
            ResponseCategory::Comparison => "comparison",
            ResponseCategory::Creative => "creative",
            ResponseCategory::Brainstorm => "brainstorm",
            ResponseCategory::Rewrite => "rewrite",
            ResponseCategory::Summary => "summary",
            ResponseCategory::Meta => "meta",
            ResponseCategory::Fallback => "fallback",
        };
        write!(f, "{}", label)
    }
}

/// One fully-dispatched turn: answer text, provenance labels, and the
/// category recorded for the next turn's context tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub text: String,
    pub sources: Vec<String>,
    pub category: ResponseCategory,
}

impl EngineResponse {
    pub fn new(
        text: impl Into<String>,
        sources: &[&str],
        category: ResponseCategory,
    ) -> Self {
        Self {
            text: text.into(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(ResponseCategory::Search.to_string(), "search");
        assert_eq!(ResponseCategory::Conversational.to_string(), "conversational");
    }

    #[test]
    fn test_response_construction() {
        let response = EngineResponse::new("hello", &["Local Memory"], ResponseCategory::Factual);
        assert_eq!(response.text, "hello");
        assert_eq!(response.sources, vec!["Local Memory".to_string()]);
        assert_eq!(response.category, ResponseCategory::Factual);
    }
}
