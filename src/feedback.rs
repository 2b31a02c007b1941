//! Feedback learning.
//!
//! Judgements on past responses are aggregated into success and failure
//! patterns; parameter tuning is a pure function over that summary, so it
//! works identically whatever storage backs the records. Persistence sits
//! behind the `FeedbackStore` trait.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::text::split_sentences;

static TRANSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(however|furthermore|moreover|additionally|therefore|thus|consequently|nevertheless)\b")
        .expect("Invalid regex: TRANSITION_RE")
});
static INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(in today's world|when we consider|throughout history)\b")
        .expect("Invalid regex: INTRO_RE")
});
static CONCLUSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(in conclusion|to summarize|ultimately)\b")
        .expect("Invalid regex: CONCLUSION_RE")
});

/// The user's judgement on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Good,
    Bad,
    Correction,
}

/// Coarse structural shape of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    StructuredEssay,
    MultiParagraph,
    Simple,
}

/// Stylistic fingerprint of one response text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPatterns {
    pub avg_sentence_length: f32,
    pub lexical_diversity: f32,
    pub structure: StructureType,
    pub transition_words: usize,
    pub paragraph_count: usize,
}

/// One feedback event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub response: String,
    pub kind: FeedbackKind,
    pub correction: Option<String>,
    pub patterns: TextPatterns,
    pub word_count: usize,
}

/// Aggregated feedback state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackMemory {
    pub records: Vec<FeedbackRecord>,
    pub success_patterns: Vec<TextPatterns>,
    pub failure_patterns: Vec<TextPatterns>,
    pub corrections: Vec<(String, String)>,
}

impl FeedbackMemory {
    /// Fold one judgement into the aggregates.
    pub fn record(&mut self, record: FeedbackRecord) {
        match record.kind {
            FeedbackKind::Good => self.success_patterns.push(record.patterns.clone()),
            FeedbackKind::Bad => self.failure_patterns.push(record.patterns.clone()),
            FeedbackKind::Correction => {
                if let Some(corrected) = &record.correction {
                    self.corrections
                        .push((record.response.clone(), corrected.clone()));
                }
            }
        }
        self.records.push(record);
        info!(total = self.records.len(), "Feedback recorded");
    }
}

/// Extract the stylistic fingerprint of a response text.
pub fn extract_patterns(text: &str) -> TextPatterns {
    let sentences = split_sentences(text, 0);
    let total_words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    let avg_sentence_length = if sentences.is_empty() {
        0.0
    } else {
        total_words as f32 / sentences.len() as f32
    };

    let words: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect();
    let unique: std::collections::HashSet<&String> = words.iter().collect();
    let lexical_diversity = if words.is_empty() {
        0.0
    } else {
        unique.len() as f32 / words.len() as f32
    };

    let paragraph_count = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();
    let structure = if INTRO_RE.is_match(text) && CONCLUSION_RE.is_match(text) {
        StructureType::StructuredEssay
    } else if paragraph_count > 3 {
        StructureType::MultiParagraph
    } else {
        StructureType::Simple
    };

    TextPatterns {
        avg_sentence_length,
        lexical_diversity,
        structure,
        transition_words: TRANSITION_RE.find_iter(text).count(),
        paragraph_count,
    }
}

/// Build a feedback record for a query/response pair.
pub fn build_record(
    query: &str,
    response: &str,
    kind: FeedbackKind,
    correction: Option<String>,
) -> FeedbackRecord {
    FeedbackRecord {
        timestamp: Utc::now(),
        query: query.to_string(),
        response: response.to_string(),
        kind,
        correction,
        patterns: extract_patterns(response),
        word_count: response.split_whitespace().count(),
    }
}

/// Nudge the generation temperature from accumulated success patterns.
///
/// Pure: same memory and current value in, same result out. Only acts once
/// at least 5 success samples exist; stays inside [0.75, 0.9].
pub fn tune_temperature(memory: &FeedbackMemory, current: f32) -> f32 {
    if memory.success_patterns.len() <= 5 {
        return current;
    }

    let avg_success_length: f32 = memory
        .success_patterns
        .iter()
        .map(|p| p.avg_sentence_length)
        .sum::<f32>()
        / memory.success_patterns.len() as f32;

    if avg_success_length > 20.0 {
        (current + 0.02).min(0.9)
    } else if avg_success_length < 12.0 {
        (current - 0.02).max(0.75)
    } else {
        current
    }
}

/// Persistence collaborator for feedback memory.
pub trait FeedbackStore: Send + Sync {
    fn load(&self) -> Result<FeedbackMemory>;
    fn save(&self, memory: &FeedbackMemory) -> Result<()>;
}

/// JSON-file backed store.
pub struct JsonFeedbackStore {
    path: PathBuf,
}

impl JsonFeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedbackStore for JsonFeedbackStore {
    fn load(&self) -> Result<FeedbackMemory> {
        if !self.path.exists() {
            return Ok(FeedbackMemory::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(memory) => Ok(memory),
            Err(err) => {
                warn!(error = %err, "Feedback file unreadable, starting fresh");
                Ok(FeedbackMemory::default())
            }
        }
    }

    fn save(&self, memory: &FeedbackMemory) -> Result<()> {
        let contents = serde_json::to_string_pretty(memory)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_sentence_patterns() -> TextPatterns {
        TextPatterns {
            avg_sentence_length: 25.0,
            lexical_diversity: 0.8,
            structure: StructureType::Simple,
            transition_words: 2,
            paragraph_count: 1,
        }
    }

    #[test]
    fn test_extract_patterns_counts_transitions() {
        let patterns = extract_patterns(
            "The result was surprising. However, the theory held. Therefore we continued.",
        );
        assert_eq!(patterns.transition_words, 2);
    }

    #[test]
    fn test_extract_patterns_structure_detection() {
        let essay = "In today's world, things change fast.\n\nBody one.\n\nIn conclusion, done.";
        assert_eq!(extract_patterns(essay).structure, StructureType::StructuredEssay);

        let flat = "Just one short statement.";
        assert_eq!(extract_patterns(flat).structure, StructureType::Simple);
    }

    #[test]
    fn test_record_routes_by_kind() {
        let mut memory = FeedbackMemory::default();
        memory.record(build_record("q", "a fine answer", FeedbackKind::Good, None));
        memory.record(build_record("q", "a poor answer", FeedbackKind::Bad, None));
        memory.record(build_record(
            "q",
            "wrong",
            FeedbackKind::Correction,
            Some("right".to_string()),
        ));

        assert_eq!(memory.success_patterns.len(), 1);
        assert_eq!(memory.failure_patterns.len(), 1);
        assert_eq!(memory.corrections.len(), 1);
        assert_eq!(memory.records.len(), 3);
    }

    #[test]
    fn test_tuning_requires_enough_samples() {
        let mut memory = FeedbackMemory::default();
        for _ in 0..5 {
            memory.success_patterns.push(long_sentence_patterns());
        }
        // 5 samples is not yet enough
        assert_eq!(tune_temperature(&memory, 0.85), 0.85);

        memory.success_patterns.push(long_sentence_patterns());
        assert!((tune_temperature(&memory, 0.85) - 0.87).abs() < 1e-6);
    }

    #[test]
    fn test_tuning_is_pure_and_clamped() {
        let mut memory = FeedbackMemory::default();
        for _ in 0..10 {
            memory.success_patterns.push(long_sentence_patterns());
        }
        let first = tune_temperature(&memory, 0.89);
        let second = tune_temperature(&memory, 0.89);
        assert_eq!(first, second);
        assert!(first <= 0.9);

        let mut short_memory = FeedbackMemory::default();
        for _ in 0..10 {
            short_memory.success_patterns.push(TextPatterns {
                avg_sentence_length: 8.0,
                ..long_sentence_patterns()
            });
        }
        assert!(tune_temperature(&short_memory, 0.76) >= 0.75);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFeedbackStore::new(dir.path().join("feedback.json"));

        let mut memory = FeedbackMemory::default();
        memory.record(build_record("query", "response text", FeedbackKind::Good, None));
        store.save(&memory).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].query, "query");
        assert_eq!(loaded.success_patterns.len(), 1);
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFeedbackStore::new(dir.path().join("absent.json"));
        let memory = store.load().unwrap();
        assert!(memory.records.is_empty());
    }
}
