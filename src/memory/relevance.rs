//! IDF-weighted relevance ranking over the fact store.
//!
//! Scores are normalized coverage values in [0, 1]; the exact-match
//! shortcut returns 1.1 to signal a verified hit above the normal range.

use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::config::EngineConfig;
use crate::memory::store::{KnowledgeStore, MemoryEntry};

/// A ranked document with its coverage score.
#[derive(Debug, Clone)]
pub struct ScoredEntry<'a> {
    pub entry: &'a MemoryEntry,
    pub score: f32,
    pub overlap: usize,
}

struct WeightedToken {
    token: String,
    idf: f32,
}

impl KnowledgeStore {
    /// Rank documents against a token query, highest score first, capped at
    /// `config.max_results`. Pure for a fixed store.
    pub fn retrieve<'a>(
        &'a self,
        query_tokens: &[String],
        config: &EngineConfig,
    ) -> Vec<ScoredEntry<'a>> {
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let normalized_query = query_tokens.join(" ").to_lowercase();

        // Exact-match shortcut: a stored question equal to the query, or for
        // long queries an answer containing the full query, is a verified hit.
        for entry in self.entries() {
            if !entry.question.is_empty()
                && entry.question.to_lowercase().trim() == normalized_query
            {
                return vec![ScoredEntry {
                    entry,
                    score: 1.1,
                    overlap: entry.token_set.len(),
                }];
            }
            if query_tokens.len() > 4
                && entry.answer.to_lowercase().contains(&normalized_query)
            {
                return vec![ScoredEntry {
                    entry,
                    score: 1.1,
                    overlap: entry.token_set.len(),
                }];
            }
        }

        let total = self.total_documents();
        let mut weighted: Vec<WeightedToken> = query_tokens
            .iter()
            .map(|t| WeightedToken {
                token: t.clone(),
                idf: (((total + 1) as f32) / ((self.df(t) + 1) as f32)).ln() + 1.0,
            })
            .collect();

        let max_possible_score: f32 = weighted.iter().map(|w| w.idf).sum();
        if max_possible_score == 0.0 {
            return Vec::new();
        }

        // Critical terms: the rare, high-information words carrying the
        // query's core meaning.
        weighted.sort_by(|a, b| b.idf.partial_cmp(&a.idf).unwrap_or(Ordering::Equal));
        let num_critical =
            ((weighted.len() as f32 * config.critical_fraction).floor() as usize).max(1);
        let critical: HashSet<&str> = weighted[..num_critical]
            .iter()
            .map(|w| w.token.as_str())
            .collect();

        let mut scored: Vec<ScoredEntry<'a>> = self
            .entries()
            .iter()
            .filter_map(|entry| {
                let mut raw_score = 0.0;
                let mut overlap = 0;
                let mut critical_hits = 0;

                for w in &weighted {
                    if entry.token_set.contains(&w.token) {
                        overlap += 1;
                        raw_score += w.idf;
                        if critical.contains(w.token.as_str()) {
                            critical_hits += 1;
                        }
                    }
                }

                if overlap == 0 {
                    return None;
                }

                let mut coverage = raw_score / max_possible_score;

                // A document matching only common words is very likely
                // off-topic even with nonzero overlap.
                if critical_hits == 0 {
                    coverage *= config.no_critical_penalty;
                }

                Some(ScoredEntry {
                    entry,
                    score: coverage,
                    overlap,
                })
            })
            .collect();

        scored.retain(|s| s.score >= config.coverage_floor);
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(config.max_results);

        debug!(
            results = scored.len(),
            top_score = scored.first().map(|s| s.score).unwrap_or(0.0),
            "Ranked local memory"
        );
        scored
    }
}
