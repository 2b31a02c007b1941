//! Partial-knowledge synthesis from weak matches.
//!
//! When no single fact is a strong match, the top weak matches are clustered
//! by token overlap and their leading sentences are merged into a bulleted
//! answer, with a low-confidence note when the contributing scores are thin.

use std::collections::HashSet;
use tracing::debug;

use crate::config::EngineConfig;
use crate::memory::relevance::ScoredEntry;
use crate::text::split_sentences;

struct Cluster<'a> {
    docs: Vec<&'a ScoredEntry<'a>>,
}

/// Greedy single-link clustering by token overlap: first-seen documents seed
/// clusters, later documents join the first cluster whose seed they overlap
/// with beyond the similarity threshold.
fn cluster_by_theme<'a>(
    docs: &'a [ScoredEntry<'a>],
    similarity_threshold: f32,
) -> Vec<Cluster<'a>> {
    let mut clusters: Vec<Cluster<'a>> = Vec::new();
    let mut used: HashSet<usize> = HashSet::new();

    for (idx, doc) in docs.iter().enumerate() {
        if used.contains(&idx) {
            continue;
        }
        used.insert(idx);
        let mut cluster = Cluster { docs: vec![doc] };

        for (other_idx, other) in docs.iter().enumerate() {
            if used.contains(&other_idx) {
                continue;
            }
            let overlap = doc
                .entry
                .tokens
                .iter()
                .filter(|t| other.entry.tokens.contains(t))
                .count();
            let smaller = doc.entry.tokens.len().min(other.entry.tokens.len()).max(1);
            let similarity = overlap as f32 / smaller as f32;

            if similarity > similarity_threshold {
                cluster.docs.push(other);
                used.insert(other_idx);
            }
        }

        clusters.push(cluster);
    }

    clusters
}

/// First qualifying sentence of each clustered document, deduplicated by
/// normalized text, at most three facts per cluster.
fn extract_key_facts(docs: &[&ScoredEntry<'_>]) -> Vec<String> {
    let mut facts = Vec::new();
    for doc in docs {
        let sentences = split_sentences(&doc.entry.answer, 20);
        if let Some(first) = sentences.first() {
            facts.push(first.clone());
        }
    }

    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for fact in facts {
        let normalized = fact.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
        if seen.insert(normalized) {
            unique.push(fact);
        }
    }

    unique.truncate(3);
    unique
}

/// Build a synthesized answer from the top weak matches.
pub fn synthesize(
    matches: &[ScoredEntry<'_>],
    topic: Option<&str>,
    config: &EngineConfig,
) -> String {
    let pool = &matches[..matches.len().min(config.synthesis_pool)];
    let clusters = cluster_by_theme(pool, config.cluster_similarity);
    debug!(clusters = clusters.len(), "Synthesizing partial knowledge");

    let mut synthesized = match topic {
        Some(t) => format!("Based on what I know about {}:\n\n", t),
        None => "Based on related information I have:\n\n".to_string(),
    };

    let multi = clusters.len() > 1;
    for cluster in &clusters {
        let facts = extract_key_facts(&cluster.docs);
        if facts.is_empty() {
            continue;
        }
        if multi {
            synthesized.push_str("\u{2022} ");
        }
        synthesized.push_str(&facts.join(". "));
        if !synthesized.ends_with('.') {
            synthesized.push('.');
        }
        synthesized.push_str("\n\n");
    }

    let avg_score: f32 =
        pool.iter().map(|d| d.score).sum::<f32>() / pool.len().max(1) as f32;
    if avg_score < config.synthesis_confidence_floor {
        synthesized.push_str(
            "\n(Note: I'm making connections from related topics in my knowledge base. \
             For more accurate information, I'd need additional context or could search \
             further.)",
        );
    }

    synthesized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::store::{EntryKind, FactRecord, KnowledgeStore};

    fn store_from(answers: &[&str]) -> KnowledgeStore {
        KnowledgeStore::load(
            answers
                .iter()
                .map(|a| FactRecord::Memory {
                    question: String::new(),
                    answer: a.to_string(),
                    kind: EntryKind::Knowledge,
                })
                .collect(),
        )
    }

    fn scored<'a>(store: &'a KnowledgeStore, scores: &[f32]) -> Vec<ScoredEntry<'a>> {
        store
            .entries()
            .iter()
            .zip(scores.iter())
            .map(|(entry, score)| ScoredEntry {
                entry,
                score: *score,
                overlap: 1,
            })
            .collect()
    }

    #[test]
    fn test_synthesis_includes_topic_heading() {
        let store = store_from(&["The desert climate is extremely dry all year round."]);
        let matches = scored(&store, &[0.3]);
        let text = synthesize(&matches, Some("deserts"), &EngineConfig::default());
        assert!(text.starts_with("Based on what I know about deserts:"));
        assert!(text.contains("desert climate is extremely dry"));
    }

    #[test]
    fn test_low_confidence_disclaimer() {
        let store = store_from(&["Sand dunes shift constantly under steady wind patterns."]);
        let matches = scored(&store, &[0.1]);
        let text = synthesize(&matches, None, &EngineConfig::default());
        assert!(text.contains("(Note:"));
    }

    #[test]
    fn test_no_disclaimer_for_confident_pool() {
        let store = store_from(&["Rivers carve canyons over geological timescales slowly."]);
        let matches = scored(&store, &[0.35]);
        let text = synthesize(&matches, None, &EngineConfig::default());
        assert!(!text.contains("(Note:"));
    }

    #[test]
    fn test_similar_documents_merge_into_one_cluster() {
        let store = store_from(&[
            "Honey bees pollinate flowering plants across wide regions.",
            "Honey bees pollinate flowering plants and make honey.",
            "Submarines navigate deep underwater using sonar equipment.",
        ]);
        let matches = scored(&store, &[0.3, 0.28, 0.25]);
        let clusters = cluster_by_theme(&matches, 0.3);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].docs.len(), 2);
    }

    #[test]
    fn test_duplicate_facts_deduplicated() {
        let store = store_from(&[
            "Glaciers move slowly down mountain valleys over time.",
            "Glaciers move slowly down mountain valleys over time.",
        ]);
        let matches = scored(&store, &[0.3, 0.3]);
        let text = synthesize(&matches, None, &EngineConfig::default());
        let occurrences = text.matches("Glaciers move slowly").count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let store = store_from(&[
            "Coral reefs host thousands of marine species worldwide.",
            "Coral reefs host many fish species in warm waters.",
            "Mountain goats climb steep rocky cliffs with ease.",
        ]);
        let matches = scored(&store, &[0.3, 0.29, 0.2]);
        let first = synthesize(&matches, None, &EngineConfig::default());
        let second = synthesize(&matches, None, &EngineConfig::default());
        assert_eq!(first, second);
    }
}
