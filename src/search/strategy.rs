//! Fallback search strategies.
//!
//! When the generated search term fails, the orchestrator walks an ordered
//! list of candidate rewrites. Strategy order is correctness-relevant: the
//! first fetch to succeed wins and later strategies are never tried, so the
//! priorities here are visible, testable configuration.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::search::topic::extract_entities;

static PROPER_NOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*").expect("Invalid regex: PROPER_NOUN_RE")
});
static ACRONYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("Invalid regex: ACRONYM_RE"));
static SCIENTIFIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)acid|cell|molecule|protein|gene|theory|principle|law of|quantum|atomic")
        .expect("Invalid regex: SCIENTIFIC_RE")
});
static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bvs\.?\b|\bversus\b|difference between|\bcompare\b")
        .expect("Invalid regex: COMPARISON_RE")
});
static QUESTION_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(what is|who is|tell me about|define|search for|meaning of|information on|facts about)\s+")
        .expect("Invalid regex: QUESTION_PREFIX_RE")
});
static CREATIVE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(write|compose|create|make|generate)\s+(an?\s+)?(\d+\s+words?\s+)?(essay|story|poem|article|letter|email|paragraph)\s+(about|on|regarding|for)\s+")
        .expect("Invalid regex: CREATIVE_PREFIX_RE")
});
static WRITE_ABOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(write|compose|create)\s+(about|on)\s+").expect("Invalid regex: WRITE_ABOUT_RE")
});
static TWO_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\s+\w+\b").expect("Invalid regex: TWO_WORD_RE"));
static PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*?\)\s*").expect("Invalid regex: PARENS_RE"));
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("Invalid regex: QUOTED_RE"));

/// One candidate rewrite of the user query into a search term.
#[derive(Debug, Clone)]
pub struct SearchStrategy {
    pub label: &'static str,
    pub term: String,
    pub priority: f32,
}

/// Coarse classification of a query used to decide which strategies apply.
#[derive(Debug, Default)]
pub struct QueryAnalysis {
    pub has_proper_noun: bool,
    pub has_acronym: bool,
    pub has_numbers: bool,
    pub is_scientific: bool,
    pub is_comparison: bool,
}

pub fn analyze_query(query: &str) -> QueryAnalysis {
    QueryAnalysis {
        has_proper_noun: PROPER_NOUN_RE.is_match(query),
        has_acronym: ACRONYM_RE.is_match(query),
        has_numbers: query.chars().any(|c| c.is_ascii_digit()),
        is_scientific: SCIENTIFIC_RE.is_match(query),
        is_comparison: COMPARISON_RE.is_match(query),
    }
}

/// Singular/plural variants of the query, one word changed at a time.
fn expand_query(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let mut expansions = Vec::new();

    for (idx, word) in words.iter().enumerate() {
        if word.len() <= 3 {
            continue;
        }
        let variant = if let Some(stem) = word.strip_suffix('s') {
            stem.to_string()
        } else {
            format!("{}s", word)
        };
        let rebuilt: Vec<&str> = words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == idx { variant.as_str() } else { *w })
            .collect();
        let candidate = rebuilt.join(" ");
        if candidate != query {
            expansions.push(candidate);
        }
    }

    expansions
}

/// Build the deduplicated, priority-ordered strategy list, capped at `max`.
pub fn build_strategies(
    original_query: &str,
    analysis: &QueryAnalysis,
    max: usize,
) -> Vec<SearchStrategy> {
    let mut strategies = Vec::new();

    let mut clean_query = QUESTION_PREFIX_RE.replace(original_query, "").to_string();
    clean_query = CREATIVE_PREFIX_RE.replace(&clean_query, "").to_string();
    clean_query = WRITE_ABOUT_RE.replace(&clean_query, "").to_string();
    clean_query = clean_query.trim_end_matches('?').trim().to_string();

    if analysis.has_proper_noun {
        for m in PROPER_NOUN_RE.find_iter(original_query) {
            strategies.push(SearchStrategy {
                label: "Proper Noun Exact",
                term: m.as_str().to_string(),
                priority: 10.0,
            });
        }
    }

    if let Some(caps) = QUOTED_RE.captures(original_query) {
        strategies.push(SearchStrategy {
            label: "Quoted Term",
            term: caps[1].to_string(),
            priority: 9.5,
        });
    }

    if analysis.has_acronym {
        if let Some(m) = ACRONYM_RE.find(original_query) {
            strategies.push(SearchStrategy {
                label: "Acronym",
                term: m.as_str().to_string(),
                priority: 9.0,
            });
        }
    }

    strategies.push(SearchStrategy {
        label: "Cleaned Query",
        term: clean_query.clone(),
        priority: 8.0,
    });

    let entities = extract_entities(original_query);
    for keyword in entities.keywords.iter().take(2) {
        strategies.push(SearchStrategy {
            label: "Entity Keyword",
            term: keyword.clone(),
            priority: 7.0,
        });
    }

    if let Some(m) = TWO_WORD_RE.find(&clean_query) {
        strategies.push(SearchStrategy {
            label: "Two-word Phrase",
            term: m.as_str().to_string(),
            priority: 6.0,
        });
    }

    if clean_query != original_query {
        strategies.push(SearchStrategy {
            label: "Original Query",
            term: original_query.to_string(),
            priority: 5.0,
        });
    }

    for (idx, variant) in expand_query(&clean_query).into_iter().enumerate() {
        strategies.push(SearchStrategy {
            label: "Singular/Plural Variant",
            term: variant,
            priority: 4.0 - idx as f32 * 0.1,
        });
    }

    if clean_query.contains('(') {
        let without_parens = PARENS_RE.replace_all(&clean_query, " ").trim().to_string();
        strategies.push(SearchStrategy {
            label: "Without Parentheticals",
            term: without_parens,
            priority: 3.5,
        });
    }

    let words: Vec<&str> = clean_query.split_whitespace().collect();
    if words.len() > 2 {
        strategies.push(SearchStrategy {
            label: "First Word Only",
            term: words[0].to_string(),
            priority: 3.0,
        });
    }
    if words.len() > 1 {
        let last = words[words.len() - 1];
        if last.len() > 3 {
            strategies.push(SearchStrategy {
                label: "Last Word",
                term: last.to_string(),
                priority: 2.5,
            });
        }
    }

    for (idx, concept) in entities.concepts.iter().take(3).enumerate() {
        if concept.len() > 3 {
            strategies.push(SearchStrategy {
                label: "Concept Extraction",
                term: concept.clone(),
                priority: 2.0 - idx as f32 * 0.2,
            });
        }
    }

    prioritize(strategies, max)
}

/// Sort descending by priority, deduplicate by normalized term, cap.
fn prioritize(mut strategies: Vec<SearchStrategy>, max: usize) -> Vec<SearchStrategy> {
    strategies.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for strategy in strategies {
        let normalized = strategy.term.to_lowercase().trim().to_string();
        if normalized.len() > 1 && seen.insert(normalized) {
            unique.push(strategy);
        }
    }

    unique.truncate(max);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proper_noun_leads() {
        let query = "what is the Great Barrier Reef";
        let analysis = analyze_query(query);
        assert!(analysis.has_proper_noun);
        let strategies = build_strategies(query, &analysis, 8);
        assert_eq!(strategies[0].label, "Proper Noun Exact");
        assert_eq!(strategies[0].term, "Great Barrier Reef");
        assert_eq!(strategies[0].priority, 10.0);
    }

    #[test]
    fn test_quoted_term_outranks_cleaned_query() {
        let query = r#"look up "dark matter" research"#;
        let analysis = analyze_query(query);
        let strategies = build_strategies(query, &analysis, 8);
        let quoted_pos = strategies.iter().position(|s| s.label == "Quoted Term");
        let cleaned_pos = strategies.iter().position(|s| s.label == "Cleaned Query");
        assert!(quoted_pos.unwrap() < cleaned_pos.unwrap());
    }

    #[test]
    fn test_cleaned_query_strips_question_prefix() {
        let query = "what is photosynthesis";
        let strategies = build_strategies(query, &analyze_query(query), 8);
        assert!(strategies
            .iter()
            .any(|s| s.label == "Cleaned Query" && s.term == "photosynthesis"));
    }

    #[test]
    fn test_deduplication_is_case_insensitive() {
        let query = "Amazon amazon";
        let strategies = build_strategies(query, &analyze_query(query), 8);
        let amazon_count = strategies
            .iter()
            .filter(|s| s.term.to_lowercase() == "amazon")
            .count();
        assert_eq!(amazon_count, 1);
    }

    #[test]
    fn test_strategy_cap() {
        let query = "what is the relationship between Ocean Currents and Global Weather patterns overall";
        let strategies = build_strategies(query, &analyze_query(query), 8);
        assert!(strategies.len() <= 8);
    }

    #[test]
    fn test_priorities_descend() {
        let query = "tell me about Marie Curie discoveries";
        let strategies = build_strategies(query, &analyze_query(query), 8);
        for pair in strategies.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn test_acronym_strategy() {
        let query = "what does NASA do";
        let analysis = analyze_query(query);
        assert!(analysis.has_acronym);
        let strategies = build_strategies(query, &analysis, 8);
        assert!(strategies
            .iter()
            .any(|s| s.label == "Acronym" && s.term == "NASA"));
    }

    #[test]
    fn test_expand_query_variants() {
        let variants = expand_query("ocean current");
        assert!(variants.contains(&"oceans current".to_string()));
        assert!(variants.contains(&"ocean currents".to_string()));
    }
}
