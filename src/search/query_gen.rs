//! Intelligent search-term generation.
//!
//! A priority-ordered chain of specialized extractors turns a natural
//! language query into the single best external search term, or a pair of
//! terms for comparison queries. Each extractor runs only when its
//! triggering keywords are present; the first non-empty result wins.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::search::topic::extract_topic;
use crate::text::STOPWORDS;

static EXPLICIT_SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:search for|look up|find info on)\s+(.+)")
        .expect("Invalid regex: EXPLICIT_SEARCH_RE")
});
static COMPARISON_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)difference between|\bvs\.?\b|\bversus\b|\bcompare\b")
        .expect("Invalid regex: COMPARISON_TRIGGER_RE")
});
static COMPARISON_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:difference\s+between|compare)\s+(.+?)\s+(?:and|vs\.?|versus)\s+(.+)")
        .expect("Invalid regex: COMPARISON_SPLIT_RE")
});
static VS_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+?)\s+(?:vs\.?|versus)\s+(.+)").expect("Invalid regex: VS_SPLIT_RE")
});
static GOVERNMENT_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)government|parliament|administration|politics|political")
        .expect("Invalid regex: GOVERNMENT_TRIGGER_RE")
});
static GOVERNMENT_SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:structure|organization|system|form|composition)\s+of\s+(?:the\s+)?(.+?\s+(?:government|parliament))",
    )
    .expect("Invalid regex: GOVERNMENT_SUBJECT_RE")
});
static PERSON_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)who is|prime minister|president|leader|ceo|founder|created by")
        .expect("Invalid regex: PERSON_TRIGGER_RE")
});
static LEADERSHIP_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:prime minister|president|leader|king|queen|ruler)\s+of\s+(?:the\s+)?([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    )
    .expect("Invalid regex: LEADERSHIP_OF_RE")
});
static WHO_IS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)who\s+(?:is|was|are|were)\s+(?:the\s+)?(.+)").expect("Invalid regex: WHO_IS_RE")
});
static DEFINITION_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)what is|what are|what's|define|definition|meaning")
        .expect("Invalid regex: DEFINITION_TRIGGER_RE")
});
static DEFINITION_SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)what\s+(?:is|are|was|were)\s+(?:an|a|the)?\s*(.+?)(?:\?|$)")
        .expect("Invalid regex: DEFINITION_SUBJECT_RE")
});
static DEFINITION_FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(used for|good for|known for|made of|composed of)\b.*")
        .expect("Invalid regex: DEFINITION_FILLER_RE")
});
static HOW_WORKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)how\s+(?:does|do)\s+(?:an|a|the)?\s*(.+?)\s+work")
        .expect("Invalid regex: HOW_WORKS_RE")
});
static HISTORICAL_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)history|historical|ancient|origin|founded|established")
        .expect("Invalid regex: HISTORICAL_TRIGGER_RE")
});
static HISTORY_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:history|origin)\s+of\s+(?:the\s+)?(.+)").expect("Invalid regex: HISTORY_OF_RE")
});
static PROPER_NOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*").expect("Invalid regex: PROPER_NOUN_RE")
});

/// Sentence-starter words never treated as extracted entities on their own.
const STARTER_WORDS: &[&str] = &[
    "What", "Who", "Where", "When", "Why", "How", "Tell", "Write", "Please",
];

/// The generated search term(s) for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTerms {
    Single(String),
    Pair(String, String),
}

fn strip_question_mark(s: &str) -> String {
    s.trim_end_matches('?').trim().to_string()
}

/// Run the extractor chain. Always produces something; the final fallback
/// is the stopword-stripped query itself.
pub fn generate_search_terms(query: &str) -> SearchTerms {
    let q = query.to_lowercase();

    if let Some(caps) = EXPLICIT_SEARCH_RE.captures(query) {
        return SearchTerms::Single(strip_question_mark(&caps[1]));
    }

    if COMPARISON_TRIGGER_RE.is_match(&q) {
        if let Some(caps) = COMPARISON_SPLIT_RE.captures(query) {
            let first = strip_question_mark(&caps[1]);
            let second = strip_question_mark(&caps[2]);
            debug!(%first, %second, "Comparison query detected");
            return SearchTerms::Pair(first, second);
        }
        if let Some(caps) = VS_SPLIT_RE.captures(query) {
            let first = strip_question_mark(caps[1].trim_start_matches("what is ").trim());
            let second = strip_question_mark(&caps[2]);
            if !first.is_empty() && !second.is_empty() {
                return SearchTerms::Pair(first, second);
            }
        }
    }

    if GOVERNMENT_TRIGGER_RE.is_match(&q) {
        if let Some(caps) = GOVERNMENT_SUBJECT_RE.captures(query) {
            return SearchTerms::Single(strip_question_mark(&caps[1]));
        }
    }

    if PERSON_TRIGGER_RE.is_match(&q) {
        if let Some(caps) = LEADERSHIP_OF_RE.captures(query) {
            return SearchTerms::Single(caps[1].trim().to_string());
        }
        if let Some(caps) = WHO_IS_RE.captures(query) {
            return SearchTerms::Single(strip_question_mark(&caps[1]));
        }
    }

    if DEFINITION_TRIGGER_RE.is_match(&q) {
        if let Some(caps) = DEFINITION_SUBJECT_RE.captures(query) {
            let subject = DEFINITION_FILLER_RE.replace(&caps[1], "").trim().to_string();
            if !subject.is_empty() {
                return SearchTerms::Single(subject);
            }
        }
    }

    if let Some(caps) = HOW_WORKS_RE.captures(query) {
        return SearchTerms::Single(caps[1].trim().to_string());
    }

    if HISTORICAL_TRIGGER_RE.is_match(&q) {
        if let Some(caps) = HISTORY_OF_RE.captures(query) {
            return SearchTerms::Single(format!(
                "History of {}",
                strip_question_mark(&caps[1])
            ));
        }
    }

    // Capitalized words mid-sentence usually name the topic; prefer the
    // longest multi-word phrase.
    let mut proper_nouns: Vec<String> = PROPER_NOUN_RE
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .filter(|n| !STARTER_WORDS.contains(&n.as_str()))
        .collect();
    if !proper_nouns.is_empty() {
        proper_nouns.sort_by(|a, b| b.split(' ').count().cmp(&a.split(' ').count()));
        debug!(entity = %proper_nouns[0], "Extracted proper noun for search");
        return SearchTerms::Single(proper_nouns[0].clone());
    }

    if let Some(topic) = extract_topic(query) {
        return SearchTerms::Single(topic);
    }

    let meaningful: Vec<&str> = q
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
        .collect();
    SearchTerms::Single(meaningful.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_search() {
        assert_eq!(
            generate_search_terms("search for the Eiffel Tower"),
            SearchTerms::Single("the Eiffel Tower".to_string())
        );
    }

    #[test]
    fn test_comparison_produces_pair() {
        assert_eq!(
            generate_search_terms("difference between Mercury and Venus"),
            SearchTerms::Pair("Mercury".to_string(), "Venus".to_string())
        );
    }

    #[test]
    fn test_vs_produces_pair() {
        assert_eq!(
            generate_search_terms("Python vs Ruby"),
            SearchTerms::Pair("Python".to_string(), "Ruby".to_string())
        );
    }

    #[test]
    fn test_leadership_extracts_country() {
        assert_eq!(
            generate_search_terms("who is the president of France"),
            SearchTerms::Single("France".to_string())
        );
    }

    #[test]
    fn test_definition_extracts_subject() {
        assert_eq!(
            generate_search_terms("what is a supernova?"),
            SearchTerms::Single("supernova".to_string())
        );
    }

    #[test]
    fn test_how_it_works() {
        assert_eq!(
            generate_search_terms("how does a jet engine work"),
            SearchTerms::Single("jet engine".to_string())
        );
    }

    #[test]
    fn test_history_of() {
        assert_eq!(
            generate_search_terms("history of the internet"),
            SearchTerms::Single("History of the internet".to_string())
        );
    }

    #[test]
    fn test_longest_proper_noun_preferred() {
        assert_eq!(
            generate_search_terms("When did the Battle of Hastings happen"),
            SearchTerms::Single("Battle".to_string())
        );
    }

    #[test]
    fn test_stopword_fallback() {
        assert_eq!(
            generate_search_terms("weird unmatched mumbling here"),
            SearchTerms::Single("weird unmatched mumbling here".to_string())
        );
    }
}
