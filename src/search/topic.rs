//! Topic and entity extraction.
//!
//! Shared by the context tracker (pronoun resolution fallback) and the
//! search orchestrator (strategy building).

use regex::Regex;
use std::sync::LazyLock;

use crate::text::STOPWORDS;

static GOLDEN_CREATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(write|create|make|generate).*(essay|story|article|poem)\s+(on|about|regarding|titled)\s+(.+)",
    )
    .expect("Invalid regex: GOLDEN_CREATIVE_RE")
});
static GOVERNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(structure|organization|system|form)\s+of\s+(?:the\s+)?(.+?\s+(government|parliament|administration|council|regime))",
    )
    .expect("Invalid regex: GOVERNMENT_RE")
});
static PROPER_GOVERNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+(government|parliament|administration|congress|senate)")
        .expect("Invalid regex: PROPER_GOVERNMENT_RE")
});
static LEADERSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(prime minister|president|leader|king|queen|ruler)\s+of\s+(?:the\s+)?([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    )
    .expect("Invalid regex: LEADERSHIP_RE")
});
static TELL_ME_ABOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)tell\s+me\s+about\s+(.+)").expect("Invalid regex: TELL_ME_ABOUT_RE")
});
static WHAT_IS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)what\s+(?:is|are|was|were)\s+(?:an|a|the)?\s*(.+)")
        .expect("Invalid regex: WHAT_IS_RE")
});
static WHO_IS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)who\s+(?:is|are|was|were)\s+(.+)").expect("Invalid regex: WHO_IS_RE")
});
static EXPLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:explain|describe|define)\s+(.+)").expect("Invalid regex: EXPLAIN_RE")
});
static FACTS_ABOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:facts about|information on|details about)\s+(.+)")
        .expect("Invalid regex: FACTS_ABOUT_RE")
});
static PROPER_NOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*").expect("Invalid regex: PROPER_NOUN_RE")
});
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("Invalid regex: QUOTED_RE"));
static MULTIWORD_PROPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b").expect("Invalid regex: MULTIWORD_PROPER_RE")
});
static SINGLE_PROPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\b").expect("Invalid regex: SINGLE_PROPER_RE"));

/// Command prefixes stripped when no question pattern matched, longest first.
const COMMAND_PREFIXES: &[&str] = &[
    "give me information about",
    "give me info on",
    "tell me about",
    "search for",
    "write an",
    "write a",
    "look up",
    "tell me",
    "describe",
    "compose",
    "generate",
    "what is",
    "explain",
    "who is",
    "define",
    "create",
    "write",
    "draft",
    "make",
    "find",
];

const FORMAT_WORDS: &[&str] = &[
    "essay", "story", "poem", "article", "paragraph", "summary", "overview", "biography",
    "letter", "email", "script",
];

const COMMON_ENTITY_WORDS: &[&str] = &[
    "structure", "system", "type", "kind", "form", "way", "thing", "part", "piece", "what",
    "how", "why", "when", "where", "who", "which", "that", "this", "these", "those", "about",
    "from", "with", "into", "through", "during", "before", "after",
];

fn strip_trailing_punctuation(s: &str) -> String {
    s.trim_end_matches(['?', '.', '!']).trim().to_string()
}

/// Longest capitalized word sequence in the text, if any.
fn longest_proper_noun(query: &str) -> Option<String> {
    PROPER_NOUN_RE
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .max_by_key(|s| s.len())
}

/// Pull the subject of a query out of its surrounding phrasing.
///
/// Tries specific question and command patterns first, then falls back to
/// stripping command prefixes and format words, then to the longest proper
/// noun sequence.
pub fn extract_topic(query: &str) -> Option<String> {
    // Explicit creative requests name their topic directly
    if let Some(caps) = GOLDEN_CREATIVE_RE.captures(query) {
        let extracted = strip_trailing_punctuation(caps.get(4).map_or("", |m| m.as_str()));
        if !extracted.is_empty() && extracted.len() < 100 {
            return Some(extracted);
        }
    }

    if let Some(caps) = GOVERNMENT_RE.captures(query) {
        return Some(strip_trailing_punctuation(&caps[2]));
    }
    if let Some(caps) = PROPER_GOVERNMENT_RE.captures(query) {
        return Some(format!("{} {}", &caps[1], &caps[2]));
    }
    if let Some(caps) = LEADERSHIP_RE.captures(query) {
        return Some(strip_trailing_punctuation(&caps[2]));
    }

    let clean = query.to_lowercase().trim().to_string();
    for pattern in [
        &*TELL_ME_ABOUT_RE,
        &*WHAT_IS_RE,
        &*WHO_IS_RE,
        &*EXPLAIN_RE,
        &*FACTS_ABOUT_RE,
    ] {
        if let Some(caps) = pattern.captures(&clean) {
            let topic = strip_trailing_punctuation(&caps[1]);
            if !topic.is_empty() {
                return Some(topic);
            }
        }
    }

    // No question pattern: peel away command phrasing and format words
    let mut topic = clean;
    for prefix in [
        "please ", "could you ", "can you ", "would you ", "i want you to ", "i'd like you to ",
        "hey ", "hi ", "hello ",
    ] {
        if let Some(rest) = topic.strip_prefix(prefix) {
            topic = rest.to_string();
        }
    }
    for cmd in COMMAND_PREFIXES {
        if let Some(rest) = topic.strip_prefix(cmd) {
            topic = rest.trim().to_string();
            break;
        }
    }
    let words: Vec<&str> = topic
        .split_whitespace()
        .filter(|w| !FORMAT_WORDS.contains(&strip_trailing_punctuation(w).as_str()))
        .collect();
    topic = words.join(" ");
    for adjective in ["short ", "long ", "detailed ", "brief ", "quick "] {
        if let Some(rest) = topic.strip_prefix(adjective) {
            topic = rest.to_string();
        }
    }
    for preposition in [
        "about ", "on ", "regarding ", "concerning ", "covering ", "dealing with ", "for ",
    ] {
        if let Some(rest) = topic.strip_prefix(preposition) {
            topic = rest.to_string();
            break;
        }
    }
    topic = strip_trailing_punctuation(&topic);
    if let Some(rest) = topic.strip_prefix("the topic of ") {
        topic = rest.to_string();
    }

    if topic.len() >= 2 && !FORMAT_WORDS.contains(&topic.as_str()) {
        return Some(topic);
    }

    longest_proper_noun(query)
}

/// Entities pulled from a query for strategy building.
#[derive(Debug, Default)]
pub struct Entities {
    pub keywords: Vec<String>,
    pub concepts: Vec<String>,
}

/// Capitalized phrases first, then quoted phrases, then meaningful plain
/// words when nothing better surfaced.
pub fn extract_entities(text: &str) -> Entities {
    let mut entities = Entities::default();

    let multiword: Vec<String> = MULTIWORD_PROPER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    for phrase in &multiword {
        entities.keywords.push(phrase.clone());
        entities.concepts.push(phrase.clone());
    }

    for m in SINGLE_PROPER_RE.find_iter(text) {
        let word = m.as_str();
        let in_multiword = multiword.iter().any(|phrase| phrase.contains(word));
        if !in_multiword && !COMMON_ENTITY_WORDS.contains(&word.to_lowercase().as_str()) {
            entities.keywords.push(word.to_string());
        }
    }

    for caps in QUOTED_RE.captures_iter(text) {
        entities.concepts.push(caps[1].to_string());
    }

    if entities.concepts.is_empty() {
        let meaningful: Vec<String> = text
            .to_lowercase()
            .split_whitespace()
            .filter(|w| {
                w.len() > 3 && !STOPWORDS.contains(w) && !COMMON_ENTITY_WORDS.contains(w)
            })
            .take(5)
            .map(|w| w.to_string())
            .collect();
        entities.concepts.extend(meaningful);
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tell_me_about() {
        assert_eq!(
            extract_topic("tell me about the Roman Empire").as_deref(),
            Some("the roman empire")
        );
    }

    #[test]
    fn test_what_is() {
        assert_eq!(
            extract_topic("What is a black hole?").as_deref(),
            Some("black hole")
        );
    }

    #[test]
    fn test_leadership_pattern() {
        assert_eq!(
            extract_topic("who is the prime minister of New Zealand").as_deref(),
            Some("New Zealand")
        );
    }

    #[test]
    fn test_government_pattern() {
        let topic = extract_topic("what is the structure of the Greenland government");
        assert_eq!(topic.as_deref(), Some("Greenland government"));
    }

    #[test]
    fn test_creative_golden_extraction() {
        assert_eq!(
            extract_topic("write an essay on lady macbeth").as_deref(),
            Some("lady macbeth")
        );
    }

    #[test]
    fn test_command_stripping() {
        assert_eq!(
            extract_topic("search for quantum computing").as_deref(),
            Some("quantum computing")
        );
    }

    #[test]
    fn test_proper_noun_fallback() {
        let topic = extract_topic("x Amelia Earhart x");
        assert_eq!(topic.as_deref(), Some("x amelia earhart x"));
    }

    #[test]
    fn test_entities_prefer_multiword_proper_nouns() {
        let entities = extract_entities("the history of New South Wales in Australia");
        assert!(entities.keywords.contains(&"New South Wales".to_string()));
        assert!(entities.keywords.contains(&"Australia".to_string()));
    }

    #[test]
    fn test_entities_quoted_phrases() {
        let entities = extract_entities(r#"look up "general relativity" for me"#);
        assert!(entities.concepts.contains(&"general relativity".to_string()));
    }

    #[test]
    fn test_entities_meaningful_fallback() {
        let entities = extract_entities("erosion shapes coastal cliffs");
        assert!(entities.concepts.contains(&"erosion".to_string()));
    }
}
