//! Lexical utilities shared by every pipeline stage.
//!
//! Tokenization, input sanitization, query preprocessing (typo and
//! abbreviation normalization), proper-noun capitalization, sentence
//! splitting, and extractive summarization. All functions here are pure.

use std::sync::LazyLock;

/// Stopwords stripped during keyword extraction and search fallbacks.
pub const STOPWORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "and", "or", "but", "in", "with", "to", "for",
    "of", "as", "by", "about", "what", "who", "how", "why", "when", "where", "that", "this",
];

static TYPO_MAP: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        ("whtats", "what is"),
        ("whts", "what is"),
        ("whst", "what is"),
        ("waht", "what"),
        ("wat", "what"),
        ("wht", "what"),
        ("wha", "what"),
        ("dos", "does"),
        ("thnks", "thanks"),
        ("thx", "thanks"),
        ("tnx", "thanks"),
        ("hwo", "how"),
        ("hw", "how"),
        ("becuase", "because"),
        ("becasue", "because"),
        ("cuz", "because"),
        ("cos", "because"),
        ("rlly", "really"),
        ("rly", "really"),
        ("pls", "please"),
        ("plz", "please"),
        ("srry", "sorry"),
        ("sry", "sorry"),
        ("dont", "don't"),
        ("cant", "can't"),
        ("wont", "won't"),
        ("im", "i'm"),
        ("iam", "i am"),
        ("ur", "your"),
        ("ure", "you're"),
        ("whats", "what is"),
        ("what's", "what is"),
    ]
});

static ABBREVIATIONS: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        ("ai", "artificial intelligence"),
        ("ml", "machine learning"),
        ("who's", "who is"),
        ("whos", "who is"),
        ("how's", "how is"),
        ("hows", "how is"),
        ("info", "information"),
        ("pic", "picture"),
        ("vid", "video"),
        ("btw", "by the way"),
        ("fyi", "for your information"),
        ("aka", "also known as"),
        ("etc", "and so on"),
    ]
});

/// Known proper nouns restored to their conventional casing.
static PROPER_NOUNS: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        ("shakespeare", "Shakespeare"),
        ("newton", "Newton"),
        ("einstein", "Einstein"),
        ("darwin", "Darwin"),
        ("galileo", "Galileo"),
        ("tesla", "Tesla"),
        ("mozart", "Mozart"),
        ("beethoven", "Beethoven"),
        ("da vinci", "Da Vinci"),
        ("picasso", "Picasso"),
        ("michelangelo", "Michelangelo"),
        ("plato", "Plato"),
        ("aristotle", "Aristotle"),
        ("socrates", "Socrates"),
        ("napoleon", "Napoleon"),
        ("caesar", "Caesar"),
        ("cleopatra", "Cleopatra"),
        ("australia", "Australia"),
        ("america", "America"),
        ("england", "England"),
        ("france", "France"),
        ("germany", "Germany"),
        ("italy", "Italy"),
        ("spain", "Spain"),
        ("china", "China"),
        ("japan", "Japan"),
        ("paris", "Paris"),
        ("london", "London"),
        ("rome", "Rome"),
        ("new york", "New York"),
        ("los angeles", "Los Angeles"),
        ("world war", "World War"),
        ("the renaissance", "The Renaissance"),
    ]
});

/// Lowercase, strip everything outside letters/digits/whitespace, split on
/// whitespace, drop tokens of length <= 2.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

/// Strip emoji and symbol codepoints, then trim. An empty result means the
/// input carried no usable text.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| {
            let cp = *c as u32;
            // Emoji, pictograph, transport, and flag blocks
            !((0x1F300..=0x1F6FF).contains(&cp)
                || (0x1F900..=0x1F9FF).contains(&cp)
                || (0x1F1E0..=0x1F1FF).contains(&cp)
                || (0x2600..=0x27BF).contains(&cp))
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lowercase the query, fix common typos, and expand abbreviations.
pub fn preprocess(query: &str) -> String {
    let cleaned = query.to_lowercase().trim().to_string();

    let corrected = cleaned
        .split_whitespace()
        .map(|w| {
            TYPO_MAP
                .iter()
                .find(|(typo, _)| *typo == w)
                .map(|(_, fix)| *fix)
                .unwrap_or(w)
        })
        .collect::<Vec<_>>()
        .join(" ");

    corrected
        .split_whitespace()
        .map(|w| {
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == w)
                .map(|(_, full)| *full)
                .unwrap_or(w)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Restore conventional casing for known names, then capitalize the
/// remaining non-stopword words.
pub fn capitalize_proper_nouns(topic: &str) -> String {
    let mut result = topic.to_string();

    for (incorrect, correct) in PROPER_NOUNS.iter() {
        let lower = result.to_lowercase();
        if let Some(pos) = lower.find(incorrect) {
            // Whole-word match only
            let before_ok = pos == 0
                || !lower.as_bytes()[pos - 1].is_ascii_alphanumeric();
            let end = pos + incorrect.len();
            let after_ok = end == lower.len()
                || !lower.as_bytes()[end].is_ascii_alphanumeric();
            if before_ok && after_ok {
                result.replace_range(pos..end, correct);
            }
        }
    }

    result
        .split(' ')
        .enumerate()
        .map(|(idx, word)| {
            let keep_lower = word.len() <= 2
                || matches!(
                    word.to_lowercase().as_str(),
                    "the" | "a" | "an" | "of" | "in" | "on" | "at" | "to" | "for" | "and" | "or"
                        | "but"
                );
            if idx == 0 || !keep_lower {
                capitalize_first(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Stopword-stripped tokens, first 3 kept.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
        .take(3)
        .map(|w| w.to_string())
        .collect()
}

/// Split text on sentence-ending punctuation, keeping sentences longer than
/// `min_len` characters.
pub fn split_sentences(text: &str, min_len: usize) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| s.len() > min_len)
        .map(|s| s.to_string())
        .collect()
}

/// Extractive summary: first sentence, evenly-spaced middle picks, last
/// sentence. Short texts are returned as-is.
pub fn summarize(text: &str) -> String {
    let sentences = split_sentences(text, 20);

    if sentences.len() <= 3 {
        return format!("That's already quite concise: {}", text);
    }

    let mut summary = vec![sentences[0].clone()];

    if sentences.len() > 10 {
        let step = (sentences.len() - 2) / 3;
        for i in 1..=3 {
            let idx = 1 + step * i;
            if let Some(s) = sentences.get(idx) {
                summary.push(s.clone());
            }
        }
    } else {
        let mid = sentences.len() / 2;
        summary.push(sentences[mid].clone());
    }

    summary.push(sentences[sentences.len() - 1].clone());

    let mut joined = summary.join(". ");
    if !joined.ends_with('.') {
        joined.push('.');
    }
    joined
}
