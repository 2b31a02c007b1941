//! Fact store and document-frequency index.
//!
//! Loaded once from an ordered sequence of raw fact records; the entries,
//! the glossary table, and the document-frequency index are all read-only
//! for the lifetime of the session. Re-loading fully replaces all three.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::text::tokenize;

/// Tag distinguishing small-talk entries from knowledge entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Conversational,
    Knowledge,
}

/// One raw record handed to the store at load time.
///
/// Either a question/answer memory item or a glossary-style word definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactRecord {
    Glossary {
        word: String,
        #[serde(default)]
        part_of_speech: String,
        definition: String,
    },
    Memory {
        #[serde(default)]
        question: String,
        answer: String,
        #[serde(default)]
        kind: EntryKind,
    },
}

/// One fact unit. Created once at load; immutable thereafter.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    /// Original phrasing, may be empty for bare knowledge entries.
    pub question: String,
    pub answer: String,
    /// Ordered normalized terms, duplicates allowed.
    pub tokens: Vec<String>,
    /// Deduplicated terms for O(1) membership tests.
    pub token_set: HashSet<String>,
    pub kind: EntryKind,
}

/// A glossary word with its definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub word: String,
    pub part_of_speech: String,
    pub definition: String,
}

/// The memory-entry collection, the word-lookup table, and the
/// document-frequency index built over the entries.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    entries: Vec<MemoryEntry>,
    glossary: HashMap<String, GlossaryEntry>,
    df: HashMap<String, usize>,
    total_documents: usize,
}

impl KnowledgeStore {
    /// Build the store from raw records. Question text is tokenized when
    /// present, otherwise the answer text is.
    pub fn load(records: Vec<FactRecord>) -> Self {
        info!(record_count = records.len(), "Loading memory bank");

        let mut entries = Vec::new();
        let mut glossary = HashMap::new();

        for record in records {
            match record {
                FactRecord::Glossary {
                    word,
                    part_of_speech,
                    definition,
                } => {
                    glossary.insert(
                        word.to_lowercase(),
                        GlossaryEntry {
                            word,
                            part_of_speech,
                            definition,
                        },
                    );
                }
                FactRecord::Memory {
                    question,
                    answer,
                    kind,
                } => {
                    let source = if question.is_empty() { &answer } else { &question };
                    let tokens = tokenize(source);
                    let token_set: HashSet<String> = tokens.iter().cloned().collect();
                    entries.push(MemoryEntry {
                        question,
                        answer,
                        tokens,
                        token_set,
                        kind,
                    });
                }
            }
        }

        // Distinct tokens count once per document.
        let mut df: HashMap<String, usize> = HashMap::new();
        for entry in &entries {
            for token in &entry.token_set {
                *df.entry(token.clone()).or_insert(0) += 1;
            }
        }

        let total_documents = entries.len();
        info!(
            documents = total_documents,
            glossary_words = glossary.len(),
            vocabulary = df.len(),
            "Memory bank ready"
        );

        Self {
            entries,
            glossary,
            df,
            total_documents,
        }
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Document frequency for a token; absent tokens yield 0.
    pub fn df(&self, token: &str) -> usize {
        self.df.get(token).copied().unwrap_or(0)
    }

    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Case-insensitive glossary lookup.
    pub fn lookup_word(&self, word: &str) -> Option<&GlossaryEntry> {
        self.glossary.get(&word.to_lowercase())
    }
}
