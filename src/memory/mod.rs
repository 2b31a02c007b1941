//! # Memory Module
//!
//! The local knowledge side of the pipeline.
//!
//! ## Components
//! - `store`: fact records, memory entries, glossary table, document-frequency index
//! - `relevance`: IDF-weighted coverage scoring with critical-term penalty
//! - `synthesis`: weak-match clustering and partial-knowledge synthesis

pub mod relevance;
pub mod store;
pub mod synthesis;

pub use relevance::ScoredEntry;
pub use store::{EntryKind, FactRecord, GlossaryEntry, KnowledgeStore, MemoryEntry};
