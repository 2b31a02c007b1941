//! Pipeline Tests
//!
//! End-to-end dispatch behavior: local memory precedence, search routing,
//! utility short-circuits, context carry-over, and error containment.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::context::SessionState;
use crate::engine::ResponseEngine;
use crate::error::Result;
use crate::feedback::FeedbackKind;
use crate::memory::store::{EntryKind, FactRecord};
use crate::models::ResponseCategory;
use crate::search::wiki::KnowledgeFetcher;

/// Scripted fetcher with per-term answers and a call counter.
struct ScriptedFetcher {
    answers: Vec<(String, String)>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(t, a)| (t.to_string(), a.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn empty() -> Self {
        Self::new(&[])
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeFetcher for ScriptedFetcher {
    async fn fetch(&self, term: &str, _long_form: bool) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .answers
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(term))
            .map(|(_, a)| a.clone()))
    }
}

fn knowledge(question: &str, answer: &str) -> FactRecord {
    FactRecord::Memory {
        question: question.to_string(),
        answer: answer.to_string(),
        kind: EntryKind::Knowledge,
    }
}

/// A store large enough that the engine trusts local memory over search.
fn seeded_records() -> Vec<FactRecord> {
    let mut records: Vec<FactRecord> = (0..60)
        .map(|i| {
            knowledge(
                "",
                &format!("Filler fact number {} about nothing in particular at all.", i),
            )
        })
        .collect();
    records.push(knowledge(
        "",
        "Photosynthesis converts light into chemical energy inside plant cells.",
    ));
    records.push(FactRecord::Glossary {
        word: "Ephemeral".to_string(),
        part_of_speech: "adjective".to_string(),
        definition: "Lasting for a very short time.".to_string(),
    });
    records
}

fn engine_with(records: Vec<FactRecord>, fetcher: Arc<ScriptedFetcher>) -> ResponseEngine {
    ResponseEngine::new(records, fetcher, EngineConfig::default())
}

#[tokio::test]
async fn test_empty_input_short_circuits() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("\u{1F600}\u{1F680}", &mut session).await;
    assert!(response.text.contains("couldn't understand"));
    assert_eq!(fetcher.call_count(), 0);
    // Input errors are not recorded as turns
    assert_eq!(session.history_len(), 0);
}

#[tokio::test]
async fn test_local_memory_answers_without_search() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("photosynthesis", &mut session).await;
    assert!(response.text.contains("converts light into chemical energy"));
    assert_eq!(response.category, ResponseCategory::Factual);
    assert_eq!(
        response.sources,
        vec!["Local Memory (Verified)".to_string()]
    );
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_search_query_routes_to_wikipedia() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "Saturn",
        "Saturn is the sixth planet from the Sun and is famous for its rings.",
    )]));
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("what is Saturn", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Search);
    assert!(response.text.contains("sixth planet"));
    assert_eq!(response.sources, vec!["Wikipedia".to_string()]);
}

#[tokio::test]
async fn test_utility_path_skips_retrieval_and_search() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("spell banana backwards", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Spell);
    assert!(response.text.contains("\"ananab\""));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_math_path_uses_calculator() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("what is 12 * 12", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Calc);
    assert!(response.text.contains("144"));
    assert_eq!(response.sources, vec!["Calculator".to_string()]);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_greeting_is_conversational() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("hello there", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Conversational);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_comparison_produces_labeled_sections() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        ("Mercury", "Mercury is the smallest planet in the Solar System."),
        ("Venus", "Venus is the second planet from the Sun and very hot."),
    ]));
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine
        .respond("difference between Mercury and Venus", &mut session)
        .await;
    assert_eq!(response.category, ResponseCategory::Comparison);
    let mercury = response.text.find("**Mercury:**").expect("Mercury section");
    let venus = response.text.find("**Venus:**").expect("Venus section");
    assert!(mercury < venus);
}

#[tokio::test]
async fn test_definition_prefers_glossary() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("define ephemeral", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Definition);
    assert!(response.text.contains("Lasting for a very short time."));
    assert_eq!(response.sources, vec!["Dictionary".to_string()]);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_pronoun_resolution_carries_topic() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "Saturn",
        "Saturn is the sixth planet from the Sun and is famous for its rings.",
    )]));
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    engine.respond("what is Saturn", &mut session).await;
    assert_eq!(session.last_topic.as_deref(), Some("saturn"));

    // "tell me more" resolves against the tracked topic and searches again
    let response = engine.respond("tell me more", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Search);
    assert!(response.text.contains("Saturn"));
}

#[tokio::test]
async fn test_all_strategies_fail_falls_back_conversationally() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine
        .respond("what is a glorp zixter", &mut session)
        .await;
    assert_eq!(response.category, ResponseCategory::Fallback);
    assert_eq!(
        response.sources,
        vec!["General Knowledge Engine".to_string()]
    );
    // Strategies were attempted before giving up
    assert!(fetcher.call_count() > 0);
}

#[tokio::test]
async fn test_response_cache_serves_repeat_queries() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "Saturn",
        "Saturn is the sixth planet from the Sun and is famous for its rings.",
    )]));
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let first = engine.respond("what is Saturn", &mut session).await;
    let calls_after_first = fetcher.call_count();
    let second = engine.respond("what is Saturn", &mut session).await;

    assert_eq!(first.text, second.text);
    assert_eq!(fetcher.call_count(), calls_after_first);
}

#[tokio::test]
async fn test_brainstorm_hands_off_topic() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine
        .respond("brainstorm ideas for a garden party", &mut session)
        .await;
    assert_eq!(response.category, ResponseCategory::Brainstorm);
    assert!(response.text.contains("garden party"));
}

#[tokio::test]
async fn test_summarize_uses_previous_output() {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "Saturn",
        "Saturn is the sixth planet from the Sun in our own Solar System. \
         The planet is best known for its spectacular icy ring system today. \
         Its atmosphere is mostly hydrogen mixed with a little bit of helium. \
         Dozens of moons orbit the planet including the large moon Titan. \
         Astronomers have studied the planet closely since Galileo's first look.",
    )]));
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    engine.respond("what is Saturn", &mut session).await;
    let response = engine.respond("summarize that", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Summary);
    assert!(response.text.starts_with("Here is a summary:"));
}

#[tokio::test]
async fn test_meta_query_identity() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    let response = engine.respond("who are you", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Meta);
    assert_eq!(response.sources, vec!["Identity Core".to_string()]);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_feedback_tunes_session_temperature() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());
    let starting = session.temperature;

    let long_response = "This is a deliberately long sentence stretched out with many \
                         extra words so that the average sentence length lands well above \
                         the twenty word tuning threshold used by the engine.";
    for _ in 0..6 {
        engine.process_feedback(
            &mut session,
            "query",
            long_response,
            FeedbackKind::Good,
            None,
            None,
        );
    }

    assert!(session.temperature > starting);
    assert!(session.temperature <= 0.9);
}

#[tokio::test]
async fn test_category_recorded_for_next_turn() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    let mut session = SessionState::new(&EngineConfig::default());

    engine.respond("roll a dice", &mut session).await;
    assert_eq!(session.last_response_category, Some(ResponseCategory::Dice));

    // "roll again" only makes sense through the recorded category
    let response = engine.respond("roll again", &mut session).await;
    assert_eq!(response.category, ResponseCategory::Dice);
}

#[tokio::test]
async fn test_reload_replaces_store() {
    let fetcher = Arc::new(ScriptedFetcher::empty());
    let mut engine = engine_with(seeded_records(), fetcher.clone());
    assert!(engine.store().len() > 50);

    engine.reload(vec![knowledge("", "A single lonely fact about nothing.")]);
    assert_eq!(engine.store().len(), 1);
    assert!(engine.store().lookup_word("ephemeral").is_none());
}
