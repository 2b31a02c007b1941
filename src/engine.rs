//! Per-turn dispatch pipeline.
//!
//! One query in, one `EngineResponse` out: resolve context, classify
//! intent, then walk the dispatch tiers (utility, conversation, math,
//! local memory, external search, synthesis, fallback) until one answers.
//! Unexpected internal errors are caught at this boundary and turned into
//! a single generic apology; no raw error ever reaches the consumer.

use chrono::{Local, Timelike};
use lru::LruCache;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

use crate::calc::{calculate, is_math_query};
use crate::config::EngineConfig;
use crate::context::{build_context, PendingAction, QueryContext, SessionState};
use crate::error::Result;
use crate::feedback::{
    build_record, tune_temperature, FeedbackKind, FeedbackMemory, FeedbackStore,
};
use crate::intent::{IntentAnalysis, IntentClassifier, IntentKind};
use crate::memory::store::{FactRecord, KnowledgeStore};
use crate::memory::synthesis::synthesize;
use crate::models::{EngineResponse, ResponseCategory};
use crate::search::orchestrator::SearchOrchestrator;
use crate::search::topic::extract_topic;
use crate::search::wiki::KnowledgeFetcher;
use crate::text::{capitalize_proper_nouns, preprocess, sanitize, split_sentences, summarize, tokenize};
use crate::utility::UtilityResponder;

static DEFINITION_DISPATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^define\s+|^what\s+(does|is)\s+.+\s+mean|^meaning\s+of\s+|^definition\s+of\s+")
        .expect("Invalid regex: DEFINITION_DISPATCH_RE")
});
static DEFINE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(define|meaning of|definition of)\s+").expect("Invalid regex: DEFINE_PREFIX_RE")
});
static WHAT_DOES_MEAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^what\s+(does|is)\s+(.+?)\s+mean\??$").expect("Invalid regex: WHAT_DOES_MEAN_RE")
});
static VS_MATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(.+?)\s+vs\.?\s+(.+)").expect("Invalid regex: VS_MATCH_RE")
});
static DIFF_MATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)difference\s+between\s+(.+?)\s+and\s+(.+)").expect("Invalid regex: DIFF_MATCH_RE")
});
static COMPARE_MATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)compare\s+(.+?)\s+(?:and|vs|versus|to)\s+(.+)")
        .expect("Invalid regex: COMPARE_MATCH_RE")
});
static COMPARE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(what is|compare)\s+").expect("Invalid regex: COMPARE_PREFIX_RE")
});
static CREATIVE_REQUEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)write|essay|story|article|poem|compose|make.*essay|make.*story")
        .expect("Invalid regex: CREATIVE_REQUEST_RE")
});
static BRAINSTORM_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(brainstorm|give me|suggest|come up with|think of|show me|tell me)\s+")
        .expect("Invalid regex: BRAINSTORM_STRIP_RE")
});
static BRAINSTORM_IDEAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(some |an? |the )?(ideas?|suggestions?|thoughts?|tips?|options?)\s+(for|about|on|regarding)\s+")
        .expect("Invalid regex: BRAINSTORM_IDEAS_RE")
});
static BRAINSTORM_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+to\s+(wear|make|do|try|use|create|build)$")
        .expect("Invalid regex: BRAINSTORM_SUFFIX_RE")
});
static RECENT_GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)hello|hi there|good morning|good afternoon|good evening|greetings")
        .expect("Invalid regex: RECENT_GREETING_RE")
});
static HOW_ARE_YOU_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)how are you|how.*doing").expect("Invalid regex: HOW_ARE_YOU_RE")
});
static WHATS_UP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)what.*\bup\b|\bwaddup\b|\bsup\b").expect("Invalid regex: WHATS_UP_RE")
});
static WHO_YOU_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)who.*you").expect("Invalid regex: WHO_YOU_RE"));

const REWRITE_INTENTS: &[IntentKind] = &[
    IntentKind::Paraphrase,
    IntentKind::ToneAdjust,
    IntentKind::Simplify,
    IntentKind::Translate,
    IntentKind::Correction,
];

const CONVERSATIONAL_INTENTS: &[IntentKind] = &[
    IntentKind::Casual,
    IntentKind::Greeting,
    IntentKind::Farewell,
    IntentKind::Gratitude,
    IntentKind::Opinion,
    IntentKind::Recommendation,
    IntentKind::Confirmation,
    IntentKind::Negation,
    IntentKind::PersonalSharing,
    IntentKind::Confusion,
];

/// The query-understanding and knowledge-retrieval engine.
pub struct ResponseEngine {
    store: KnowledgeStore,
    classifier: IntentClassifier,
    orchestrator: SearchOrchestrator,
    utility: UtilityResponder,
    feedback: FeedbackMemory,
    response_cache: LruCache<String, EngineResponse>,
    config: EngineConfig,
}

impl ResponseEngine {
    pub fn new(
        records: Vec<FactRecord>,
        fetcher: Arc<dyn KnowledgeFetcher>,
        config: EngineConfig,
    ) -> Self {
        let store = KnowledgeStore::load(records);
        let orchestrator = SearchOrchestrator::new(fetcher, &config);
        let cache_capacity =
            NonZeroUsize::new(config.response_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            classifier: IntentClassifier::new(),
            orchestrator,
            utility: UtilityResponder::new(),
            feedback: FeedbackMemory::default(),
            response_cache: LruCache::new(cache_capacity),
            config,
        }
    }

    /// Replace the fact store wholesale (entries, glossary, and the
    /// document-frequency index all rebuild).
    pub fn reload(&mut self, records: Vec<FactRecord>) {
        self.store = KnowledgeStore::load(records);
        self.response_cache.clear();
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Answer one turn. Never fails: internal errors become a generic
    /// apology response.
    pub async fn respond(&mut self, query: &str, session: &mut SessionState) -> EngineResponse {
        match self.respond_inner(query, session).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "Turn pipeline failed");
                EngineResponse::new(
                    "I encountered an error while processing your request. Please try \
                     rephrasing your question or asking something else.",
                    &["Error Handler"],
                    ResponseCategory::Fallback,
                )
            }
        }
    }

    /// Record a feedback judgement, retune the session temperature, and
    /// persist through the store when one is given.
    pub fn process_feedback(
        &mut self,
        session: &mut SessionState,
        query: &str,
        response: &str,
        kind: FeedbackKind,
        correction: Option<String>,
        store: Option<&dyn FeedbackStore>,
    ) {
        self.feedback
            .record(build_record(query, response, kind, correction));
        session.temperature = tune_temperature(&self.feedback, session.temperature);
        if let Some(store) = store {
            if let Err(err) = store.save(&self.feedback) {
                warn!(error = %err, "Could not persist feedback");
            }
        }
    }

    /// Seed feedback memory from a persistence collaborator.
    pub fn load_feedback(&mut self, store: &dyn FeedbackStore) {
        match store.load() {
            Ok(memory) => self.feedback = memory,
            Err(err) => warn!(error = %err, "Could not load feedback"),
        }
    }

    async fn respond_inner(
        &mut self,
        query: &str,
        session: &mut SessionState,
    ) -> Result<EngineResponse> {
        let sanitized = sanitize(query);
        if sanitized.is_empty() {
            return Ok(EngineResponse::new(
                "I couldn't understand that. Could you try typing it again with standard text?",
                &["Input Handler"],
                ResponseCategory::Fallback,
            ));
        }

        let ctx = build_context(&sanitized, session);
        let effective = ctx.resolved_query.clone();
        let analysis = self.classifier.analyze(&effective, &ctx);
        info!(
            session = %session.id,
            primary = %analysis.primary,
            confidence = analysis.confidence,
            "Classified turn"
        );

        // A confirmed "shall I dig deeper?" offer runs the deep search
        if analysis.primary == IntentKind::Confirmation
            && ctx.pending_action == Some(PendingAction::DeepSearch)
        {
            let search_topic = ctx.last_topic.clone().unwrap_or_else(|| effective.clone());
            let deep_query = format!("history of {}", search_topic);
            if let Some(text) = self.orchestrator.search(&deep_query, true).await {
                session.last_topic = Some(search_topic);
                let response = EngineResponse::new(
                    text,
                    &["Wikipedia", "Knowledge Base"],
                    ResponseCategory::Search,
                );
                session.record_turn(query, &response);
                return Ok(response);
            }
        }

        if analysis.primary == IntentKind::Meta {
            let response = self.meta_response(&effective);
            session.record_turn(query, &response);
            return Ok(response);
        }

        if analysis.primary == IntentKind::Utility
            || analysis.has_secondary(IntentKind::Utility)
        {
            if let Some(response) = self.utility.respond(&effective, ctx.last_response_category) {
                session.record_turn(query, &response);
                return Ok(response);
            }
        }

        if CONVERSATIONAL_INTENTS.contains(&analysis.primary)
            || analysis.has_secondary(IntentKind::Casual)
        {
            if let Some(mut response) = self.conversational_response(&analysis, &effective, &ctx)
            {
                if self.should_ask_follow_up(&response.text) {
                    response
                        .text
                        .push_str("\n\nIs there anything specific you'd like to talk about?");
                }
                session.record_turn(query, &response);
                return Ok(response);
            }
        }

        if REWRITE_INTENTS.contains(&analysis.primary) {
            let response = match session.last_output() {
                Some(last) => EngineResponse::new(
                    last.to_string(),
                    &["Conversation Memory"],
                    ResponseCategory::Rewrite,
                ),
                None => EngineResponse::new(
                    "I don't have anything recent to rework. Could you give me the text?",
                    &["Conversation Memory"],
                    ResponseCategory::Rewrite,
                ),
            };
            session.record_turn(query, &response);
            return Ok(response);
        }

        if analysis.primary == IntentKind::Summarize {
            let response = match session.last_output() {
                Some(last) => EngineResponse::new(
                    format!("Here is a summary:\n\n{}", summarize(last)),
                    &["Analytical Engine"],
                    ResponseCategory::Summary,
                ),
                None => EngineResponse::new(
                    "I don't have anything recent to summarize.",
                    &["Analytical Engine"],
                    ResponseCategory::Summary,
                ),
            };
            session.record_turn(query, &response);
            return Ok(response);
        }

        // Elaboration requests ride on the tracked topic
        if matches!(analysis.primary, IntentKind::Expand | IntentKind::FollowUp) {
            if let Some(topic) = ctx.last_topic.clone() {
                if let Some(text) = self.orchestrator.search(&topic, true).await {
                    let response =
                        EngineResponse::new(text, &["Wikipedia"], ResponseCategory::Search);
                    session.record_turn(query, &response);
                    return Ok(response);
                }
            }
        }

        let cache_key = effective.trim().to_lowercase();
        if let Some(cached) = self.response_cache.peek(&cache_key) {
            debug!("Response cache hit");
            return Ok(cached.clone());
        }

        let clean = preprocess(&effective);
        let query_tokens = tokenize(&clean);

        if is_math_query(&clean) {
            if let Some(text) = calculate(&clean) {
                let response = EngineResponse::new(text, &["Calculator"], ResponseCategory::Calc);
                session.record_turn(query, &response);
                return Ok(response);
            }
        }

        if DEFINITION_DISPATCH_RE.is_match(&effective) {
            if let Some(response) = self.definition_response(&effective).await {
                session.record_turn(query, &response);
                return Ok(response);
            }
        }

        if analysis.primary == IntentKind::Comparison
            || DIFF_MATCH_RE.is_match(&effective)
            || VS_MATCH_RE.is_match(&effective)
        {
            if let Some(response) = self.comparison_response(&effective).await {
                session.record_turn(query, &response);
                self.response_cache.put(cache_key.clone(), response.clone());
                return Ok(response);
            }
        }

        let topic = extract_topic(&effective);
        let retrieval_tokens = topic
            .as_deref()
            .map(tokenize)
            .filter(|t| !t.is_empty())
            .unwrap_or(query_tokens);
        let ranked = self.store.retrieve(&retrieval_tokens, &self.config);
        let top_score = ranked.first().map(|r| r.score).unwrap_or(0.0);

        // A near-perfect local match wins before any network traffic
        if top_score >= self.config.verified_threshold {
            info!(score = top_score, "Verified local match");
            let response = EngineResponse::new(
                ranked[0].entry.answer.clone(),
                &["Local Memory (Verified)"],
                ResponseCategory::Factual,
            );
            session.record_turn(query, &response);
            self.response_cache.put(cache_key.clone(), response.clone());
            return Ok(response);
        }

        if analysis.primary == IntentKind::Brainstorm {
            let response = self.brainstorm_handoff(&effective, topic.as_deref());
            session.last_topic = topic.clone();
            session.record_turn(query, &response);
            self.response_cache.put(cache_key.clone(), response.clone());
            return Ok(response);
        }

        let is_creative = analysis.primary == IntentKind::Creative
            || CREATIVE_REQUEST_RE.is_match(&effective);
        if is_creative {
            // Gather reference material; the prose generators consume it
            // along with the category tag
            let context_text = match topic.as_deref() {
                Some(t) => self.orchestrator.search(t, true).await,
                None => None,
            };
            let sources: &[&str] = if context_text.is_some() { &["Wikipedia"] } else { &[] };
            let response = EngineResponse::new(
                context_text.unwrap_or_default(),
                sources,
                ResponseCategory::Creative,
            );
            session.last_topic = topic.clone();
            session.record_turn(query, &response);
            self.response_cache.put(cache_key.clone(), response.clone());
            return Ok(response);
        }

        let needs_search = crate::intent::rules::is_search_query(&effective);
        let has_little_memory = self.store.len() < 50;
        if needs_search || has_little_memory {
            let search_query = topic.clone().unwrap_or_else(|| effective.clone());
            if let Some(mut text) = self.orchestrator.search(&search_query, false).await {
                if let Some(t) = topic.as_deref() {
                    if self.should_ask_follow_up(&text) {
                        text.push_str(&format!("\n\n{}", self.utility.follow_up_question(t)));
                    }
                }
                let response = EngineResponse::new(text, &["Wikipedia"], ResponseCategory::Search);
                session.last_topic = topic.clone();
                session.record_turn(query, &response);
                self.response_cache.put(cache_key.clone(), response.clone());
                return Ok(response);
            } else if needs_search {
                warn!("External search failed for factual query");
            }
        }

        if top_score >= self.config.strong_threshold {
            debug!(score = top_score, "Strong local match");
            let response = EngineResponse::new(
                ranked[0].entry.answer.clone(),
                &["Local Memory"],
                ResponseCategory::Factual,
            );
            session.record_turn(query, &response);
            self.response_cache.put(cache_key.clone(), response.clone());
            return Ok(response);
        }

        if top_score >= self.config.weak_threshold {
            debug!(score = top_score, "Weak matches, synthesizing");
            let text = synthesize(&ranked, topic.as_deref(), &self.config);
            let response = EngineResponse::new(
                text,
                &["Knowledge Synthesis", "Local Memory"],
                ResponseCategory::Factual,
            );
            session.record_turn(query, &response);
            self.response_cache.put(cache_key.clone(), response.clone());
            return Ok(response);
        }

        // Last resort before the conversational fallback
        let last_resort = topic.clone().unwrap_or_else(|| effective.clone());
        if let Some(text) = self.orchestrator.search(&last_resort, false).await {
            let response = EngineResponse::new(text, &["Wikipedia"], ResponseCategory::Search);
            session.record_turn(query, &response);
            self.response_cache.put(cache_key.clone(), response.clone());
            return Ok(response);
        }

        let mut text = self.conversational_fallback();
        if let Some(t) = topic.as_deref() {
            if self.should_ask_follow_up(&text) {
                text.push_str(&format!("\n\n{}", self.utility.follow_up_question(t)));
            }
        }
        let response =
            EngineResponse::new(text, &["General Knowledge Engine"], ResponseCategory::Fallback);
        session.record_turn(query, &response);
        self.response_cache.put(cache_key, response.clone());
        Ok(response)
    }

    fn meta_response(&self, query: &str) -> EngineResponse {
        let q = query.to_lowercase();
        let text = if q.contains("what can you do")
            || q.contains("capab")
            || q.contains("features")
        {
            "I can answer factual questions from my knowledge base, look things up for you, \
             run quick calculations, and handle small utilities like dice rolls or telling \
             the time. Ask me anything!"
        } else if q.contains("how do you work") {
            "I match your question against what I already know, and when that's not enough \
             I search external sources for the best available summary."
        } else {
            "I am Recall, a virtual assistant built to answer your questions from memory \
             and live research. My goal is to get you a useful answer fast."
        };
        EngineResponse::new(text, &["Identity Core"], ResponseCategory::Meta)
    }

    fn conversational_response(
        &self,
        analysis: &IntentAnalysis,
        query: &str,
        ctx: &QueryContext,
    ) -> Option<EngineResponse> {
        let mut rng = rand::thread_rng();
        let make = |text: &str| {
            Some(EngineResponse::new(
                text,
                &["Conversational"],
                ResponseCategory::Conversational,
            ))
        };

        match analysis.primary {
            IntentKind::PersonalSharing => make(
                "That's interesting to hear! Tell me more, or ask me anything you're curious about.",
            ),
            IntentKind::Casual | IntentKind::Greeting => {
                // Don't greet twice in a row
                if analysis.primary == IntentKind::Greeting {
                    if let Some(last) = ctx.recent_responses.last() {
                        if RECENT_GREETING_RE.is_match(last) {
                            return make("I'm still here! What's on your mind?");
                        }
                    }
                }
                if WHO_YOU_RE.is_match(query) {
                    return Some(self.meta_response(query));
                }
                if HOW_ARE_YOU_RE.is_match(query) {
                    return make(
                        "I'm functioning perfectly, thanks for asking! I'm ready to help you \
                         with research, writing, or just chatting. How can I help you today?",
                    );
                }
                if WHATS_UP_RE.is_match(query) {
                    let options = [
                        "Not much, just processing data and ready to assist. What's up with you?",
                        "Everything is running smoothly here. What can I do for you?",
                        "Just waiting for your next great idea! What are we working on?",
                    ];
                    return make(options.choose(&mut rng).copied().unwrap_or(options[0]));
                }
                let hour = Local::now().hour();
                let time_greeting = if hour < 12 {
                    "Good morning"
                } else if hour < 18 {
                    "Good afternoon"
                } else {
                    "Good evening"
                };
                let options = [
                    format!(
                        "{}! It's great to connect with you. What would you like to explore today?",
                        time_greeting
                    ),
                    "Hello! I'm ready for anything. What's the plan?".to_string(),
                    "Hey there! Good to see you. How can I help?".to_string(),
                    "Greetings! I'm at your service for research, writing, or questions.".to_string(),
                ];
                make(options.choose(&mut rng).map(|s| s.as_str()).unwrap_or(""))
            }
            IntentKind::Gratitude => {
                let options = [
                    "You're very welcome! Let me know if you need anything else.",
                    "Happy to help!",
                    "No problem at all. Is there anything else I can do for you?",
                    "Glad I could be of assistance!",
                ];
                make(options.choose(&mut rng).copied().unwrap_or(options[0]))
            }
            IntentKind::Farewell => {
                make("Goodbye! Have a wonderful day. I'll be here if you need me.")
            }
            IntentKind::Opinion | IntentKind::Recommendation => {
                let q = query.to_lowercase();
                if q.contains("movie") || q.contains("film") {
                    return make(
                        "I don't watch movies, but classics like 'The Godfather' or sci-fi \
                         like 'Interstellar' are often highly recommended for their \
                         storytelling and visuals.",
                    );
                }
                if q.contains("book") || q.contains("read") {
                    return make(
                        "Reading is excellent. 'Sapiens' by Yuval Noah Harari is a popular \
                         choice for non-fiction, while '1984' remains a relevant classic.",
                    );
                }
                make(
                    "That's an interesting question. I think exploring different perspectives \
                     is always valuable. Could you share more details so I can give a better \
                     recommendation?",
                )
            }
            IntentKind::Confirmation | IntentKind::Negation => {
                if ctx.last_system_question.is_some() {
                    if analysis.primary == IntentKind::Confirmation {
                        make(
                            "Great! I'm glad to hear that. Is there anything specific about it \
                             you'd like to discuss?",
                        )
                    } else {
                        make(
                            "I understand. Everyone has different preferences. What do you \
                             prefer instead?",
                        )
                    }
                } else {
                    make(
                        "I'm not sure what we're confirming, but I appreciate your enthusiasm! \
                         What shall we talk about next?",
                    )
                }
            }
            IntentKind::Confusion => make(
                "I may have been unclear. Could you tell me which part I should explain \
                 differently?",
            ),
            _ => None,
        }
    }

    async fn definition_response(&mut self, query: &str) -> Option<EngineResponse> {
        let term = if let Some(caps) = WHAT_DOES_MEAN_RE.captures(query) {
            caps[2].to_string()
        } else {
            DEFINE_PREFIX_RE
                .replace(query, "")
                .trim_end_matches('?')
                .trim()
                .to_string()
        };
        if term.is_empty() {
            return None;
        }

        // The glossary answers before any network call
        if let Some(entry) = self.store.lookup_word(&term) {
            let heading = if entry.part_of_speech.is_empty() {
                format!("**{}**", capitalize_proper_nouns(&entry.word))
            } else {
                format!(
                    "**{}** ({})",
                    capitalize_proper_nouns(&entry.word),
                    entry.part_of_speech
                )
            };
            return Some(EngineResponse::new(
                format!("{}\n\n{}", heading, entry.definition),
                &["Dictionary"],
                ResponseCategory::Definition,
            ));
        }

        debug!(term, "Looking up definition");
        match self.orchestrator.search(&term, false).await {
            Some(summary) => {
                let definition = split_sentences(&summary, 10)
                    .into_iter()
                    .take(2)
                    .collect::<Vec<_>>()
                    .join(". ")
                    + ".";
                Some(EngineResponse::new(
                    format!("**{}**\n\n{}", capitalize_proper_nouns(&term), definition),
                    &["Wikipedia", "Definition Engine"],
                    ResponseCategory::Definition,
                ))
            }
            None => Some(EngineResponse::new(
                format!(
                    "I couldn't find a definition for \"{}\". Could you try rephrasing or \
                     check the spelling?",
                    term
                ),
                &["Definition Engine"],
                ResponseCategory::Definition,
            )),
        }
    }

    async fn comparison_response(&mut self, query: &str) -> Option<EngineResponse> {
        let (first, second) = if let Some(caps) = DIFF_MATCH_RE.captures(query) {
            (caps[1].to_string(), caps[2].to_string())
        } else if let Some(caps) = COMPARE_MATCH_RE.captures(query) {
            (caps[1].to_string(), caps[2].to_string())
        } else if let Some(caps) = VS_MATCH_RE.captures(query) {
            (
                COMPARE_PREFIX_RE.replace(&caps[1], "").to_string(),
                caps[2].to_string(),
            )
        } else {
            return None;
        };

        let first = first.trim_end_matches('?').trim().to_string();
        let second = second.trim_end_matches('?').trim().to_string();
        if first.is_empty() || second.is_empty() {
            return None;
        }

        debug!(%first, %second, "Comparison lookup");
        self.orchestrator
            .fetch_pair(&first, &second, false)
            .await
            .map(|text| {
                EngineResponse::new(
                    text,
                    &["Wikipedia", "Comparative Analysis"],
                    ResponseCategory::Comparison,
                )
            })
    }

    fn brainstorm_handoff(&self, query: &str, topic: Option<&str>) -> EngineResponse {
        let mut brainstorm_topic = BRAINSTORM_STRIP_RE.replace(query, "").to_string();
        brainstorm_topic = BRAINSTORM_IDEAS_RE.replace(&brainstorm_topic, "").to_string();
        brainstorm_topic = BRAINSTORM_SUFFIX_RE.replace(&brainstorm_topic, "").to_string();
        brainstorm_topic = brainstorm_topic.trim_end_matches('?').trim().to_string();

        if brainstorm_topic.len() < 2 {
            brainstorm_topic = topic.unwrap_or("general concepts").to_string();
        }

        EngineResponse::new(
            brainstorm_topic,
            &["Creative Brainstorming Engine"],
            ResponseCategory::Brainstorm,
        )
    }

    fn conversational_fallback(&self) -> String {
        let mut rng = rand::thread_rng();
        let options = [
            "I don't have sufficient context to answer that confidently.",
            "That topic isn't in my current knowledge base. Try asking something else or \
             rephrasing your question.",
            "I'm not finding relevant information for that query.",
            "My database doesn't contain enough information about that subject.",
        ];
        options.choose(&mut rng).copied().unwrap_or(options[0]).to_string()
    }

    fn should_ask_follow_up(&self, response_text: &str) -> bool {
        if response_text.len() < 50 || response_text.contains('?') {
            return false;
        }
        rand::thread_rng().gen_bool(0.3)
    }
}
