//! # Context Module
//!
//! Conversational state threaded explicitly through the pipeline.
//!
//! `SessionState` is the rolling per-session value (history ring, last
//! topic, last response category, temperature); `QueryContext` is the
//! per-turn derived view rebuilt fresh from the most recent turns, with
//! pronouns and ellipsis resolved into a concrete query.

use chrono::{DateTime, Utc};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::LazyLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::intent::rules::is_contextual_follow_up;
use crate::models::{EngineResponse, ResponseCategory};
use crate::search::topic::extract_topic;

static PRONOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(it|that|this|they|them|these|those)\b").expect("Invalid regex: PRONOUN_RE")
});
static PRONOUN_SUBST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(it|that|this|the first one)\b").expect("Invalid regex: PRONOUN_SUBST_RE")
});
static TELL_ME_MORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(tell me more|go on|continue|expand|details|elaborate)$")
        .expect("Invalid regex: TELL_ME_MORE_RE")
});
static BARE_WHY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^why\??$").expect("Invalid regex: BARE_WHY_RE"));
static BARE_AND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^and\??$").expect("Invalid regex: BARE_AND_RE"));
static DEEP_SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)dig deeper|more details|history of this").expect("Invalid regex: DEEP_SEARCH_RE")
});
static PENDING_SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)search|look up|find").expect("Invalid regex: PENDING_SEARCH_RE")
});

/// Action the system offered in its previous question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    DeepSearch,
    Search,
}

/// One completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub response: String,
    pub category: ResponseCategory,
    pub timestamp: DateTime<Utc>,
}

/// Rolling per-session state, passed in and updated per turn so the
/// pipeline stays referentially transparent.
#[derive(Debug)]
pub struct SessionState {
    pub id: Uuid,
    history: VecDeque<Turn>,
    history_capacity: usize,
    pub last_topic: Option<String>,
    pub last_response_category: Option<ResponseCategory>,
    /// Generation temperature, nudged by feedback tuning.
    pub temperature: f32,
}

impl SessionState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            history: VecDeque::new(),
            history_capacity: config.history_capacity.max(1),
            last_topic: None,
            last_response_category: None,
            temperature: config.base_temperature,
        }
    }

    /// Append a completed turn, evicting the oldest past capacity.
    pub fn record_turn(&mut self, query: &str, response: &EngineResponse) {
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(Turn {
            query: query.to_string(),
            response: response.text.clone(),
            category: response.category,
            timestamp: Utc::now(),
        });
        self.last_response_category = Some(response.category);
    }

    pub fn last_output(&self) -> Option<&str> {
        self.history.back().map(|t| t.response.as_str())
    }

    /// Most recent `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> Vec<&Turn> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Per-turn derived context.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub query: String,
    pub last_topic: Option<String>,
    pub last_response_category: Option<ResponseCategory>,
    pub recent_queries: Vec<String>,
    pub recent_responses: Vec<String>,
    /// The previous system output, only when it ended in a question mark.
    pub last_system_question: Option<String>,
    pub pending_action: Option<PendingAction>,
    /// The input with pronouns and ellipsis expanded.
    pub resolved_query: String,
    pub has_pronouns: bool,
    pub is_follow_up: bool,
}

impl QueryContext {
    /// A context with no history, for callers outside a session.
    pub fn bare(query: &str) -> Self {
        Self {
            query: query.to_string(),
            last_topic: None,
            last_response_category: None,
            recent_queries: Vec::new(),
            recent_responses: Vec::new(),
            last_system_question: None,
            pending_action: None,
            resolved_query: query.to_string(),
            has_pronouns: false,
            is_follow_up: false,
        }
    }
}

/// Build the per-turn context from the rolling session history.
pub fn build_context(query: &str, session: &SessionState) -> QueryContext {
    let recent = session.recent_turns(3);
    let recent_queries: Vec<String> = recent.iter().map(|t| t.query.clone()).collect();
    let recent_responses: Vec<String> = recent.iter().map(|t| t.response.clone()).collect();

    let last_system_question = recent
        .last()
        .filter(|t| t.response.trim().ends_with('?'))
        .map(|t| t.response.clone());

    let pending_action = last_system_question.as_deref().and_then(|question| {
        if DEEP_SEARCH_RE.is_match(question) {
            Some(PendingAction::DeepSearch)
        } else if PENDING_SEARCH_RE.is_match(question) {
            Some(PendingAction::Search)
        } else {
            None
        }
    });

    let has_pronouns = PRONOUN_RE.is_match(query);
    let is_follow_up = is_contextual_follow_up(query);

    let trimmed = query.trim();
    let needs_resolution = has_pronouns
        || TELL_ME_MORE_RE.is_match(trimmed)
        || BARE_WHY_RE.is_match(trimmed)
        || BARE_AND_RE.is_match(trimmed);
    let resolved_query = if needs_resolution {
        resolve_pronouns(query, session.last_topic.as_deref(), &recent_queries)
    } else {
        query.to_string()
    };

    if resolved_query != query {
        debug!(original = query, resolved = %resolved_query, "Resolved pronouns");
    }

    QueryContext {
        query: query.to_string(),
        last_topic: session.last_topic.clone(),
        last_response_category: session.last_response_category,
        recent_queries,
        recent_responses,
        last_system_question,
        pending_action,
        resolved_query,
        has_pronouns,
        is_follow_up,
    }
}

/// Expand pronouns and bare ellipsis using the tracked topic, falling back
/// to a topic extracted from the most recent prior user query.
fn resolve_pronouns(query: &str, last_topic: Option<&str>, recent_queries: &[String]) -> String {
    let topic = match last_topic {
        Some(t) => Some(t.to_string()),
        None => recent_queries.last().and_then(|q| extract_topic(q)),
    };

    let Some(topic) = topic else {
        return query.to_string();
    };

    let trimmed = query.trim();
    if TELL_ME_MORE_RE.is_match(trimmed) {
        return format!("{} about {}", trimmed, topic);
    }
    if BARE_WHY_RE.is_match(trimmed) {
        return format!("why is {} like that?", topic);
    }
    if BARE_AND_RE.is_match(trimmed) {
        return format!("what else about {}?", topic);
    }

    PRONOUN_SUBST_RE
        .replace_all(query, NoExpand(&topic))
        .to_string()
}
