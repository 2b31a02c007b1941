//! Search orchestration: cache, intelligent term, strategy fallback chain.

use futures::future;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::search::query_gen::{generate_search_terms, SearchTerms};
use crate::search::strategy::{analyze_query, build_strategies};
use crate::search::wiki::KnowledgeFetcher;

/// Runs external lookups for the engine.
///
/// Results are cached by the original (pre-rewrite) query string; the cache
/// is bounded and evicts oldest-first, and lookups never reorder entries.
pub struct SearchOrchestrator {
    fetcher: Arc<dyn KnowledgeFetcher>,
    cache: LruCache<String, String>,
    max_alternative_queries: usize,
}

impl SearchOrchestrator {
    pub fn new(fetcher: Arc<dyn KnowledgeFetcher>, config: &EngineConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.wiki_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            fetcher,
            cache: LruCache::new(capacity),
            max_alternative_queries: config.max_alternative_queries,
        }
    }

    /// Full search flow: cache, generated term, then the strategy chain in
    /// priority order, short-circuiting on the first success. Returns `None`
    /// only when every strategy fails.
    pub async fn search(&mut self, query: &str, long_form: bool) -> Option<String> {
        if let Some(hit) = self.cache.peek(query) {
            debug!(query, "Cache hit");
            return Some(hit.clone());
        }

        match generate_search_terms(query) {
            SearchTerms::Pair(first, second) => {
                if let Some(combined) = self.fetch_pair(&first, &second, long_form).await {
                    return self.cache_and_return(query, combined);
                }
            }
            SearchTerms::Single(term) => {
                if !term.is_empty() && term != query {
                    debug!(query, term, "Trying generated search term");
                    if let Some(result) = self.try_fetch(&term, long_form).await {
                        return self.cache_and_return(query, result);
                    }
                }
            }
        }

        let analysis = analyze_query(query);
        let strategies = build_strategies(query, &analysis, self.max_alternative_queries);
        debug!(count = strategies.len(), "Trying fallback strategies");

        for strategy in &strategies {
            debug!(label = strategy.label, term = %strategy.term, "Trying strategy");
            if let Some(result) = self.try_fetch(&strategy.term, long_form).await {
                info!(label = strategy.label, "Strategy succeeded");
                return self.cache_and_return(query, result);
            }
        }

        warn!(query, "All search strategies failed");
        None
    }

    /// Fetch two terms concurrently and combine them as labeled sections.
    /// Fails only when both lookups fail; a single success is returned
    /// unlabeled.
    pub async fn fetch_pair(
        &self,
        first: &str,
        second: &str,
        long_form: bool,
    ) -> Option<String> {
        let (first_result, second_result) = future::join(
            self.try_fetch(first, long_form),
            self.try_fetch(second, long_form),
        )
        .await;

        match (first_result, second_result) {
            (Some(a), Some(b)) => Some(format!("**{}:**\n{}\n\n**{}:**\n{}", first, a, second, b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// One fetch attempt; collaborator errors become an ordinary miss.
    async fn try_fetch(&self, term: &str, long_form: bool) -> Option<String> {
        match self.fetcher.fetch(term, long_form).await {
            Ok(result) => result,
            Err(err) => {
                warn!(term, error = %err, "Fetch failed, treating as miss");
                None
            }
        }
    }

    fn cache_and_return(&mut self, original_query: &str, result: String) -> Option<String> {
        self.cache.put(original_query.to_string(), result.clone());
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted fetcher: answers only for configured terms, counts calls.
    struct ScriptedFetcher {
        answers: Vec<(String, String)>,
        calls: AtomicUsize,
        seen_terms: Mutex<Vec<String>>,
        fail_all: bool,
    }

    impl ScriptedFetcher {
        fn new(answers: &[(&str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(t, a)| (t.to_string(), a.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
                seen_terms: Mutex::new(Vec::new()),
                fail_all: false,
            }
        }

        fn failing() -> Self {
            Self {
                answers: Vec::new(),
                calls: AtomicUsize::new(0),
                seen_terms: Mutex::new(Vec::new()),
                fail_all: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KnowledgeFetcher for ScriptedFetcher {
        async fn fetch(&self, term: &str, _long_form: bool) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_terms.lock().unwrap().push(term.to_string());
            if self.fail_all {
                return Err(AppError::Internal("scripted failure".to_string()));
            }
            Ok(self
                .answers
                .iter()
                .find(|(t, _)| t == term)
                .map(|(_, a)| a.clone()))
        }
    }

    #[tokio::test]
    async fn test_cache_idempotence() {
        let fetcher = Arc::new(ScriptedFetcher::new(&[(
            "France",
            "France is a country in Western Europe.",
        )]));
        let mut orchestrator =
            SearchOrchestrator::new(fetcher.clone(), &EngineConfig::default());

        let first = orchestrator
            .search("who is the president of France", false)
            .await;
        assert!(first.is_some());
        let calls_after_first = fetcher.call_count();

        let second = orchestrator
            .search("who is the president of France", false)
            .await;
        assert_eq!(first, second);
        // Second call served from cache; no further fetches
        assert_eq!(fetcher.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_strategy_short_circuit() {
        // The generated term misses; the first strategy (Proper Noun Exact)
        // succeeds, so no lower-priority strategy term is ever fetched.
        let fetcher = Arc::new(ScriptedFetcher::new(&[(
            "Amazon Rainforest",
            "The Amazon Rainforest covers much of the Amazon basin.",
        )]));
        let mut orchestrator =
            SearchOrchestrator::new(fetcher.clone(), &EngineConfig::default());

        let result = orchestrator
            .search("what is the Amazon Rainforest like", false)
            .await;
        assert!(result.is_some());

        let seen = fetcher.seen_terms.lock().unwrap().clone();
        let hit_pos = seen
            .iter()
            .position(|t| t == "Amazon Rainforest")
            .expect("proper-noun strategy fetched");
        // Nothing fetched after the winning strategy
        assert_eq!(hit_pos, seen.len() - 1);
    }

    #[tokio::test]
    async fn test_pair_combines_labeled_sections() {
        let fetcher = Arc::new(ScriptedFetcher::new(&[
            ("Mercury", "Mercury is the smallest planet in the Solar System."),
            ("Venus", "Venus is the second planet from the Sun."),
        ]));
        let mut orchestrator =
            SearchOrchestrator::new(fetcher.clone(), &EngineConfig::default());

        let result = orchestrator
            .search("difference between Mercury and Venus", false)
            .await
            .unwrap();

        let mercury_pos = result.find("**Mercury:**").unwrap();
        let venus_pos = result.find("**Venus:**").unwrap();
        assert!(mercury_pos < venus_pos);
    }

    #[tokio::test]
    async fn test_pair_single_success_unlabeled() {
        let fetcher = Arc::new(ScriptedFetcher::new(&[(
            "Mercury",
            "Mercury is the smallest planet in the Solar System.",
        )]));
        let orchestrator = SearchOrchestrator::new(fetcher.clone(), &EngineConfig::default());

        let result = orchestrator.fetch_pair("Mercury", "Xyzzy", false).await.unwrap();
        assert!(!result.contains("**Mercury:**"));
        assert!(result.contains("smallest planet"));
    }

    #[tokio::test]
    async fn test_fetch_errors_do_not_abort_the_chain() {
        let fetcher = Arc::new(ScriptedFetcher::failing());
        let mut orchestrator =
            SearchOrchestrator::new(fetcher.clone(), &EngineConfig::default());

        let result = orchestrator.search("what is a quasar", false).await;
        assert!(result.is_none());
        // Every strategy was still attempted despite the errors
        assert!(fetcher.call_count() > 1);
    }

    #[tokio::test]
    async fn test_cache_capacity_bounded() {
        let fetcher = Arc::new(ScriptedFetcher::new(&[("topic", "A cached answer about the topic.")]));
        let config = EngineConfig {
            wiki_cache_capacity: 2,
            ..EngineConfig::default()
        };
        let mut orchestrator = SearchOrchestrator::new(fetcher.clone(), &config);

        orchestrator.cache_and_return("first", "one".to_string());
        orchestrator.cache_and_return("second", "two".to_string());
        orchestrator.cache_and_return("third", "three".to_string());

        // Oldest entry evicted first
        assert!(orchestrator.cache.peek("first").is_none());
        assert!(orchestrator.cache.peek("second").is_some());
        assert!(orchestrator.cache.peek("third").is_some());
    }
}
