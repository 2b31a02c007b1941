//! Engine configuration.
//!
//! Every tunable the pipeline consults lives here so that thresholds are
//! visible configuration rather than constants buried in control flow.

use serde::Deserialize;

/// Tunable parameters for the whole answer pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score at or above which a local match is returned as verified.
    pub verified_threshold: f32,
    /// Score at or above which a local match is returned verbatim.
    pub strong_threshold: f32,
    /// Score at or above which weak matches are routed to synthesis.
    pub weak_threshold: f32,
    /// Minimum IDF coverage a document needs to stay in the ranking.
    pub coverage_floor: f32,
    /// Fraction of the query's highest-IDF tokens treated as critical.
    pub critical_fraction: f32,
    /// Multiplier applied to documents matching no critical token.
    pub no_critical_penalty: f32,
    /// Maximum number of ranked results returned by retrieval.
    pub max_results: usize,
    /// Number of top weak matches fed into synthesis.
    pub synthesis_pool: usize,
    /// Average score below which synthesis appends a low-confidence note.
    pub synthesis_confidence_floor: f32,
    /// Token-overlap ratio above which two documents join one cluster.
    pub cluster_similarity: f32,
    /// Cap on fallback search strategies tried per external lookup.
    pub max_alternative_queries: usize,
    /// Capacity of the external-result cache (evicted oldest-first).
    pub wiki_cache_capacity: usize,
    /// Capacity of the per-engine response cache.
    pub response_cache_capacity: usize,
    /// Number of turns retained in the session history ring.
    pub history_capacity: usize,
    /// Starting generation temperature, nudged by feedback tuning.
    pub base_temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verified_threshold: 0.95,
            strong_threshold: 0.40,
            weak_threshold: 0.08,
            coverage_floor: 0.25,
            critical_fraction: 0.3,
            no_critical_penalty: 0.1,
            max_results: 15,
            synthesis_pool: 6,
            synthesis_confidence_floor: 0.25,
            cluster_similarity: 0.3,
            max_alternative_queries: 8,
            wiki_cache_capacity: 50,
            response_cache_capacity: 100,
            history_capacity: 50,
            base_temperature: 0.85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.verified_threshold, 0.95);
        assert_eq!(config.strong_threshold, 0.40);
        assert_eq!(config.weak_threshold, 0.08);
        assert_eq!(config.max_alternative_queries, 8);
        assert_eq!(config.wiki_cache_capacity, 50);
    }

    #[test]
    fn test_deserialize_partial_override() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "cluster_similarity": 0.5 }"#).unwrap();
        assert_eq!(config.cluster_similarity, 0.5);
        assert_eq!(config.max_results, 15);
    }
}
