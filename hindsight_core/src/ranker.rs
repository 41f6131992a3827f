//! The temporal ranker - the core ranking algorithm.
//!
//! Converts a query set plus an as-of date into a deterministic, bounded
//! evidence set:
//!
//! 1. Search each query for a generous candidate pool (`per_query_k`)
//! 2. Weight each hit by exponential recency decay
//! 3. Fuse the per-query lists, deduplicating by max final score
//! 4. Sort (score desc, id asc) and truncate to `top_k_final`
//!
//! The same code path serves static retrieval: `decay_rate = 0` makes the
//! time factor identically 1 and ranking reduces to pure similarity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::RetrievalConfig;
use crate::corpus::DocumentStore;
use crate::error::RetrievalError;
use crate::planner::{PersonaTopic, Query, QuerySource};

/// Explicit, typed input to one ranking call.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    /// Archetype that generated the query set (carried for audit)
    pub topic: PersonaTopic,

    /// The planned query set, in plan order
    pub queries: Vec<Query>,

    /// Simulated "today": filters future documents and anchors document age
    pub as_of: NaiveDate,
}

/// A fused candidate after recency reweighting.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// Document identifier
    pub doc_id: u64,

    /// Raw similarity of the best-scoring contributing query
    pub similarity: f64,

    /// Recency weight in (0, 1]
    pub time_factor: f64,

    /// similarity × time_factor; relative ranking only
    pub final_score: f64,

    /// Which query contributed the winning score
    pub source: QuerySource,
}

/// One entry of the final evidence set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub doc_id: u64,
    pub text: String,
    pub final_score: f64,
}

/// The ranked, bounded evidence list returned to the decision step.
///
/// Sorted by descending final score, ties broken by ascending document id.
/// May be empty: "no evidence yet" is a meaningful state for early dates,
/// not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceSet {
    pub items: Vec<Evidence>,
}

impl EvidenceSet {
    /// Returns the number of evidence items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no document satisfied the temporal cutoff.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the document texts in final ranking order.
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|e| e.text.as_str()).collect()
    }
}

/// Computes the recency weight for a document of the given age.
///
/// `exp(-decay_rate * age_days)`: an exponential half-life model with
/// half-life ln(2)/decay_rate days. Age zero or decay rate zero both give
/// exactly 1.0.
pub fn time_factor(decay_rate: f64, age_days: i64) -> f64 {
    (-decay_rate * age_days as f64).exp()
}

/// The temporal ranker.
pub struct TemporalRanker {
    config: RetrievalConfig,
}

impl TemporalRanker {
    /// Creates a ranker with a validated configuration.
    pub fn new(config: RetrievalConfig) -> Result<Self, RetrievalError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the ranker's configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Ranks one request against the store.
    ///
    /// Stage order is fixed (search, score, fuse, sort, truncate); the
    /// output is fully determined by the corpus, the query set, and the
    /// configuration.
    pub fn rank(
        &self,
        store: &DocumentStore,
        request: &RetrievalRequest,
    ) -> Result<EvidenceSet, RetrievalError> {
        let fused = self.fuse(store, request)?;
        Ok(self.finalize(store, fused))
    }

    /// Stage 1+2+3: per-query search, recency scoring, max-score fusion.
    ///
    /// Exposed to the session so a deadline can be checked between stages.
    pub(crate) fn fuse(
        &self,
        store: &DocumentStore,
        request: &RetrievalRequest,
    ) -> Result<HashMap<u64, ScoredCandidate>, RetrievalError> {
        let mut fused: HashMap<u64, ScoredCandidate> = HashMap::new();

        for query in &request.queries {
            let candidates = store.search(&query.text, request.as_of, self.config.per_query_k);

            for candidate in candidates {
                let doc = store.document(candidate.doc_index);

                let age_days = (request.as_of - doc.date).num_days();
                if age_days < 0 {
                    // The store's causality filter failed: contract violation.
                    return Err(RetrievalError::TemporalInvariant {
                        doc_id: doc.id,
                        doc_date: doc.date,
                        as_of: request.as_of,
                    });
                }

                let time_factor = time_factor(self.config.decay_rate, age_days);
                let final_score = candidate.similarity * time_factor;

                let scored = ScoredCandidate {
                    doc_id: doc.id,
                    similarity: candidate.similarity,
                    time_factor,
                    final_score,
                    source: query.source,
                };

                // A document found by several queries keeps its best score;
                // it is neither penalized nor double-counted.
                match fused.entry(doc.id) {
                    std::collections::hash_map::Entry::Occupied(mut entry) => {
                        if scored.final_score > entry.get().final_score {
                            entry.insert(scored);
                        }
                    }
                    std::collections::hash_map::Entry::Vacant(entry) => {
                        entry.insert(scored);
                    }
                }
            }
        }

        Ok(fused)
    }

    /// Stage 4: sort the fused pool and truncate to the final top-k.
    pub(crate) fn finalize(
        &self,
        store: &DocumentStore,
        fused: HashMap<u64, ScoredCandidate>,
    ) -> EvidenceSet {
        let mut pool: Vec<ScoredCandidate> = fused.into_values().collect();

        pool.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });

        pool.truncate(self.config.top_k_final);

        let items = pool
            .into_iter()
            .map(|c| Evidence {
                text: text_for(store, c.doc_id),
                doc_id: c.doc_id,
                final_score: c.final_score,
            })
            .collect();

        EvidenceSet { items }
    }
}

/// Looks up a document's text by id.
///
/// Fused candidates always originate from store indices, so the id is
/// guaranteed present; a linear scan keeps the store free of an id map it
/// needs nowhere else.
fn text_for(store: &DocumentStore, doc_id: u64) -> String {
    (0..store.len())
        .map(|i| store.document(i))
        .find(|d| d.id == doc_id)
        .map(|d| d.text.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Document, Embedder};
    use approx::assert_relative_eq;
    use chrono::Days;
    use nalgebra::DVector;

    /// Embedder whose vectors are controlled per test: "q<i>" maps to
    /// basis vector i, so similarity against documents is explicit.
    struct BasisEmbedder {
        dim: usize,
    }

    impl Embedder for BasisEmbedder {
        fn dim(&self) -> usize {
            self.dim
        }

        fn embed(&self, text: &str) -> DVector<f64> {
            let mut v = DVector::zeros(self.dim);
            if let Ok(i) = text.trim_start_matches('q').parse::<usize>() {
                if i < self.dim {
                    v[i] = 1.0;
                }
            }
            v
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Document whose similarity to "q0" is exactly `sim`.
    fn doc_with_sim(id: u64, doc_date: NaiveDate, sim: f64) -> Document {
        // Unit vector at angle acos(sim) from basis 0.
        let mut v = DVector::zeros(4);
        v[0] = sim;
        v[1] = (1.0 - sim * sim).max(0.0).sqrt();
        Document::new(id, doc_date, format!("doc {}", id), v)
    }

    fn store(docs: Vec<Document>) -> DocumentStore {
        DocumentStore::load(Box::new(BasisEmbedder { dim: 4 }), docs).unwrap()
    }

    fn topic_query(text: &str) -> Query {
        Query {
            text: text.to_string(),
            source: QuerySource::Topic(PersonaTopic::CloudGamer),
        }
    }

    fn request(queries: Vec<Query>, as_of: NaiveDate) -> RetrievalRequest {
        RetrievalRequest {
            topic: PersonaTopic::CloudGamer,
            queries,
            as_of,
        }
    }

    fn ranker(config: RetrievalConfig) -> TemporalRanker {
        TemporalRanker::new(config).unwrap()
    }

    #[test]
    fn test_time_factor_reference_values() {
        // decay_rate 0.01 over ages 0/30/70/100 days.
        assert_relative_eq!(time_factor(0.01, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(time_factor(0.01, 30), 0.7408182, epsilon = 1e-6);
        assert_relative_eq!(time_factor(0.01, 70), 0.4965853, epsilon = 1e-6);
        assert_relative_eq!(time_factor(0.01, 100), 0.3678794, epsilon = 1e-6);
    }

    #[test]
    fn test_time_factor_zero_decay_is_identity() {
        for age in [0, 30, 365, 10_000] {
            assert_eq!(time_factor(0.0, age), 1.0);
        }
    }

    #[test]
    fn test_recency_reorders_equal_similarity() {
        // Four documents, identical similarity 0.8, ages 0/30/70/100 days.
        let as_of = date("2021-04-10");
        let docs = vec![
            doc_with_sim(100, as_of - Days::new(100), 0.8),
            doc_with_sim(70, as_of - Days::new(70), 0.8),
            doc_with_sim(30, as_of - Days::new(30), 0.8),
            doc_with_sim(0, as_of, 0.8),
        ];
        let store = store(docs);
        let ranker = ranker(RetrievalConfig {
            decay_rate: 0.01,
            top_k_final: 3,
            ..Default::default()
        });

        let evidence = ranker
            .rank(&store, &request(vec![topic_query("q0")], as_of))
            .unwrap();

        // Freshest first; the 100-day-old document falls outside top-3.
        let ids: Vec<u64> = evidence.items.iter().map(|e| e.doc_id).collect();
        assert_eq!(ids, vec![0, 30, 70]);
        assert_relative_eq!(evidence.items[0].final_score, 0.8, epsilon = 1e-9);
        assert_relative_eq!(
            evidence.items[1].final_score,
            0.8 * 0.7408182,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_dedup_keeps_max_score() {
        // One document reachable from two queries with similarities
        // 0.9 (q0) and 0.6 (q1): merged score must use 0.9.
        let as_of = date("2021-04-10");
        let mut v = DVector::zeros(4);
        v[0] = 0.9;
        v[1] = 0.6;
        let norm = (0.9f64 * 0.9 + 0.6 * 0.6).sqrt();
        let sim_q0 = 0.9 / norm;
        let sim_q1 = 0.6 / norm;

        let store = store(vec![Document::new(1, as_of, "shared", v)]);
        let ranker = ranker(RetrievalConfig::default());

        let evidence = ranker
            .rank(
                &store,
                &request(vec![topic_query("q0"), topic_query("q1")], as_of),
            )
            .unwrap();

        assert_eq!(evidence.len(), 1);
        assert_relative_eq!(evidence.items[0].final_score, sim_q0, epsilon = 1e-9);
        assert!(evidence.items[0].final_score > sim_q1);
    }

    #[test]
    fn test_zero_decay_matches_pure_similarity() {
        let as_of = date("2021-04-10");
        let docs = vec![
            doc_with_sim(1, as_of - Days::new(300), 0.9),
            doc_with_sim(2, as_of - Days::new(1), 0.7),
        ];
        let store = store(docs);
        let ranker = ranker(RetrievalConfig {
            decay_rate: 0.0,
            ..Default::default()
        });

        let evidence = ranker
            .rank(&store, &request(vec![topic_query("q0")], as_of))
            .unwrap();

        // Without decay, the much older but more similar document wins.
        assert_eq!(evidence.items[0].doc_id, 1);
        assert_relative_eq!(evidence.items[0].final_score, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_pool_is_valid() {
        let as_of = date("2020-01-01");
        let store = store(vec![doc_with_sim(1, date("2021-01-01"), 0.9)]);
        let ranker = ranker(RetrievalConfig::default());

        let evidence = ranker
            .rank(&store, &request(vec![topic_query("q0")], as_of))
            .unwrap();
        assert!(evidence.is_empty());
    }

    #[test]
    fn test_bounded_by_top_k() {
        let as_of = date("2021-04-10");
        let docs: Vec<Document> = (0..20)
            .map(|i| doc_with_sim(i, as_of - Days::new(i), 0.8))
            .collect();
        let store = store(docs);
        let ranker = ranker(RetrievalConfig {
            top_k_final: 5,
            ..Default::default()
        });

        let evidence = ranker
            .rank(&store, &request(vec![topic_query("q0")], as_of))
            .unwrap();
        assert_eq!(evidence.len(), 5);
    }

    #[test]
    fn test_tie_break_by_ascending_id() {
        let as_of = date("2021-04-10");
        let docs = vec![
            doc_with_sim(9, as_of, 0.8),
            doc_with_sim(2, as_of, 0.8),
            doc_with_sim(5, as_of, 0.8),
        ];
        let store = store(docs);
        let ranker = ranker(RetrievalConfig::default());

        let evidence = ranker
            .rank(&store, &request(vec![topic_query("q0")], as_of))
            .unwrap();
        let ids: Vec<u64> = evidence.items.iter().map(|e| e.doc_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_rank_determinism() {
        let as_of = date("2021-04-10");
        let docs: Vec<Document> = (0..50)
            .map(|i| doc_with_sim(i, as_of - Days::new(i % 17), 0.3 + 0.01 * i as f64 % 0.6))
            .collect();
        let store = store(docs);
        let ranker = ranker(RetrievalConfig::default());
        let req = request(vec![topic_query("q0"), topic_query("q1")], as_of);

        let first = ranker.rank(&store, &req).unwrap();
        let second = ranker.rank(&store, &req).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.items.iter().zip(second.items.iter()) {
            assert_eq!(a.doc_id, b.doc_id);
            assert_eq!(a.final_score, b.final_score);
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = TemporalRanker::new(RetrievalConfig {
            per_query_k: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(RetrievalError::InvalidConfig(_))));
    }
}
