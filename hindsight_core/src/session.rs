//! Retrieval session - the single entry point for one (persona, date) call.
//!
//! Pure composition of planner, store, and ranker. The session holds no
//! per-call state, so one instance serves any number of concurrent calls.

use chrono::NaiveDate;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::corpus::DocumentStore;
use crate::error::RetrievalError;
use crate::planner::{PersonaTopic, QueryPlanner};
use crate::ranker::{EvidenceSet, RetrievalRequest, TemporalRanker};

/// Orchestrates one retrieval call end-to-end.
pub struct RetrievalSession {
    store: Arc<DocumentStore>,
    planner: QueryPlanner,
    ranker: TemporalRanker,
}

impl RetrievalSession {
    /// Creates a session over a shared read-only store.
    pub fn new(store: Arc<DocumentStore>, planner: QueryPlanner, ranker: TemporalRanker) -> Self {
        Self {
            store,
            planner,
            ranker,
        }
    }

    /// Returns the shared document store.
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Plans a query set and builds the typed request for one call.
    pub fn build_request<R: Rng>(
        &self,
        topic: PersonaTopic,
        as_of: NaiveDate,
        rng: &mut R,
    ) -> RetrievalRequest {
        RetrievalRequest {
            topic,
            queries: self.planner.plan(topic, rng),
            as_of,
        }
    }

    /// One full retrieval: plan, search, rank, truncate.
    ///
    /// The RNG only influences which queries are sampled; for a fixed
    /// query set the ranking itself is fully deterministic.
    pub fn retrieve<R: Rng>(
        &self,
        topic: PersonaTopic,
        as_of: NaiveDate,
        rng: &mut R,
    ) -> Result<EvidenceSet, RetrievalError> {
        let request = self.build_request(topic, as_of, rng);
        self.retrieve_with_request(&request)
    }

    /// Retrieval over a caller-constructed request (fixed query set).
    pub fn retrieve_with_request(
        &self,
        request: &RetrievalRequest,
    ) -> Result<EvidenceSet, RetrievalError> {
        self.ranker.rank(&self.store, request)
    }

    /// Retrieval bounded by a time budget.
    ///
    /// The deadline is checked between pipeline stages. On exhaustion the
    /// call fails with [`RetrievalError::Timeout`] and surfaces no partial
    /// evidence set, so a slow cell can never silently bias downstream
    /// decisions with a truncated view.
    pub fn retrieve_within<R: Rng>(
        &self,
        topic: PersonaTopic,
        as_of: NaiveDate,
        rng: &mut R,
        budget: Duration,
    ) -> Result<EvidenceSet, RetrievalError> {
        let started = Instant::now();
        let timeout = || RetrievalError::Timeout {
            budget_ms: budget.as_millis() as u64,
        };

        let request = self.build_request(topic, as_of, rng);
        if started.elapsed() > budget {
            return Err(timeout());
        }

        let fused = self.ranker.fuse(&self.store, &request)?;
        if started.elapsed() > budget {
            return Err(timeout());
        }

        Ok(self.ranker.finalize(&self.store, fused))
    }
}
