//! Hindsight - time-aware evidence retrieval for simulated decision agents.
//!
//! Each simulated agent queries a dated document corpus as of a simulated
//! "today" and receives a ranked, bounded evidence set. The engine enforces
//! strict temporal causality (no document from the simulated future is ever
//! retrievable), combines semantic similarity with exponential recency
//! decay, and fuses multi-query results deterministically.
//!
//! # Pipeline
//!
//! ```text
//! persona + as-of date
//!        │
//!   QueryPlanner ──── N topic queries + 1 generic query
//!        │
//!   DocumentStore ─── per-query candidates (date ≤ as-of, cosine top-k)
//!        │
//!   TemporalRanker ── similarity × exp(-decay_rate · age), max-score
//!        │            dedup, (score desc, id asc) sort, truncate
//!        ▼
//!   EvidenceSet ───── to the decision step
//! ```
//!
//! # Determinism
//!
//! The only randomness is query sampling, and the RNG is injected by the
//! caller. For a fixed corpus, query set, and configuration, repeated calls
//! produce byte-identical evidence sets.

mod config;
mod corpus;
mod error;
mod planner;
mod ranker;
mod session;

pub use config::RetrievalConfig;
pub use corpus::{cosine_similarity, Candidate, Document, DocumentStore, Embedder};
pub use error::{CorpusError, RetrievalError};
pub use planner::{PersonaTopic, Query, QueryCatalog, QueryPlanner, QuerySource};
pub use ranker::{
    time_factor, Evidence, EvidenceSet, RetrievalRequest, ScoredCandidate, TemporalRanker,
};
pub use session::RetrievalSession;
