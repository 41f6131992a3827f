//! Hindsight deterministic simulation harness.
//!
//! Drives the retrieval core across a (simulation dates × personas) grid,
//! the way the reference experiment did, but with every source of
//! non-determinism seeded:
//!
//! - **Corpus**: a synthetic review timeline generated by the
//!   [`CorpusOracle`] from a known ground-truth sentiment curve
//! - **Embeddings**: the pure feature-hashing [`HashedEmbedder`]
//! - **Query sampling**: a per-cell `ChaCha8` RNG derived from the master
//!   seed and the cell coordinates
//! - **Decisions**: the keyword-polarity [`KeywordBackend`] standing in
//!   for the out-of-scope LLM call
//!
//! Any run is reproducible from its seed; any anomaly is a seed number.

mod catalog;
mod decision;
mod embedder;
mod exporter;
mod oracle;
mod personas;
#[cfg(test)]
mod proptests;
mod runner;

pub use catalog::{default_catalog, GENERIC_QUERY};
pub use decision::{Decision, DecisionBackend, KeywordBackend};
pub use embedder::HashedEmbedder;
pub use exporter::RunExport;
pub use oracle::{CorpusOracle, OracleConfig};
pub use personas::{generate_balanced, Persona};
pub use runner::{
    CellOutcome, CellRecord, DateSummary, GridConfig, GridRunner, RunReport, RunSummary,
};
