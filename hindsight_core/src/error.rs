//! Error types for the retrieval core.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors detected while loading a corpus into a [`crate::DocumentStore`].
///
/// All of these are fatal: a simulation run cannot proceed on a corrupt
/// corpus, so callers are expected to abort rather than skip documents.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus contained no documents at all.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// A document carried a zero-length embedding vector.
    #[error("document {id} has an empty embedding")]
    EmptyEmbedding { id: u64 },

    /// A document's embedding dimensionality differs from the rest of the corpus.
    #[error("document {id} has embedding dimension {actual}, expected {expected}")]
    DimensionMismatch {
        id: u64,
        expected: usize,
        actual: usize,
    },

    /// Two documents share the same identifier.
    #[error("duplicate document id {id}")]
    DuplicateId { id: u64 },
}

/// Errors raised during a retrieval call.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Corpus-level failure surfaced through a retrieval entry point.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// The store returned a document dated after the as-of cutoff.
    ///
    /// This is a backend contract violation, never silently corrected:
    /// a future document leaking into the evidence set would break the
    /// causality guarantee the whole experiment rests on.
    #[error("document {doc_id} dated {doc_date} is after the as-of date {as_of}")]
    TemporalInvariant {
        doc_id: u64,
        doc_date: NaiveDate,
        as_of: NaiveDate,
    },

    /// A retrieval call exceeded its caller-supplied time budget.
    ///
    /// Recoverable at the orchestration layer (retry or record the cell
    /// as missing data). No partial evidence set is ever surfaced.
    #[error("retrieval exceeded its {budget_ms}ms budget")]
    Timeout { budget_ms: u64 },

    /// The retrieval configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
