//! The document store - a read-only, date-aware corpus of embedded documents.
//!
//! The store answers nearest-neighbor queries under a temporal constraint:
//! no document dated after the caller-supplied as-of date is ever visible.
//! This causality cutoff is the correctness-critical invariant of the whole
//! engine, enforced here at the lowest layer so everything above can rely
//! on it.

use chrono::NaiveDate;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CorpusError;

/// An immutable, dated, embedded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier
    pub id: u64,

    /// Publication date (calendar precision; no time-of-day)
    pub date: NaiveDate,

    /// Full text body
    pub text: String,

    /// Precomputed embedding, same dimensionality across the corpus
    pub embedding: DVector<f64>,
}

impl Document {
    /// Creates a new document.
    pub fn new(id: u64, date: NaiveDate, text: impl Into<String>, embedding: DVector<f64>) -> Self {
        Self {
            id,
            date,
            text: text.into(),
            embedding,
        }
    }
}

/// A raw search hit: document reference plus similarity, before any
/// recency reweighting.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Index of the document inside the store
    pub doc_index: usize,

    /// Raw similarity score (cosine, in [-1, 1])
    pub similarity: f64,
}

/// Maps query text to an embedding vector.
///
/// The embedding backend is an external collaborator; this trait is the
/// seam. Implementations must be pure functions of their input so that
/// repeated retrieval calls stay deterministic.
pub trait Embedder: Send + Sync {
    /// Embedding dimensionality produced by this embedder.
    fn dim(&self) -> usize;

    /// Embeds a text query.
    fn embed(&self, text: &str) -> DVector<f64>;
}

/// The read-only corpus with temporal nearest-neighbor search.
///
/// Built once per run via [`DocumentStore::load`], then shared across
/// concurrent retrieval calls behind an `Arc`. All search methods take
/// `&self` and touch no shared mutable state.
pub struct DocumentStore {
    /// All documents, in load order
    documents: Vec<Document>,

    /// Embedding dimensionality shared by every document
    dim: usize,

    /// Query-text embedder
    embedder: Box<dyn Embedder>,
}

impl DocumentStore {
    /// Loads a corpus, validating every document.
    ///
    /// Fails with [`CorpusError`] on an empty corpus, a zero-length or
    /// mismatched embedding, or a duplicate id. Load failures are fatal
    /// to the run; nothing is skipped silently.
    pub fn load(
        embedder: Box<dyn Embedder>,
        documents: Vec<Document>,
    ) -> Result<Self, CorpusError> {
        if documents.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }

        let dim = embedder.dim();
        let mut seen_ids = HashSet::with_capacity(documents.len());

        for doc in &documents {
            if doc.embedding.is_empty() {
                return Err(CorpusError::EmptyEmbedding { id: doc.id });
            }
            if doc.embedding.len() != dim {
                return Err(CorpusError::DimensionMismatch {
                    id: doc.id,
                    expected: dim,
                    actual: doc.embedding.len(),
                });
            }
            if !seen_ids.insert(doc.id) {
                return Err(CorpusError::DuplicateId { id: doc.id });
            }
        }

        Ok(Self {
            documents,
            dim,
            embedder,
        })
    }

    /// Returns the number of documents in the corpus.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the corpus holds no documents.
    ///
    /// `load` rejects an empty corpus, so this only exists for the
    /// `len`/`is_empty` pairing lint.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the shared embedding dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Looks up a document by store index.
    pub fn document(&self, doc_index: usize) -> &Document {
        &self.documents[doc_index]
    }

    /// Searches by query text, embedding it first.
    ///
    /// Returns up to `limit` candidates whose date is `<= as_of`, best
    /// similarity first. Fewer than `limit` results (including zero) is a
    /// valid outcome, not an error.
    pub fn search(&self, query_text: &str, as_of: NaiveDate, limit: usize) -> Vec<Candidate> {
        let query_vec = self.embedder.embed(query_text);
        self.search_by_vector(&query_vec, as_of, limit)
    }

    /// Searches by a precomputed query vector.
    ///
    /// Exact scan over the date-filtered corpus. Ties on similarity are
    /// broken by ascending document id so that identical inputs always
    /// produce identical candidate lists.
    pub fn search_by_vector(
        &self,
        query_vec: &DVector<f64>,
        as_of: NaiveDate,
        limit: usize,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.date <= as_of)
            .map(|(doc_index, doc)| Candidate {
                doc_index,
                similarity: cosine_similarity(query_vec, &doc.embedding),
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    self.documents[a.doc_index]
                        .id
                        .cmp(&self.documents[b.doc_index].id)
                })
        });

        candidates.truncate(limit);
        candidates
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm (a degenerate embedding
/// carries no direction, so it matches nothing).
pub fn cosine_similarity(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let norm_product = a.norm() * b.norm();
    if norm_product == 0.0 {
        return 0.0;
    }
    a.dot(b) / norm_product
}
