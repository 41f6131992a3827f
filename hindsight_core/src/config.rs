//! Retrieval configuration.

use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Configuration for one retrieval pipeline.
///
/// The defaults are the experiment-tuned values of the reference study.
/// They are deliberately plain configuration, not architectural constants:
/// the same code path serves both time-aware retrieval (`decay_rate > 0`)
/// and static pure-similarity retrieval (`decay_rate = 0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Exponential recency decay rate per day. Zero disables decay.
    pub decay_rate: f64,

    /// Candidates fetched per query before reranking.
    ///
    /// Kept generous (default 100) so that recency reweighting can promote
    /// documents that rank lower on pure similarity.
    pub per_query_k: usize,

    /// Maximum size of the final evidence set.
    pub top_k_final: usize,

    /// Topic-specific queries sampled per retrieval call (the shared
    /// generic query is appended on top of these).
    pub queries_per_call: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.01, // Half-life ≈ 70 days
            per_query_k: 100,
            top_k_final: 5,
            queries_per_call: 4,
        }
    }
}

impl RetrievalConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(RetrievalError::InvalidConfig(format!(
                "decay_rate must be finite and >= 0, got {}",
                self.decay_rate
            )));
        }
        if self.per_query_k == 0 {
            return Err(RetrievalError::InvalidConfig(
                "per_query_k must be > 0".to_string(),
            ));
        }
        if self.top_k_final == 0 {
            return Err(RetrievalError::InvalidConfig(
                "top_k_final must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Days until a document's recency weight drops to 0.5.
    ///
    /// Returns `f64::INFINITY` when decay is disabled.
    pub fn half_life_days(&self) -> f64 {
        if self.decay_rate == 0.0 {
            f64::INFINITY
        } else {
            std::f64::consts::LN_2 / self.decay_rate
        }
    }
}
