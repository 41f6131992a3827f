//! Deterministic feature-hashing text embedder.
//!
//! Stands in for the commercial embedding backend during simulation runs:
//! token unigrams and bigrams are hashed into a fixed-dimension signed
//! vector, then L2-normalized. Two texts sharing vocabulary land near each
//! other, which is all the retrieval experiments need, and the mapping is
//! a pure function of the text so every run is reproducible.

use hindsight_core::Embedder;
use nalgebra::DVector;

/// Feature-hashing embedder over lowercase word unigrams and bigrams.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dim: usize,
}

impl HashedEmbedder {
    /// Creates an embedder producing `dim`-dimensional vectors.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn accumulate(&self, v: &mut DVector<f64>, feature: &str) {
        let h = fnv1a(feature.as_bytes());
        let bucket = (h % self.dim as u64) as usize;
        // Second hash decides the sign, which keeps hash collisions from
        // systematically inflating bucket magnitudes.
        let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign;
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Embedder for HashedEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> DVector<f64> {
        let mut v = DVector::zeros(self.dim);
        let tokens = Self::tokens(text);

        for token in &tokens {
            self.accumulate(&mut v, token);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut v, &format!("{} {}", pair[0], pair[1]));
        }

        let norm = v.norm();
        if norm > 0.0 {
            v /= norm;
        }
        v
    }
}

/// FNV-1a, fixed here rather than taken from `DefaultHasher` so vectors
/// stay stable across Rust releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
