//! Decision backend seam.
//!
//! The real experiment hands the evidence set to an LLM completion
//! endpoint and parses its JSON answer. That network call is outside this
//! repository; the trait below is the seam, and [`KeywordBackend`] is the
//! deterministic stand-in the simulation harness runs with.

use async_trait::async_trait;
use chrono::NaiveDate;
use hindsight_core::EvidenceSet;
use serde::{Deserialize, Serialize};

use crate::personas::Persona;

/// A persona's final purchase decision for one simulated date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Yes,
    No,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Yes => write!(f, "YES"),
            Decision::No => write!(f, "NO"),
        }
    }
}

/// Renders a decision from a persona's ranked evidence.
#[async_trait]
pub trait DecisionBackend: Send + Sync {
    /// Decides based strictly on the supplied evidence.
    ///
    /// An empty evidence set is a valid input ("no reviews found yet"),
    /// not an error; backends must handle it.
    async fn decide(
        &self,
        persona: &Persona,
        as_of: NaiveDate,
        evidence: &EvidenceSet,
    ) -> Decision;
}

/// Deterministic keyword-polarity backend.
///
/// Counts positive and negative signal words across the evidence texts and
/// buys when positives strictly outnumber negatives. With no evidence it
/// declines: an agent that has read nothing does not buy.
#[derive(Debug, Clone, Default)]
pub struct KeywordBackend;

const POSITIVE_MARKERS: &[&str] = &[
    "stunning", "smooth", "gripping", "memorable", "alive", "varied", "worth", "fixed", "safe",
    "great",
];

const NEGATIVE_MARKERS: &[&str] = &[
    "crashes",
    "stuttering",
    "unplayable",
    "rushed",
    "shallow",
    "empty",
    "refund",
    "corruption",
    "breaking",
    "artifacts",
];

#[async_trait]
impl DecisionBackend for KeywordBackend {
    async fn decide(
        &self,
        _persona: &Persona,
        _as_of: NaiveDate,
        evidence: &EvidenceSet,
    ) -> Decision {
        if evidence.is_empty() {
            return Decision::No;
        }

        let mut positives = 0usize;
        let mut negatives = 0usize;

        for text in evidence.texts() {
            let lower = text.to_lowercase();
            positives += POSITIVE_MARKERS
                .iter()
                .filter(|m| lower.contains(*m))
                .count();
            negatives += NEGATIVE_MARKERS
                .iter()
                .filter(|m| lower.contains(*m))
                .count();
        }

        if positives > negatives {
            Decision::Yes
        } else {
            Decision::No
        }
    }
}
