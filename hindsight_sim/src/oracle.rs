//! Ground truth corpus oracle.
//!
//! Generates the synthetic dated review corpus a simulation runs against,
//! from a known sentiment timeline: a rough launch followed by gradual
//! patching. Because the oracle knows the true sentiment of every date,
//! tests can assert retrieval behavior against ground truth instead of
//! eyeballing output.

use chrono::{Days, NaiveDate};
use hindsight_core::{Document, Embedder};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

/// Parameters of the synthetic review timeline.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// First publication date of the corpus
    pub start_date: NaiveDate,

    /// Number of days the corpus spans
    pub days: u64,

    /// Reviews published per day
    pub reviews_per_day: usize,

    /// True sentiment at launch, in [-1, 1]
    pub launch_sentiment: f64,

    /// Sentiment gained per day of patching
    pub recovery_per_day: f64,

    /// Per-review sentiment noise (standard deviation)
    pub noise_std: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 12, 10).unwrap(),
            days: 180,
            reviews_per_day: 4,
            launch_sentiment: -0.6,
            recovery_per_day: 0.008,
            noise_std: 0.25,
        }
    }
}

/// Review fragments per aspect, one positive and one negative variant each.
///
/// The aspects mirror what the persona query pools ask about, so topical
/// queries genuinely pull different slices of the corpus.
const ASPECTS: &[(&str, &str)] = &[
    (
        "the graphics are stunning with ray tracing on, a real next-gen showcase",
        "textures pop in constantly and the visual artifacts are distracting",
    ),
    (
        "performance is smooth now even on older GPUs, great optimization work",
        "constant crashes and stuttering, fps drops make it unplayable on budget hardware",
    ),
    (
        "the story is gripping and the characters are memorable",
        "the narrative feels rushed and the side quests are shallow",
    ),
    (
        "quest design is varied and the open world feels alive",
        "the open world is empty and the AI breaks immersion",
    ),
    (
        "well worth the full price, dozens of hours of content",
        "wait for a sale, refund requests are still common",
    ),
    (
        "the latest patch fixed most stability issues, saves are safe now",
        "game breaking bugs remain after the update, save corruption reported",
    ),
];

/// The corpus oracle.
pub struct CorpusOracle {
    config: OracleConfig,
    rng: ChaCha8Rng,
}

impl CorpusOracle {
    /// Creates an oracle with its own seeded RNG.
    ///
    /// The corpus seed should be derived separately from the grid seed so
    /// that changing the experiment schedule doesn't change the corpus.
    pub fn new(seed: u64, config: OracleConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// True sentiment of the timeline on the given date, clamped to [-1, 1].
    pub fn true_sentiment(&self, date: NaiveDate) -> f64 {
        let age = (date - self.config.start_date).num_days().max(0) as f64;
        (self.config.launch_sentiment + self.config.recovery_per_day * age).clamp(-1.0, 1.0)
    }

    /// Generates the full corpus, embedding every review.
    pub fn generate(&mut self, embedder: &dyn Embedder) -> Vec<Document> {
        let noise = Normal::new(0.0, self.config.noise_std)
            .unwrap_or_else(|_| Normal::new(0.0, 0.0).unwrap());
        let mut documents = Vec::new();
        let mut next_id = 0;

        for day in 0..self.config.days {
            let date = self.config.start_date + Days::new(day);
            let base = self.true_sentiment(date);

            for _ in 0..self.config.reviews_per_day {
                let sentiment = (base + noise.sample(&mut self.rng)).clamp(-1.0, 1.0);
                let text = self.compose_review(sentiment);
                let embedding = embedder.embed(&text);
                documents.push(Document::new(next_id, date, text, embedding));
                next_id += 1;
            }
        }

        documents
    }

    /// Composes one review from 2-3 aspect fragments.
    ///
    /// Each fragment independently takes the positive variant with
    /// probability (sentiment + 1) / 2.
    fn compose_review(&mut self, sentiment: f64) -> String {
        let p_positive = (sentiment + 1.0) / 2.0;
        let count = self.rng.gen_range(2..=3);

        let chosen: Vec<&(&str, &str)> = ASPECTS.choose_multiple(&mut self.rng, count).collect();
        let picks: Vec<&str> = chosen
            .into_iter()
            .map(|(positive, negative)| {
                if self.rng.gen_bool(p_positive.clamp(0.0, 1.0)) {
                    *positive
                } else {
                    *negative
                }
            })
            .collect();

        picks.join(". ")
    }
}
