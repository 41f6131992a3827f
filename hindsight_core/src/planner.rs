//! Query planning - bounded, seeded query selection per retrieval call.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persona archetypes from the reference study's reviewer taxonomy.
///
/// Each archetype owns a pool of topical search queries; the planner
/// samples from that pool per retrieval call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonaTopic {
    /// Chases graphics, immersion, and content volume
    UltimateGamer,

    /// Weighs story, combat, and polish evenly
    AllRoundEnthusiast,

    /// Cares about optimization and low-end performance
    CloudGamer,

    /// Mainstream player, compares to familiar titles
    ConventionalPlayer,

    /// Benchmarks, DLSS, ray tracing
    HardwareEnthusiast,

    /// Watches for cinematic storytelling
    PopcornGamer,

    /// Reads for lore, writing, and world building
    BackseatGamer,

    /// Value-for-money and session-length oriented
    TimeFiller,
}

impl PersonaTopic {
    /// Returns every archetype, in canonical order.
    pub fn all() -> Vec<PersonaTopic> {
        vec![
            PersonaTopic::UltimateGamer,
            PersonaTopic::AllRoundEnthusiast,
            PersonaTopic::CloudGamer,
            PersonaTopic::ConventionalPlayer,
            PersonaTopic::HardwareEnthusiast,
            PersonaTopic::PopcornGamer,
            PersonaTopic::BackseatGamer,
            PersonaTopic::TimeFiller,
        ]
    }

    /// Returns the snake_case name of the archetype.
    pub fn name(&self) -> &'static str {
        match self {
            PersonaTopic::UltimateGamer => "ultimate_gamer",
            PersonaTopic::AllRoundEnthusiast => "all_round_enthusiast",
            PersonaTopic::CloudGamer => "cloud_gamer",
            PersonaTopic::ConventionalPlayer => "conventional_player",
            PersonaTopic::HardwareEnthusiast => "hardware_enthusiast",
            PersonaTopic::PopcornGamer => "popcorn_gamer",
            PersonaTopic::BackseatGamer => "backseat_gamer",
            PersonaTopic::TimeFiller => "time_filler",
        }
    }
}

impl std::fmt::Display for PersonaTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PersonaTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ultimate_gamer" => Ok(PersonaTopic::UltimateGamer),
            "all_round_enthusiast" => Ok(PersonaTopic::AllRoundEnthusiast),
            "cloud_gamer" => Ok(PersonaTopic::CloudGamer),
            "conventional_player" => Ok(PersonaTopic::ConventionalPlayer),
            "hardware_enthusiast" => Ok(PersonaTopic::HardwareEnthusiast),
            "popcorn_gamer" => Ok(PersonaTopic::PopcornGamer),
            "backseat_gamer" => Ok(PersonaTopic::BackseatGamer),
            "time_filler" => Ok(PersonaTopic::TimeFiller),
            _ => Err(format!("Unknown persona topic: {}", s)),
        }
    }
}

/// Where a query came from: a persona's topic pool, or the shared
/// generic query appended to every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Topic(PersonaTopic),
    Generic,
}

/// A query string tagged with its origin. Built per call, never persisted.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub source: QuerySource,
}

/// Static per-topic query pools plus the one shared generic query.
///
/// Sourced from an external persona/query generator; the planner only
/// samples from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCatalog {
    pools: HashMap<PersonaTopic, Vec<String>>,
    generic: String,
}

impl QueryCatalog {
    /// Creates a catalog from per-topic pools and a generic query.
    pub fn new(pools: HashMap<PersonaTopic, Vec<String>>, generic: impl Into<String>) -> Self {
        Self {
            pools,
            generic: generic.into(),
        }
    }

    /// Returns the pool for a topic (empty slice if the topic has none).
    pub fn pool(&self, topic: PersonaTopic) -> &[String] {
        self.pools.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the shared generic query.
    pub fn generic(&self) -> &str {
        &self.generic
    }
}

/// Selects a bounded query set per retrieval call.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    catalog: QueryCatalog,

    /// Topic queries sampled per call (the generic query is extra)
    queries_per_call: usize,
}

impl QueryPlanner {
    /// Creates a planner over the given catalog.
    pub fn new(catalog: QueryCatalog, queries_per_call: usize) -> Self {
        Self {
            catalog,
            queries_per_call,
        }
    }

    /// Plans the query set for one retrieval call.
    ///
    /// Samples `queries_per_call` pool entries without replacement,
    /// uniformly from the injected RNG, then appends the generic query.
    /// A pool smaller than the sample size is used whole; that is the
    /// documented fallback, not an error.
    pub fn plan<R: Rng>(&self, topic: PersonaTopic, rng: &mut R) -> Vec<Query> {
        let pool = self.catalog.pool(topic);

        let mut queries: Vec<Query> = pool
            .choose_multiple(rng, self.queries_per_call)
            .map(|text| Query {
                text: text.clone(),
                source: QuerySource::Topic(topic),
            })
            .collect();

        queries.push(Query {
            text: self.catalog.generic().to_string(),
            source: QuerySource::Generic,
        });

        queries
    }
}
