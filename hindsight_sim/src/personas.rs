//! Persona population for the simulation grid.

use hindsight_core::PersonaTopic;
use serde::{Deserialize, Serialize};

/// One simulated decision agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier within a run
    pub id: u64,

    /// Archetype driving this persona's query pool
    pub topic: PersonaTopic,
}

/// Generates a balanced population: `n_per_type` personas per archetype.
///
/// Ids are assigned in archetype order, so the population for a given
/// `n_per_type` is identical across runs regardless of seed.
pub fn generate_balanced(n_per_type: usize) -> Vec<Persona> {
    let mut personas = Vec::with_capacity(n_per_type * PersonaTopic::all().len());
    let mut next_id = 0;

    for topic in PersonaTopic::all() {
        for _ in 0..n_per_type {
            personas.push(Persona { id: next_id, topic });
            next_id += 1;
        }
    }

    personas
}
