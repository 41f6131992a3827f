//! Built-in query catalog for the review-reading experiment.
//!
//! One pool of ~10 topical search queries per persona archetype, plus the
//! shared generic query every persona issues. This is collaborator data:
//! the core only ever sees it through `QueryCatalog`.

use hindsight_core::{PersonaTopic, QueryCatalog};
use std::collections::HashMap;

/// Generic query appended to every retrieval call.
pub const GENERIC_QUERY: &str = "overall game review summary and current state";

/// Builds the default per-archetype query catalog.
pub fn default_catalog() -> QueryCatalog {
    let mut pools: HashMap<PersonaTopic, Vec<String>> = HashMap::new();

    pools.insert(
        PersonaTopic::UltimateGamer,
        to_strings(&[
            "graphics quality and visual details",
            "ray tracing performance and visual fidelity review",
            "depth of open world and immersion level",
            "gameplay features and mechanics depth",
            "high-end PC performance benchmark results",
            "review of main story and side content volume",
            "is the game world alive or empty detailed review",
            "texture quality and next-gen features analysis",
            "immersive sim elements",
            "overall game quality assessment for enthusiasts",
        ]),
    );

    pools.insert(
        PersonaTopic::AllRoundEnthusiast,
        to_strings(&[
            "detailed gameplay review pros and cons",
            "balance between story and action gameplay",
            "quest design variety and quality assessment",
            "character progression system deep dive",
            "combat mechanics shooting and melee feeling",
            "technical state and polish level review",
            "is it a good RPG game",
            "meaningful choices and consequences in gameplay",
            "driving mechanics and city exploration review",
            "comprehensive review of the game's current state",
        ]),
    );

    pools.insert(
        PersonaTopic::CloudGamer,
        to_strings(&[
            "current optimization status",
            "performance on low-end hardware and older GPUs",
            "fps stability and stuttering issues report",
            "game crash frequency and stability review",
            "cloud gaming experience and input lag",
            "is the game playable on a budget PC",
            "texture loading and pop-in issues status",
            "patch notes regarding performance improvements",
            "frame rate test on medium settings",
            "bug and glitch status after recent updates",
        ]),
    );

    pools.insert(
        PersonaTopic::ConventionalPlayer,
        to_strings(&[
            "is the game fun for casual players",
            "comparison with other open world games",
            "is the open world fun to explore",
            "learning curve and difficulty for beginners",
            "general user review summary positive or negative",
            "action adventure elements and pacing",
            "are there game breaking bugs right now",
            "mainstream audience reception and ratings",
            "controls and ui user experience review",
            "is it a polished experience or buggy mess",
        ]),
    );

    pools.insert(
        PersonaTopic::HardwareEnthusiast,
        to_strings(&[
            "technical graphics analysis",
            "implementation of DLSS and ray tracing",
            "lighting shadows and reflection quality review",
            "GPU benchmark test rtx series",
            "visual fidelity and graphical options",
            "engine capabilities and physics",
            "screenshot showcase and visual details",
            "performance scaling on ultra settings",
            "graphical bugs and visual artifacts report",
            "is it a next-gen graphical showcase",
        ]),
    );

    pools.insert(
        PersonaTopic::PopcornGamer,
        to_strings(&[
            "cinematic storytelling quality",
            "review of acting and cutscenes direction",
            "funny glitches and physics engine bugs compilation",
            "main character arc review",
            "emotional impact of the main storyline",
            "dialogue system and voice acting quality",
            "visual style and art direction critique",
            "is the story engaging to watch",
            "memorable moments and set pieces",
            "entertainment value of the game narrative",
        ]),
    );

    pools.insert(
        PersonaTopic::BackseatGamer,
        to_strings(&[
            "lore and world building depth",
            "quality of writing and narrative themes",
            "atmosphere and setting review",
            "comparison to classic immersive storytelling",
            "complexity of role playing elements",
            "main plot summary and quality check",
            "character development and relationships",
            "is the story mature and thought provoking",
            "side quests narrative quality",
            "does the game respect the source material",
        ]),
    );

    pools.insert(
        PersonaTopic::TimeFiller,
        to_strings(&[
            "value for money review",
            "is the game worth the full price tag",
            "current state of refund policy and issues",
            "average playtime and content volume",
            "is it good for short gaming sessions",
            "game stability and save corruption risks",
            "buyer satisfaction survey results",
            "wait for sale or buy now recommendation",
            "price vs quality assessment",
            "casual perspective on the game",
        ]),
    );

    QueryCatalog::new(pools, GENERIC_QUERY)
}

fn to_strings(queries: &[&str]) -> Vec<String> {
    queries.iter().map(|q| q.to_string()).collect()
}
