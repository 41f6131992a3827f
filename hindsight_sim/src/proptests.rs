//! Randomized property tests over the retrieval pipeline.
//!
//! The corpus, queries, and cutoff dates are all generated; the properties
//! are the contract of the engine: causality, bounding, determinism, and
//! decay monotonicity.

use chrono::{Days, NaiveDate};
use hindsight_core::{
    Document, DocumentStore, Embedder, PersonaTopic, Query, QuerySource, RetrievalConfig,
    RetrievalRequest, TemporalRanker,
};
use proptest::prelude::*;
use std::collections::HashMap;

use crate::embedder::HashedEmbedder;

const WORDS: &[&str] = &[
    "crash", "patch", "story", "graphics", "performance", "bug", "quest", "world", "price",
    "review", "stutter", "immersion",
];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 12, 10).unwrap()
}

prop_compose! {
    fn arb_text()(indices in prop::collection::vec(0..WORDS.len(), 2..8)) -> String {
        indices.iter().map(|&i| WORDS[i]).collect::<Vec<_>>().join(" ")
    }
}

fn arb_corpus() -> impl Strategy<Value = Vec<(u64, u64, String)>> {
    prop::collection::vec((0u64..365, arb_text()), 1..40).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (offset, text))| (i as u64, offset, text))
            .collect()
    })
}

fn build_store(corpus: &[(u64, u64, String)]) -> (DocumentStore, HashMap<u64, NaiveDate>) {
    let embedder = HashedEmbedder::default();
    let mut dates = HashMap::new();

    let docs: Vec<Document> = corpus
        .iter()
        .map(|(id, offset, text)| {
            let date = base_date() + Days::new(*offset);
            dates.insert(*id, date);
            Document::new(*id, date, text.clone(), embedder.embed(text))
        })
        .collect();

    let store = DocumentStore::load(Box::new(embedder), docs).expect("generated corpus is valid");
    (store, dates)
}

fn request(queries: Vec<String>, as_of: NaiveDate) -> RetrievalRequest {
    RetrievalRequest {
        topic: PersonaTopic::CloudGamer,
        queries: queries
            .into_iter()
            .map(|text| Query {
                text,
                source: QuerySource::Topic(PersonaTopic::CloudGamer),
            })
            .collect(),
        as_of,
    }
}

proptest! {
    #[test]
    fn prop_causality_and_bounding(
        corpus in arb_corpus(),
        queries in prop::collection::vec(arb_text(), 1..5),
        as_of_offset in 0u64..500,
        decay_rate in 0.0f64..0.2,
        top_k in 1usize..10,
    ) {
        let (store, dates) = build_store(&corpus);
        let ranker = TemporalRanker::new(RetrievalConfig {
            decay_rate,
            top_k_final: top_k,
            ..Default::default()
        }).unwrap();

        let as_of = base_date() + Days::new(as_of_offset);
        let evidence = ranker.rank(&store, &request(queries, as_of)).unwrap();

        // Bounding: never more than top_k items.
        prop_assert!(evidence.len() <= top_k);

        // Causality: every returned document predates the cutoff.
        for item in &evidence.items {
            prop_assert!(dates[&item.doc_id] <= as_of);
        }

        // Scores are sorted descending with id tie-break.
        for pair in evidence.items.windows(2) {
            prop_assert!(
                pair[0].final_score > pair[1].final_score
                    || (pair[0].final_score == pair[1].final_score
                        && pair[0].doc_id < pair[1].doc_id)
            );
        }
    }

    #[test]
    fn prop_empty_when_corpus_is_future(
        corpus in arb_corpus(),
        queries in prop::collection::vec(arb_text(), 1..5),
    ) {
        let (store, _) = build_store(&corpus);
        let ranker = TemporalRanker::new(RetrievalConfig::default()).unwrap();

        // Cutoff one day before the earliest possible document.
        let as_of = base_date() - Days::new(1);
        let evidence = ranker.rank(&store, &request(queries, as_of)).unwrap();
        prop_assert!(evidence.is_empty());
    }

    #[test]
    fn prop_rank_is_deterministic(
        corpus in arb_corpus(),
        queries in prop::collection::vec(arb_text(), 1..5),
        as_of_offset in 0u64..500,
    ) {
        let (store, _) = build_store(&corpus);
        let ranker = TemporalRanker::new(RetrievalConfig::default()).unwrap();
        let req = request(queries, base_date() + Days::new(as_of_offset));

        let first = ranker.rank(&store, &req).unwrap();
        let second = ranker.rank(&store, &req).unwrap();

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.items.iter().zip(second.items.iter()) {
            prop_assert_eq!(a.doc_id, b.doc_id);
            prop_assert_eq!(a.final_score, b.final_score);
        }
    }

    #[test]
    fn prop_decay_prefers_recent_twins(
        text in arb_text(),
        older_offset in 0u64..180,
        gap in 1u64..180,
        decay_rate in 0.001f64..0.2,
    ) {
        // Two documents with identical text (hence identical similarity),
        // one strictly older: the newer one must never rank below it.
        let embedder = HashedEmbedder::default();
        let older_date = base_date() + Days::new(older_offset);
        let newer_date = older_date + Days::new(gap);

        let docs = vec![
            Document::new(0, older_date, text.clone(), embedder.embed(&text)),
            Document::new(1, newer_date, text.clone(), embedder.embed(&text)),
        ];
        let store = DocumentStore::load(Box::new(embedder), docs).unwrap();
        let ranker = TemporalRanker::new(RetrievalConfig {
            decay_rate,
            ..Default::default()
        }).unwrap();

        let as_of = newer_date + Days::new(10);
        let evidence = ranker.rank(&store, &request(vec![text], as_of)).unwrap();

        prop_assert_eq!(evidence.len(), 2);
        prop_assert_eq!(evidence.items[0].doc_id, 1);
        prop_assert!(evidence.items[0].final_score >= evidence.items[1].final_score);
    }
}
