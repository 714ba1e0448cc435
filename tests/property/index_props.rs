//! Inverted index property tests.
//!
//! These verify the index invariants:
//! - Posting list length equals document frequency for every kept token
//! - Stored weights are strictly positive
//! - Posting lists are in ascending document order
//! - Candidate lists are bounded, sorted, and in [0, 1]
//! - Fitting a disjoint extra document leaves posting membership intact
//! - Uniformly doubling term frequencies does not move cosine scores

use proptest::prelude::*;
use refine::types::{Item, ItemCollection};
use refine::{CosineIndex, VectorIndex};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// STRATEGIES
// ============================================================================

/// A small closed token pool keeps document frequencies in the interesting
/// range where pruning actually bites.
const TOKEN_POOL: &[&str] = &[
    "бумага", "ручка", "ластик", "карандаш", "степлер", "скрепка", "папка", "маркер",
];

fn token_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(TOKEN_POOL).prop_map(str::to_string)
}

fn corpus_strategy() -> impl Strategy<Value = ItemCollection> {
    prop::collection::vec(prop::collection::vec(token_strategy(), 1..6), 2..12).prop_map(
        |token_lists| ItemCollection {
            items: token_lists
                .into_iter()
                .enumerate()
                .map(|(i, tokens)| {
                    let text = tokens.join(" ");
                    Item {
                        item_id: format!("raw:{i}"),
                        name: text.clone(),
                        tokens,
                        attrs: BTreeMap::new(),
                        text_repr: text,
                    }
                })
                .collect(),
            source: "prop".to_string(),
        },
    )
}

fn query_strategy() -> impl Strategy<Value = ItemCollection> {
    prop::collection::vec(token_strategy(), 1..5).prop_map(|tokens| ItemCollection {
        items: vec![Item {
            item_id: "txt:0".to_string(),
            name: tokens.join(" "),
            tokens: tokens.clone(),
            attrs: BTreeMap::new(),
            text_repr: tokens.join(" "),
        }],
        source: "query".to_string(),
    })
}

/// Document frequency computed independently of the index.
fn doc_frequency(corpus: &ItemCollection, token: &str) -> usize {
    corpus
        .items
        .iter()
        .filter(|item| item.tokens.iter().any(|t| t == token))
        .count()
}

// ============================================================================
// INDEX PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: posting list length equals df, and weights are positive.
    #[test]
    fn prop_postings_match_df(corpus in corpus_strategy()) {
        let mut index = CosineIndex::new();
        index.fit(&corpus);

        for token in index.vocab_tokens() {
            let postings = index.postings(token).expect("vocab token has postings");
            prop_assert_eq!(
                postings.len(),
                doc_frequency(&corpus, token),
                "postings/df mismatch for '{}'", token
            );
            for &(_, weight) in postings {
                prop_assert!(weight > 0.0);
            }
        }
    }

    /// Property: posting lists are in ascending document order.
    #[test]
    fn prop_postings_in_doc_order(corpus in corpus_strategy()) {
        let mut index = CosineIndex::new();
        index.fit(&corpus);

        for token in index.vocab_tokens() {
            let postings = index.postings(token).unwrap();
            for pair in postings.windows(2) {
                prop_assert!(pair[0].0 < pair[1].0);
            }
        }
    }

    /// Property: candidate lists are bounded by top_k, sorted by descending
    /// score, and every score is a cosine in (0, 1].
    #[test]
    fn prop_candidates_sorted_and_bounded(
        corpus in corpus_strategy(),
        query in query_strategy(),
        top_k in 1usize..6,
    ) {
        let mut index = CosineIndex::new();
        index.fit(&corpus);

        let matches = &index.search(&query, top_k)[0];
        prop_assert!(matches.len() <= top_k);
        for pair in matches.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for m in matches {
            prop_assert!(m.score > 0.0 && m.score <= 1.0 + 1e-9);
        }
    }

    /// Property: with no truncation and no gate, the candidate set is
    /// exactly the set of documents sharing a vocabulary token with the
    /// query (every stored weight is positive, so sharing implies sim > 0).
    #[test]
    fn prop_full_k_returns_every_overlapping_doc(
        corpus in corpus_strategy(),
        query in query_strategy(),
    ) {
        let mut index = CosineIndex::new();
        index.fit(&corpus);

        let query_tokens: HashSet<&str> =
            query.items[0].tokens.iter().map(String::as_str).collect();
        let mut expected = HashSet::new();
        for token in &query_tokens {
            if let Some(postings) = index.postings(token) {
                for &(doc_idx, _) in postings {
                    expected.insert(corpus.items[doc_idx].item_id.clone());
                }
            }
        }

        let matches = &index.search(&query, corpus.len())[0];
        let got: HashSet<String> = matches.iter().map(|m| m.item_id.clone()).collect();
        prop_assert_eq!(got, expected);
    }

    /// Property: fitting with an extra document whose tokens are disjoint
    /// from the rest leaves the posting membership of existing tokens
    /// untouched (weights shift with idf, membership must not).
    #[test]
    fn prop_disjoint_doc_preserves_posting_membership(corpus in corpus_strategy()) {
        let mut index = CosineIndex::new();
        index.fit(&corpus);
        let before: Vec<(String, Vec<usize>)> = index
            .vocab_tokens()
            .iter()
            .map(|t| {
                let docs = index.postings(t).unwrap().iter().map(|&(d, _)| d).collect();
                (t.to_string(), docs)
            })
            .collect();

        // Tokens deliberately outside TOKEN_POOL.
        let mut extended = corpus.clone();
        extended.items.push(Item {
            item_id: format!("raw:{}", corpus.len()),
            name: "зимняя шина".to_string(),
            tokens: vec!["зимняя".to_string(), "шина".to_string()],
            attrs: BTreeMap::new(),
            text_repr: "зимняя шина".to_string(),
        });
        let mut extended_index = CosineIndex::new();
        extended_index.fit(&extended);

        for (token, docs) in before {
            let after: Vec<usize> = extended_index
                .postings(&token)
                .expect("token kept: df unchanged, bounds only loosen")
                .iter()
                .map(|&(d, _)| d)
                .collect();
            prop_assert_eq!(after, docs, "membership changed for '{}'", token);
        }
    }

    /// Property: doubling every document's term frequencies rescales each
    /// document vector uniformly, so cosine scores do not move.
    #[test]
    fn prop_tf_doubling_is_cosine_invariant(
        corpus in corpus_strategy(),
        query in query_strategy(),
    ) {
        let mut index = CosineIndex::new();
        index.fit(&corpus);
        let baseline = &index.search(&query, corpus.len())[0];

        let doubled = ItemCollection {
            items: corpus
                .items
                .iter()
                .map(|item| {
                    let mut tokens = item.tokens.clone();
                    tokens.extend(item.tokens.iter().cloned());
                    Item {
                        tokens,
                        ..item.clone()
                    }
                })
                .collect(),
            source: corpus.source.clone(),
        };
        let mut doubled_index = CosineIndex::new();
        doubled_index.fit(&doubled);
        let rescored = &doubled_index.search(&query, corpus.len())[0];

        prop_assert_eq!(baseline.len(), rescored.len());
        for (a, b) in baseline.iter().zip(rescored) {
            prop_assert_eq!(&a.item_id, &b.item_id);
            prop_assert!((a.score - b.score).abs() < 1e-9, "{} vs {}", a.score, b.score);
        }
    }
}
