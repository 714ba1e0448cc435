// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! Sparse TF-IDF cosine index with inverted posting lists.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **POSTINGS_IN_DOC_ORDER**: each posting list is sorted by ascending
//!    document index, because documents are ingested in order and each
//!    contributes at most one posting per token.
//! 2. **POSTINGS_MATCH_DF**: after `fit`, `postings[tid].len()` equals the
//!    document frequency of the vocabulary token `tid`.
//! 3. **POSITIVE_WEIGHTS**: every stored weight is > 0; smoothed IDF is
//!    ≥ 1 and term frequencies and boosts are positive.
//! 4. **SAFE_NORMS**: `doc_norms` never stores 0 (a degenerate document
//!    stores 1.0), so cosine division is always defined.
//!
//! Query cost is proportional to the summed posting-list lengths of the
//! query tokens present in the vocabulary.

use super::VectorIndex;
use crate::config::{
    BRAND_BOOST, MAX_DF_RATIO, MIN_DF, NAME_BOOST, QUERY_TF_CLIP, SKU_ANCHOR_BOOST,
    SKU_FIELD_BOOST,
};
use crate::text::is_sku_like;
use crate::types::{Item, ItemCollection, Match};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sparse TF-IDF cosine index over an item corpus.
///
/// Built once by [`VectorIndex::fit`] and immutable afterward; a fitted
/// index is safe to share across concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct CosineIndex {
    /// token → contiguous id, assigned in first-encounter order.
    vocab: HashMap<String, usize>,
    /// Smoothed inverse document frequency per vocab id.
    idf: Vec<f64>,
    /// Per vocab id: `(doc_index, weight)` pairs in document order.
    postings: Vec<Vec<(usize, f64)>>,
    /// Euclidean norm of each document vector, 1.0 when degenerate.
    doc_norms: Vec<f64>,
    /// Preserved attributes per document, for match meta.
    doc_meta: Vec<BTreeMap<String, String>>,
    /// Original item id per document index.
    doc_ids: Vec<String>,
}

/// Term frequencies over a token slice.
fn term_frequencies(tokens: &[String]) -> HashMap<&str, usize> {
    let mut tf: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        *tf.entry(token.as_str()).or_insert(0) += 1;
    }
    tf
}

impl CosineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in the fitted corpus.
    pub fn num_docs(&self) -> usize {
        self.doc_ids.len()
    }

    /// Number of tokens that survived vocabulary pruning.
    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    /// The posting list for a token, if it is in the vocabulary.
    pub fn postings(&self, token: &str) -> Option<&[(usize, f64)]> {
        self.vocab.get(token).map(|&tid| self.postings[tid].as_slice())
    }

    /// Tokens kept in the vocabulary, in id order.
    pub fn vocab_tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<(&str, usize)> = self
            .vocab
            .iter()
            .map(|(token, &tid)| (token.as_str(), tid))
            .collect();
        tokens.sort_by_key(|&(_, tid)| tid);
        tokens.into_iter().map(|(token, _)| token).collect()
    }

    fn build(&mut self, corpus: &ItemCollection) {
        let num_docs = corpus.items.len();
        self.doc_ids = corpus.items.iter().map(|it| it.item_id.clone()).collect();

        // Document frequency over per-document distinct tokens, tracking
        // first-encounter order so vocab ids stay deterministic.
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut encounter_order: Vec<&str> = Vec::new();
        for item in &corpus.items {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in &item.tokens {
                if seen.insert(token.as_str()) {
                    let count = df.entry(token.as_str()).or_insert_with(|| {
                        encounter_order.push(token.as_str());
                        0
                    });
                    *count += 1;
                }
            }
        }

        // Vocabulary pruning: MIN_DF <= df <= max(1, MAX_DF_RATIO * N).
        let max_df = std::cmp::max(1, (MAX_DF_RATIO * num_docs as f64) as usize);
        self.vocab = HashMap::new();
        let mut kept: Vec<&str> = Vec::new();
        for token in &encounter_order {
            let freq = df[token];
            if freq >= MIN_DF && freq <= max_df {
                self.vocab.insert((*token).to_string(), kept.len());
                kept.push(*token);
            }
        }

        // Smoothed IDF: ln((1+N)/(1+df)) + 1, always >= 1.
        self.idf = kept
            .iter()
            .map(|token| ((1.0 + num_docs as f64) / (1.0 + df[token] as f64)).ln() + 1.0)
            .collect();

        // Field-boosted weights, norms, postings, meta in one pass over docs.
        self.postings = vec![Vec::new(); kept.len()];
        self.doc_norms = vec![0.0; num_docs];
        self.doc_meta = Vec::with_capacity(num_docs);

        for (doc_idx, item) in corpus.items.iter().enumerate() {
            let weights = self.document_weights(item);
            let norm = weights.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
            self.doc_norms[doc_idx] = if norm > 0.0 { norm } else { 1.0 };
            for (tid, weight) in weights {
                self.postings[tid].push((doc_idx, weight));
            }
            self.doc_meta.push(Self::meta_for(item));
        }
    }

    /// `(vocab id, tf · idf · boost)` for each vocab token of a document.
    ///
    /// The field boosts are substring checks against the lowercased SKU,
    /// brand, and name, composed multiplicatively.
    fn document_weights(&self, item: &Item) -> Vec<(usize, f64)> {
        let name_hint = item.name.to_lowercase();
        let sku_hint = item.attrs.get("sku").map(|s| s.to_lowercase());
        let brand_hint = item.attrs.get("brand").map(|s| s.to_lowercase());

        let mut weights = Vec::new();
        for (token, count) in term_frequencies(&item.tokens) {
            let Some(&tid) = self.vocab.get(token) else {
                continue;
            };
            let mut boost = 1.0;
            if sku_hint.as_deref().is_some_and(|sku| sku.contains(token)) {
                boost *= SKU_FIELD_BOOST;
            }
            if brand_hint.as_deref().is_some_and(|brand| brand.contains(token)) {
                boost *= BRAND_BOOST;
            }
            if !name_hint.is_empty() && name_hint.contains(token) {
                boost *= NAME_BOOST;
            }
            weights.push((tid, count as f64 * self.idf[tid] * boost));
        }
        weights
    }

    /// Query-side weights: clipped tf, IDF, and the SKU anchor boost.
    ///
    /// The anchor flag is computed once for the whole query item; the boost
    /// then applies only to the tokens that are themselves SKU-shaped.
    fn query_vector(&self, tokens: &[String]) -> (Vec<(usize, f64)>, f64) {
        let has_sku_anchor = tokens.iter().any(|t| is_sku_like(t));
        let mut weights = Vec::new();
        for (token, count) in term_frequencies(tokens) {
            let Some(&tid) = self.vocab.get(token) else {
                continue;
            };
            let clipped = count.min(QUERY_TF_CLIP);
            let boost = if has_sku_anchor && is_sku_like(token) {
                SKU_ANCHOR_BOOST
            } else {
                1.0
            };
            weights.push((tid, clipped as f64 * self.idf[tid] * boost));
        }
        let norm = weights.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        (weights, if norm > 0.0 { norm } else { 1.0 })
    }

    /// Rank the corpus against one query item.
    fn search_item(&self, item: &Item, top_k: usize) -> Vec<Match> {
        let (q_weights, q_norm) = self.query_vector(&item.tokens);
        if q_weights.is_empty() {
            return Vec::new();
        }

        let mut dots: HashMap<usize, f64> = HashMap::new();
        for &(tid, q_weight) in &q_weights {
            for &(doc_idx, d_weight) in &self.postings[tid] {
                *dots.entry(doc_idx).or_insert(0.0) += q_weight * d_weight;
            }
        }

        let mut ranked: Vec<(usize, f64)> = Vec::with_capacity(dots.len());
        for (doc_idx, dot) in dots {
            let denom = self.doc_norms[doc_idx] * q_norm;
            if denom <= 0.0 {
                continue;
            }
            let sim = dot / denom;
            if sim > 0.0 {
                ranked.push((doc_idx, sim));
            }
        }

        // Descending score; insertion order (ascending doc index) on ties,
        // because float sums are not associative across runs.
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(top_k);

        ranked
            .into_iter()
            .map(|(doc_idx, score)| Match {
                item_id: self.doc_ids[doc_idx].clone(),
                score,
                meta: self.doc_meta[doc_idx].clone(),
            })
            .collect()
    }

    /// Attributes worth carrying into match meta; `name` is always stored.
    fn meta_for(item: &Item) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        for key in ["price", "sku", "marketplace", "id"] {
            if let Some(value) = item.attrs.get(key) {
                meta.insert(key.to_string(), value.clone());
            }
        }
        meta.insert("name".to_string(), item.name.clone());
        meta
    }
}

impl VectorIndex for CosineIndex {
    fn fit(&mut self, corpus: &ItemCollection) {
        self.build(corpus);
    }

    #[cfg(feature = "parallel")]
    fn search(&self, query: &ItemCollection, top_k: usize) -> Vec<Vec<Match>> {
        query
            .items
            .par_iter()
            .map(|item| self.search_item(item, top_k))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn search(&self, query: &ItemCollection, top_k: usize) -> Vec<Vec<Match>> {
        query
            .items
            .iter()
            .map(|item| self.search_item(item, top_k))
            .collect()
    }
}
