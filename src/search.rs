// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! The search orchestrator: gate → pick → fall back.
//!
//! This is where raw cosine candidates become answers. Candidates that pass
//! the similarity threshold compete on price: among passed matches with a
//! parseable price the cheapest wins, otherwise the highest score wins.
//! When nothing passes, two fuzzy stages get a shot at the same candidate
//! list: SKU-shaped query tokens against candidate SKUs first, then the
//! whole query text against candidate names. The stages run in order and
//! the first acceptance ends the cascade.
//!
//! Returned `top_k` lists are always the pre-threshold candidates, so a
//! caller can display near-misses next to the resolved best match.
//!
//! Nothing in here throws on content: empty queries, empty corpora, and
//! unparseable prices degrade to "no match" or "no price", never to errors.

use crate::config::{FUZZY_NAME_THRESHOLD, FUZZY_SKU_THRESHOLD};
use crate::fuzzy::sequence_ratio;
use crate::index::VectorIndex;
use crate::text::is_sku_like;
use crate::types::{Item, ItemCollection, Match, SearchResult};

/// Fit the index on `reference`, then resolve every query item.
///
/// The fit is idempotent per call: a prior state of `index` is replaced.
/// Results are aligned to `query.items` order.
pub fn search<I: VectorIndex>(
    query: &ItemCollection,
    reference: &ItemCollection,
    index: &mut I,
    top_k: usize,
    threshold: f64,
) -> Vec<SearchResult> {
    index.fit(reference);
    search_fitted(query, index, top_k, threshold)
}

/// Resolve every query item against an already-fitted index.
///
/// This is the path the registry takes for warmed catalogs: the index was
/// fitted once at warmup and is shared, immutable, by concurrent readers.
pub fn search_fitted<I: VectorIndex + ?Sized>(
    query: &ItemCollection,
    index: &I,
    top_k: usize,
    threshold: f64,
) -> Vec<SearchResult> {
    let candidates = index.search(query, top_k);
    query
        .items
        .iter()
        .zip(candidates)
        .map(|(item, matches)| resolve(item, matches, threshold))
        .collect()
}

/// Apply the threshold gate, the cheapest-among-passed rule, and the fuzzy
/// fallback cascade to one query item's candidate list.
fn resolve(item: &Item, matches: Vec<Match>, threshold: f64) -> SearchResult {
    let passed: Vec<&Match> = matches.iter().filter(|m| m.score >= threshold).collect();

    let mut best: Option<&Match> = None;
    if !passed.is_empty() {
        let mut cheapest: Option<(&Match, f64)> = None;
        for &m in &passed {
            if let Some(price) = parse_price(m.meta.get("price")) {
                if cheapest.as_ref().is_none_or(|&(_, p)| price < p) {
                    cheapest = Some((m, price));
                }
            }
        }
        best = match cheapest {
            Some((m, _)) => Some(m),
            // No parseable price anywhere: highest score, first on ties.
            None => {
                let mut top: &Match = passed[0];
                for &m in &passed[1..] {
                    if m.score > top.score {
                        top = m;
                    }
                }
                Some(top)
            }
        };
    }

    if best.is_none() {
        best = fuzzy_fallback(item, &matches);
    }

    let (best_match_id, best_score) = match best {
        Some(m) => (Some(m.item_id.clone()), m.score),
        None => (None, 0.0),
    };

    SearchResult {
        query_item_id: item.item_id.clone(),
        best_match_id,
        best_score,
        top_k: matches,
    }
}

/// Parse a meta price: strip spaces, comma decimal separator to a dot.
/// Missing or unparseable prices yield `None`, disqualifying the match from
/// the cheapest comparison without touching its score.
fn parse_price(value: Option<&String>) -> Option<f64> {
    let cleaned = value?.replace(' ', "").replace(',', ".");
    cleaned.parse::<f64>().ok()
}

/// Two-stage fuzzy rescue over the below-threshold candidate list.
///
/// Stage A compares each SKU-shaped query token against each candidate's
/// SKU and accepts the single best pair at `FUZZY_SKU_THRESHOLD`. Stage B,
/// only when stage A declines, compares the query text against candidate
/// names (both truncated to 256 chars) at `FUZZY_NAME_THRESHOLD`.
fn fuzzy_fallback<'a>(item: &Item, matches: &'a [Match]) -> Option<&'a Match> {
    let query_text = if item.text_repr.is_empty() {
        item.name.as_str()
    } else {
        item.text_repr.as_str()
    };

    // Stage A: SKU fuzzy.
    let sku_tokens: Vec<String> = query_text
        .split_whitespace()
        .filter(|t| is_sku_like(t))
        .map(str::to_lowercase)
        .collect();
    if !sku_tokens.is_empty() {
        let mut candidate: Option<&Match> = None;
        let mut best_ratio = 0.0;
        for m in matches {
            let Some(sku) = m.meta.get("sku") else { continue };
            if sku.is_empty() {
                continue;
            }
            let sku = sku.to_lowercase();
            for token in &sku_tokens {
                let ratio = sequence_ratio(token, &sku);
                if ratio > best_ratio {
                    best_ratio = ratio;
                    candidate = Some(m);
                }
            }
        }
        if best_ratio >= FUZZY_SKU_THRESHOLD {
            return candidate;
        }
    }

    // Stage B: name fuzzy.
    if query_text.is_empty() {
        return None;
    }
    let query_trunc = truncate_lower(query_text);
    let mut candidate: Option<&Match> = None;
    let mut best_ratio = 0.0;
    for m in matches {
        let Some(name) = m.meta.get("name") else { continue };
        if name.is_empty() {
            continue;
        }
        let ratio = sequence_ratio(&query_trunc, &truncate_lower(name));
        if ratio > best_ratio {
            best_ratio = ratio;
            candidate = Some(m);
        }
    }
    if best_ratio >= FUZZY_NAME_THRESHOLD {
        candidate
    } else {
        None
    }
}

/// Lowercase and cap at 256 chars, keeping the fuzzy comparison bounded.
fn truncate_lower(text: &str) -> String {
    text.to_lowercase().chars().take(256).collect()
}
