// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of the matching pipeline.
//!
//! A [`ParsedDocument`] arrives from a parser collaborator, the feature
//! extractor projects it into an [`ItemCollection`] of scoreable [`Item`]s,
//! the index ranks reference items as [`Match`]es, and the orchestrator
//! resolves one [`SearchResult`] per query item. [`SearchReport`] is the
//! flattened answer a service façade ships to callers.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - A usable `ParsedDocument` populates at least one of `pages`, `tables`,
//!   `records`.
//! - `Item::item_id` is unique within one extraction and stable across
//!   re-extractions of the same document.
//! - `Item::tokens` are lowercased, stopword-free, and derived from
//!   `text_repr`; the index never re-tokenizes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One table lifted out of a document: a header row plus body rows of cells.
///
/// Headers may be empty; cells are plain strings so numeric-looking values
/// (especially prices) survive untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// A structured product record from a parser collaborator.
///
/// The engine reads a closed set of fields; anything else the parser found
/// rides along in `attrs` and is folded into the searchable text as
/// `key:value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub name: String,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    /// Price as the parser saw it. Kept as a string; `1 234,5` is parsed
    /// only where a numeric comparison is actually needed.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

/// Parser collaborator output: page text, tables, and structured records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Opaque origin identifier (path, upload name, `<inline>`).
    pub source: String,
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub tables: Vec<ParsedTable>,
    #[serde(default)]
    pub records: Vec<ParsedRecord>,
}

impl ParsedDocument {
    /// Wrap a free-form query string as a synthetic single-page document.
    pub fn from_text(text: &str) -> Self {
        ParsedDocument {
            source: "<inline>".to_string(),
            pages: vec![text.to_string()],
            tables: Vec::new(),
            records: Vec::new(),
        }
    }
}

/// A scoreable unit: a record, a table row, or a text window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// `raw:i` for records, `tbl:i` for table rows, `txt:i` for windows.
    pub item_id: String,
    /// Short label; for text windows, the first 80 chars of the window.
    pub name: String,
    /// Lowercased, stopword-filtered tokens in document order.
    pub tokens: Vec<String>,
    /// Selected attributes preserved for meta and tie-breaks:
    /// `brand`, `sku`, `price`, `id`, `marketplace`, `source`.
    pub attrs: BTreeMap<String, String>,
    /// The normalized joined string the tokens were derived from.
    pub text_repr: String,
}

/// An ordered set of items extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemCollection {
    pub items: Vec<Item>,
    /// Origin of the extraction, for logs and reports.
    pub source: String,
}

impl ItemCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One ranked candidate from the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub item_id: String,
    /// Cosine similarity in `[0, 1]`.
    pub score: f64,
    /// Shallow copy of the indexed item's preserved attributes
    /// (`name` always present; `price`/`sku`/`marketplace`/`id` when known).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// The resolved outcome for a single query item.
///
/// `top_k` is the pre-threshold candidate list straight from the index, so
/// callers can show near-misses; `best_match_id` reflects the threshold
/// gate, the cheapest-among-passed rule, and the fuzzy fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query_item_id: String,
    pub best_match_id: Option<String>,
    pub best_score: f64,
    #[serde(default)]
    pub top_k: Vec<Match>,
}

/// Flattened façade answer for a whole query: the first query item's
/// resolution, with the best match's display name pulled out of its meta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub best_match_id: Option<String>,
    pub best_match_name: Option<String>,
    pub best_score: f64,
    #[serde(default)]
    pub top_k: Vec<Match>,
}

impl SearchReport {
    /// Build the report from per-item results; an empty result set yields an
    /// empty report, not an error.
    pub fn from_results(results: &[SearchResult]) -> Self {
        let Some(first) = results.first() else {
            return SearchReport::default();
        };
        let best_match_name = first.best_match_id.as_ref().and_then(|best_id| {
            first
                .top_k
                .iter()
                .find(|m| &m.item_id == best_id)
                .and_then(|m| m.meta.get("name").cloned())
        });
        SearchReport {
            best_match_id: first.best_match_id.clone(),
            best_match_name,
            best_score: first.best_score,
            top_k: first.top_k.clone(),
        }
    }
}
