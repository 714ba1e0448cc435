// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! The index capability.
//!
//! The orchestrator is written against this trait, not a concrete index:
//! anything that can fit a corpus and return ranked matches per query item
//! plugs in. [`CosineIndex`] is the baseline (and currently only) instance.

mod cosine;

pub use cosine::CosineIndex;

use crate::types::{ItemCollection, Match};

/// Fit-then-search contract shared by every index implementation.
pub trait VectorIndex {
    /// Build the index from a reference corpus. A second call replaces the
    /// prior state entirely; there is no partial update.
    fn fit(&mut self, corpus: &ItemCollection);

    /// Rank reference items against each query item independently.
    ///
    /// Returns one candidate list per query item, aligned to query order,
    /// each sorted by (score descending, insertion order ascending) and
    /// truncated to `top_k`. A query item with no vocabulary overlap yields
    /// an empty list, not an error.
    fn search(&self, query: &ItemCollection, top_k: usize) -> Vec<Vec<Match>>;
}
