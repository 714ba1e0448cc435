// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! The catalog registry: warmed indices served by id.
//!
//! Callers preload a catalog once (`warmup`), then issue text or document
//! queries against it. A warmed entry pairs the extracted corpus with its
//! fitted index; the index is immutable after fit, so concurrent searches
//! share it through an `Arc` without further locking. The registry map
//! itself is guarded by a single-writer RwLock; only `warmup` takes the
//! write half.
//!
//! Capacity is a hard cap, not an eviction policy: past
//! `MAX_LOADED_CATALOGS` distinct ids, new warmups are rejected. Replacing
//! an already-loaded id is always allowed.

use crate::config::{MAX_LOADED_CATALOGS, SIMILARITY_THRESHOLD, TOP_K};
use crate::error::EngineError;
use crate::extract::extract_features;
use crate::index::{CosineIndex, VectorIndex};
use crate::parse::parse_tabular;
use crate::search::search_fitted;
use crate::types::{Item, ItemCollection, ParsedDocument, SearchReport};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// A warmed catalog: the merged reference corpus and its fitted index.
struct CatalogState {
    corpus: ItemCollection,
    index: CosineIndex,
}

/// Bounded mapping from catalog id to warmed state.
pub struct CatalogRegistry {
    capacity: usize,
    catalogs: RwLock<HashMap<String, Arc<CatalogState>>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOADED_CATALOGS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CatalogRegistry {
            capacity,
            catalogs: RwLock::new(HashMap::new()),
        }
    }

    /// Parse, extract, and index the given reference sources under
    /// `catalog_id`. Items are concatenated in source order, duplicates
    /// preserved, and truncated to `limit_items` when given and positive.
    ///
    /// Returns the number of items indexed. Fails with [`EngineError::NotFound`]
    /// for a missing source and [`EngineError::CapacityExceeded`] when a new
    /// id would grow the registry past its cap; replacing a loaded id never
    /// counts as growth.
    pub fn warmup(
        &self,
        catalog_id: &str,
        references: &[PathBuf],
        limit_items: Option<usize>,
    ) -> Result<usize, EngineError> {
        self.check_capacity(catalog_id)?;

        let mut items: Vec<Item> = Vec::new();
        for path in references {
            let parsed = parse_tabular(path)?;
            let features = extract_features(&parsed);
            debug!(
                source = %path.display(),
                items = features.len(),
                "extracted reference items"
            );
            items.extend(features.items);
        }
        if let Some(limit) = limit_items {
            if limit > 0 {
                items.truncate(limit);
            }
        }

        let corpus = ItemCollection {
            items,
            source: catalog_id.to_string(),
        };
        let mut index = CosineIndex::new();
        index.fit(&corpus);
        let indexed = corpus.len();
        info!(
            catalog_id,
            items = indexed,
            vocab = index.vocab_len(),
            "catalog warmed"
        );

        // The cap may have been reached by a concurrent warmup while this
        // one was parsing; the insert re-validates under the write lock.
        let mut catalogs = self.catalogs.write();
        if catalogs.len() >= self.capacity && !catalogs.contains_key(catalog_id) {
            return Err(EngineError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        catalogs.insert(catalog_id.to_string(), Arc::new(CatalogState { corpus, index }));
        Ok(indexed)
    }

    fn check_capacity(&self, catalog_id: &str) -> Result<(), EngineError> {
        let catalogs = self.catalogs.read();
        if catalogs.len() >= self.capacity && !catalogs.contains_key(catalog_id) {
            return Err(EngineError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Is this catalog id warmed and searchable?
    pub fn is_loaded(&self, catalog_id: &str) -> bool {
        self.catalogs.read().contains_key(catalog_id)
    }

    /// Ids of all warmed catalogs, in no particular order.
    pub fn loaded_ids(&self) -> Vec<String> {
        self.catalogs.read().keys().cloned().collect()
    }

    /// Match a free-form text query against a warmed catalog.
    pub fn search_text(
        &self,
        catalog_id: &str,
        text: &str,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<SearchReport, EngineError> {
        self.search_document(catalog_id, &ParsedDocument::from_text(text), top_k, threshold)
    }

    /// Match an already-parsed document against a warmed catalog.
    pub fn search_document(
        &self,
        catalog_id: &str,
        document: &ParsedDocument,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<SearchReport, EngineError> {
        let state = self.state(catalog_id)?;
        let query = extract_features(document);
        let results = search_fitted(
            &query,
            &state.index,
            top_k.unwrap_or(TOP_K),
            threshold.unwrap_or(SIMILARITY_THRESHOLD),
        );
        debug!(
            catalog_id,
            query_items = query.len(),
            corpus_items = state.corpus.len(),
            "search served"
        );
        Ok(SearchReport::from_results(&results))
    }

    fn state(&self, catalog_id: &str) -> Result<Arc<CatalogState>, EngineError> {
        self.catalogs
            .read()
            .get(catalog_id)
            .cloned()
            .ok_or_else(|| EngineError::NotWarmed {
                catalog_id: catalog_id.to_string(),
            })
    }
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::new()
    }
}
