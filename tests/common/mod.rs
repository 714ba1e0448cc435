//! Shared test fixtures: catalogs and one-shot matching helpers.

#![allow(dead_code)]

use refine::types::{ParsedDocument, ParsedRecord, SearchResult};
use refine::{extract_features, search, CosineIndex};
use std::collections::BTreeMap;

/// A catalog record with the fields most scenarios need.
pub fn record(id: &str, name: &str, sku: Option<&str>, price: Option<&str>) -> ParsedRecord {
    let mut attrs = BTreeMap::new();
    attrs.insert("id".to_string(), id.to_string());
    ParsedRecord {
        name: name.to_string(),
        qty: None,
        unit: None,
        brand: None,
        sku: sku.map(str::to_string),
        price: price.map(str::to_string),
        attrs,
    }
}

/// Wrap records as a parsed reference catalog.
pub fn catalog(records: Vec<ParsedRecord>) -> ParsedDocument {
    ParsedDocument {
        source: "catalog".to_string(),
        pages: Vec::new(),
        tables: Vec::new(),
        records,
    }
}

/// Run a text query against a catalog through the full pipeline:
/// extract both sides, fit a fresh index, orchestrate.
pub fn match_text(
    reference: &ParsedDocument,
    query_text: &str,
    top_k: usize,
    threshold: f64,
) -> Vec<SearchResult> {
    let reference = extract_features(reference);
    let query = extract_features(&ParsedDocument::from_text(query_text));
    let mut index = CosineIndex::new();
    search(&query, &reference, &mut index, top_k, threshold)
}

/// The catalog-record id (`meta.id`) behind a result's best match.
pub fn best_record_id(result: &SearchResult) -> Option<String> {
    let best_id = result.best_match_id.as_ref()?;
    result
        .top_k
        .iter()
        .find(|m| &m.item_id == best_id)
        .and_then(|m| m.meta.get("id").cloned())
}

/// The catalog-record ids present in a result's candidate list.
pub fn candidate_record_ids(result: &SearchResult) -> Vec<String> {
    result
        .top_k
        .iter()
        .filter_map(|m| m.meta.get("id").cloned())
        .collect()
}
