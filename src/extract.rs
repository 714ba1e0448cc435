// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! Feature extraction: from parser output to scoreable items.
//!
//! Three sub-extractors run in a fixed order and concatenate:
//!
//! 1. structured records → `raw:` items
//! 2. table rows → `tbl:` items, skipped entirely when records exist
//!    (tables are assumed to redundantly encode the same records)
//! 3. page text → `txt:` items via a sliding token window
//!
//! Extraction is pure: the same document always yields the same ordered
//! item list with the same ids. Malformed fields are skipped, never fatal.

use crate::config::{WINDOW_SIZE, WINDOW_STRIDE};
use crate::text::{filter_stopwords, normalize_numbers, normalize_text, simple_tokenize};
use crate::types::{Item, ItemCollection, ParsedDocument, ParsedRecord, ParsedTable};
use std::collections::BTreeMap;

/// Id stride between tables and between pages, so row and window indices
/// stay disjoint without tracking running counts per block.
const ID_BLOCK: usize = 10_000;

/// Header substrings that mark the name column of a table.
const NAME_HEADERS: &[&str] = &["наименование", "товар", "название", "item", "name", "title"];
/// Header substrings that mark the SKU column.
const SKU_HEADERS: &[&str] = &["sku", "артикул", "код", "id"];
/// Header substrings that mark the brand column.
const BRAND_HEADERS: &[&str] = &["бренд", "brand"];
/// Header substrings that mark the price column.
const PRICE_HEADERS: &[&str] = &["цена", "price", "стоимость"];

fn make_item_id(prefix: &str, index: usize) -> String {
    format!("{prefix}:{index}")
}

/// Shared tail of every sub-extractor: join parts, fix number patterns,
/// tokenize, drop stopwords.
fn text_and_tokens(parts: &[String]) -> (String, Vec<String>) {
    let text_repr = normalize_numbers(&normalize_text(&parts.join(" ")));
    let tokens = filter_stopwords(simple_tokenize(&text_repr));
    (text_repr, tokens)
}

/// Project a parsed document into an ordered collection of scoreable items.
pub fn extract_features(doc: &ParsedDocument) -> ItemCollection {
    let mut items: Vec<Item> = doc
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| item_from_record(record, idx))
        .collect();

    if doc.records.is_empty() {
        let base = items.len();
        for (t_i, table) in doc.tables.iter().enumerate() {
            items.extend(items_from_table(table, base + t_i * ID_BLOCK));
        }
    }

    let base = items.len();
    items.extend(items_from_pages(&doc.pages, base));

    ItemCollection {
        items,
        source: doc.source.clone(),
    }
}

/// One record becomes one item. The searchable text is the name followed by
/// every non-null field, with overflow attributes as `key:value` pairs;
/// `brand`/`sku`/`price` and any `id`/`marketplace`/`source` overflow keys
/// are preserved in attrs for meta and tie-breaks.
fn item_from_record(record: &ParsedRecord, idx: usize) -> Item {
    // An empty string is as absent as a missing field.
    fn present(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|v| !v.is_empty())
    }

    let name = record.name.clone();
    let mut parts: Vec<String> = vec![name.clone()];
    for field in [&record.brand, &record.sku, &record.unit, &record.price] {
        if let Some(value) = present(field) {
            parts.push(value.to_string());
        }
    }
    for (key, value) in &record.attrs {
        parts.push(format!("{key}:{value}"));
    }

    let (text_repr, tokens) = text_and_tokens(&parts);

    let mut attrs = BTreeMap::new();
    for (key, field) in [
        ("brand", &record.brand),
        ("sku", &record.sku),
        ("price", &record.price),
    ] {
        if let Some(value) = present(field) {
            attrs.insert(key.to_string(), value.to_string());
        }
    }
    for key in ["id", "marketplace", "source"] {
        if let Some(value) = record.attrs.get(key) {
            attrs.insert(key.to_string(), value.clone());
        }
    }

    Item {
        item_id: make_item_id("raw", idx),
        name,
        tokens,
        attrs,
        text_repr,
    }
}

/// Index of the first header containing any of the candidate substrings.
fn column_index(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.iter().any(|c| h.contains(c)))
}

/// Each table row becomes one item. Recognized columns feed `attrs`; every
/// cell also contributes a `header:cell` pair (bare cell under an empty
/// header) so unrecognized columns still carry signal.
fn items_from_table(table: &ParsedTable, base_idx: usize) -> Vec<Item> {
    let headers: Vec<String> = table.headers.iter().map(|h| normalize_text(h)).collect();
    let name_col = column_index(&headers, NAME_HEADERS);
    let sku_col = column_index(&headers, SKU_HEADERS);
    let brand_col = column_index(&headers, BRAND_HEADERS);
    let price_col = column_index(&headers, PRICE_HEADERS);

    let mut out = Vec::with_capacity(table.rows.len());
    for (r_i, row) in table.rows.iter().enumerate() {
        let mut parts: Vec<String> = Vec::new();

        let name = match name_col.and_then(|i| row.get(i)) {
            Some(cell) => {
                parts.push(cell.clone());
                cell.clone()
            }
            None => {
                // No name column: the whole row stands in for the name.
                let joined = row.join(" ");
                parts.push(joined.clone());
                joined
            }
        };

        let mut attrs = BTreeMap::new();
        for (col, key) in [(sku_col, "sku"), (brand_col, "brand"), (price_col, "price")] {
            if let Some(cell) = col.and_then(|i| row.get(i)) {
                parts.push(cell.clone());
                attrs.insert(key.to_string(), cell.clone());
            }
        }

        for (c_i, cell) in row.iter().enumerate() {
            match headers.get(c_i) {
                Some(header) if !header.is_empty() => parts.push(format!("{header}:{cell}")),
                _ => parts.push(cell.clone()),
            }
        }

        let (text_repr, tokens) = text_and_tokens(&parts);
        out.push(Item {
            item_id: make_item_id("tbl", base_idx + r_i),
            name,
            tokens,
            attrs,
            text_repr,
        });
    }
    out
}

/// Slide a token window over each page; every window becomes one item whose
/// name is the first 80 characters of the window text.
fn items_from_pages(pages: &[String], base_idx: usize) -> Vec<Item> {
    let mut out = Vec::new();
    for (page_i, page) in pages.iter().enumerate() {
        let full = normalize_numbers(&normalize_text(page));
        let tokens = filter_stopwords(simple_tokenize(&full));
        if tokens.is_empty() {
            continue;
        }
        let mut start = 0;
        let mut window_i = 0;
        while start < tokens.len() {
            let chunk = &tokens[start..tokens.len().min(start + WINDOW_SIZE)];
            let text_repr = chunk.join(" ");
            let name: String = text_repr.chars().take(80).collect();
            out.push(Item {
                item_id: make_item_id("txt", base_idx + page_i * ID_BLOCK + window_i),
                name,
                tokens: chunk.to_vec(),
                attrs: BTreeMap::new(),
                text_repr,
            });
            window_i += 1;
            start += WINDOW_STRIDE;
        }
    }
    out
}
