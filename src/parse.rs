// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! Tabular reference parsing: CSV, JSON, and JSONL catalogs.
//!
//! This is the reference-catalog half of the parser collaborator contract.
//! Rows are projected into [`ParsedRecord`]s through a closed set of
//! recognized keys (`title`/`name`, `sku`, `brand`, `price`, `id`,
//! `marketplace`) and mirrored as a [`ParsedTable`] whose headers are the
//! sorted union of all row keys. Values stay strings throughout; a price
//! like `1 234,5` is someone else's problem to interpret.
//!
//! Rich-document parsing (OCR, word processors) lives with external
//! collaborators; this module never sees those formats.

use crate::error::EngineError;
use crate::types::{ParsedDocument, ParsedRecord, ParsedTable};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// One parsed row: recognized or not, every key maps to a JSON value.
type Row = BTreeMap<String, Value>;

/// Load a reference catalog file into a [`ParsedDocument`].
///
/// The format is chosen by extension. Malformed rows and JSONL lines are
/// skipped; a payload that is not row-shaped at all is [`EngineError::BadInput`].
/// Invalid UTF-8 is replaced, not propagated.
pub fn parse_tabular(path: &Path) -> Result<ParsedDocument, EngineError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EngineError::NotFound {
            path: path.display().to_string(),
        },
        _ => EngineError::BadInput {
            reason: format!("{}: {e}", path.display()),
        },
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let rows = match extension.as_str() {
        "jsonl" => load_jsonl(&text),
        "json" => load_json(&text)?,
        "csv" => load_csv(&text),
        other => {
            return Err(EngineError::BadInput {
                reason: format!("unsupported tabular format: .{other}"),
            })
        }
    };

    Ok(document_from_rows(path, rows))
}

/// Every JSON object on its own line; lines that fail to parse are skipped.
fn load_jsonl(text: &str) -> Vec<Row> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Some(map.into_iter().collect()),
            _ => None,
        })
        .collect()
}

/// A JSON array of objects, or a single object. Anything else is not a
/// record list.
fn load_json(text: &str) -> Result<Vec<Row>, EngineError> {
    let value: Value = serde_json::from_str(text).map_err(|e| EngineError::BadInput {
        reason: format!("invalid json: {e}"),
    })?;
    match value {
        Value::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(map) => Some(map.into_iter().collect()),
                _ => None,
            })
            .collect()),
        Value::Object(map) => Ok(vec![map.into_iter().collect()]),
        _ => Err(EngineError::BadInput {
            reason: "json payload is not a table or list of records".to_string(),
        }),
    }
}

/// Header row then data rows. Quoted fields may contain commas and doubled
/// quotes; embedded newlines are not supported. Rows shorter than the
/// header are padded with empty cells, longer ones are truncated.
fn load_csv(text: &str) -> Vec<Row> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = split_csv_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    lines
        .map(|line| {
            let cells = split_csv_line(line);
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let cell = cells.get(i).cloned().unwrap_or_default();
                    (header.clone(), Value::String(cell))
                })
                .collect()
        })
        .collect()
}

/// Split one CSV line into fields, honoring quotes and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Project rows into records and mirror them as a table view.
fn document_from_rows(path: &Path, rows: Vec<Row>) -> ParsedDocument {
    let headers: Vec<String> = rows
        .iter()
        .flat_map(|row| row.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect();

    let records: Vec<ParsedRecord> = rows.iter().map(record_from_row).collect();

    ParsedDocument {
        source: path.display().to_string(),
        pages: Vec::new(),
        tables: vec![ParsedTable {
            headers,
            rows: table_rows,
        }],
        records,
    }
}

/// Project one row through the recognized keys.
fn record_from_row(row: &Row) -> ParsedRecord {
    let name = field(row, "title")
        .or_else(|| field(row, "name"))
        .unwrap_or_default();

    let mut attrs = BTreeMap::new();
    for key in ["marketplace", "id"] {
        if let Some(value) = field(row, key) {
            attrs.insert(key.to_string(), value);
        }
    }

    ParsedRecord {
        name,
        qty: None,
        unit: None,
        brand: field(row, "brand"),
        sku: field(row, "sku"),
        price: field(row, "price"),
        attrs,
    }
}

/// A row value as a string; JSON null and missing keys are both absent.
fn field(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::Null => None,
        value => Some(display_value(value)),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
