// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! The errors the engine surfaces to callers.
//!
//! Only four things are worth reporting: a missing reference file, a full
//! registry, a search against a catalog that was never warmed, and a
//! reference payload the parser cannot treat as tabular. Everything else
//! (malformed rows, unparseable prices, stopword-only queries) is recovered
//! locally and never becomes an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A reference source does not exist at warmup.
    #[error("reference not found: {path}")]
    NotFound { path: String },

    /// Adding a new catalog would exceed the registry capacity.
    #[error("max loaded catalogs reached ({capacity})")]
    CapacityExceeded { capacity: usize },

    /// A search was issued against an unknown catalog id.
    #[error("catalog is not warmed up: {catalog_id}")]
    NotWarmed { catalog_id: String },

    /// A reference payload is not a table or list of records.
    #[error("bad reference input: {reason}")]
    BadInput { reason: String },
}
