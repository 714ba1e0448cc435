//! Sparse TF-IDF retrieval over product catalogs.
//!
//! This crate matches free-form document text (scanned invoices, tender
//! tables, pasted snippets) against a catalog of product records and
//! returns the best-scoring items per query. Callers warm a catalog up
//! once, then issue text or document queries against it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌─────────────┐     ┌───────────────┐
//! │  parse.rs  │────▶│ extract.rs  │────▶│ index/cosine  │
//! │ (tabular   │     │ (records,   │     │ (TF-IDF       │
//! │  catalogs) │     │  tables,    │     │  postings)    │
//! └────────────┘     │  windows)   │     └───────┬───────┘
//!                    └─────────────┘             │
//!                                                ▼
//! ┌────────────┐     ┌─────────────┐     ┌───────────────┐
//! │registry.rs │◀───▶│  search.rs  │◀────│   fuzzy.rs    │
//! │ (warmed    │     │ (threshold, │     │ (Ratcliff/    │
//! │  catalogs) │     │  cheapest,  │     │  Obershelp)   │
//! └────────────┘     │  fallback)  │     └───────────────┘
//!                    └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use refine::{CatalogRegistry};
//!
//! let registry = CatalogRegistry::new();
//! registry.warmup("office", &[catalog_path], None)?;
//! let report = registry.search_text("office", "бумага a4", None, None)?;
//! println!("{:?}", report.best_match_id);
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod extract;
pub mod fuzzy;
pub mod index;
pub mod parse;
pub mod registry;
pub mod search;
pub mod text;
pub mod types;

// Re-exports for the public API
pub use error::EngineError;
pub use extract::extract_features;
pub use fuzzy::sequence_ratio;
pub use index::{CosineIndex, VectorIndex};
pub use parse::parse_tabular;
pub use registry::CatalogRegistry;
pub use search::{search, search_fitted};
pub use types::{
    Item, ItemCollection, Match, ParsedDocument, ParsedRecord, ParsedTable, SearchReport,
    SearchResult,
};
