// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the refine command-line interface.
//!
//! Two subcommands: `inspect` to examine what a reference catalog extracts
//! and indexes to, and `search` for one-shot matching of a text query
//! against reference catalogs. Both read the same CSV/JSON/JSONL reference
//! formats the engine warms up from.

use clap::{Parser, Subcommand};
use refine::config::{SIMILARITY_THRESHOLD, TOP_K};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "refine",
    about = "TF-IDF catalog matching: find the product a document line refers to",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse reference catalogs and print extraction and index statistics
    Inspect {
        /// Reference catalog files (CSV/JSON/JSONL)
        #[arg(required = true)]
        references: Vec<PathBuf>,
    },

    /// Match a text query against reference catalogs
    Search {
        /// Query text, e.g. a document line like "бумага a4 500 листов"
        query: String,

        /// Reference catalog files (CSV/JSON/JSONL)
        #[arg(short, long = "reference", required = true)]
        reference: Vec<PathBuf>,

        /// Number of candidates to report
        #[arg(long, default_value_t = TOP_K)]
        top_k: usize,

        /// Cosine similarity gate for the best match
        #[arg(long, default_value_t = SIMILARITY_THRESHOLD)]
        threshold: f64,

        /// Cap on indexed items, for quick experiments on large catalogs
        #[arg(long)]
        limit_items: Option<usize>,
    },
}
