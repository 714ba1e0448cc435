// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! Refine CLI: inspect reference catalogs and run one-shot matches.
//!
//! ```bash
//! # What does this catalog extract and index to?
//! refine inspect catalog.jsonl
//!
//! # Match a document line against one or more catalogs
//! refine search "бумага a4 500 листов" -r catalog.jsonl -r prices.csv
//! ```
//!
//! Search results are printed as a JSON report on stdout; logs go to
//! stderr and follow `RUST_LOG`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use refine::extract::extract_features;
use refine::index::{CosineIndex, VectorIndex};
use refine::parse::parse_tabular;
use refine::registry::CatalogRegistry;
use refine::EngineError;

mod cli;
use cli::{Cli, Commands};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Inspect { references } => inspect(&references),
        Commands::Search {
            query,
            reference,
            top_k,
            threshold,
            limit_items,
        } => search(&query, &reference, top_k, threshold, limit_items),
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn inspect(references: &[std::path::PathBuf]) -> Result<(), EngineError> {
    let mut total = 0;
    let mut corpus = refine::ItemCollection::default();
    for path in references {
        let parsed = parse_tabular(path)?;
        let features = extract_features(&parsed);
        println!(
            "{}: {} records, {} tables, {} items",
            path.display(),
            parsed.records.len(),
            parsed.tables.len(),
            features.len()
        );
        total += features.len();
        corpus.items.extend(features.items);
    }

    let mut index = CosineIndex::new();
    index.fit(&corpus);
    println!("total: {} items, vocabulary: {} tokens", total, index.vocab_len());
    Ok(())
}

fn search(
    query: &str,
    references: &[std::path::PathBuf],
    top_k: usize,
    threshold: f64,
    limit_items: Option<usize>,
) -> Result<(), EngineError> {
    let registry = CatalogRegistry::with_capacity(1);
    registry.warmup("cli", references, limit_items)?;
    let report = registry.search_text("cli", query, Some(top_k), Some(threshold))?;

    let json = serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string());
    println!("{json}");
    Ok(())
}
