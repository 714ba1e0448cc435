// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine tunables.
//!
//! Every knob the retrieval engine recognizes lives here, with its default.
//! The boost constants are calibrated together: a document token that sits
//! inside the item's SKU or name carries 3x weight, a brand hit 1.5x, and a
//! SKU-shaped query token another 3x. The fuzzy thresholds are calibrated to
//! the Ratcliff/Obershelp ratio in [`crate::fuzzy`]; swapping the similarity
//! measure means re-deriving them.
//!
//! | Name | Default | Effect |
//! |------|---------|--------|
//! | `WINDOW_SIZE` | 60 | Text window width in tokens |
//! | `WINDOW_STRIDE` | 30 | Text window stride in tokens |
//! | `QUERY_TF_CLIP` | 2 | Upper bound on query term frequency |
//! | `MIN_DF` | 2 | Drop tokens below this document frequency |
//! | `MAX_DF_RATIO` | 0.7 | Drop tokens above this df fraction |
//! | `NAME_BOOST` | 3.0 | Document tokens appearing in the item name |
//! | `SKU_FIELD_BOOST` | 3.0 | Document tokens appearing in the SKU |
//! | `BRAND_BOOST` | 1.5 | Document tokens appearing in the brand |
//! | `SKU_ANCHOR_BOOST` | 3.0 | SKU-shaped query tokens when the query has one |
//! | `FUZZY_SKU_THRESHOLD` | 0.85 | Accept bar for the SKU fuzzy fallback |
//! | `FUZZY_NAME_THRESHOLD` | 0.6 | Accept bar for the name fuzzy fallback |
//! | `TOP_K` | 5 | Default candidate count |
//! | `SIMILARITY_THRESHOLD` | 0.35 | Default cosine gate |
//! | `MAX_LOADED_CATALOGS` | 3 | Registry capacity |

/// Text window width, in tokens, for page-text extraction.
pub const WINDOW_SIZE: usize = 60;

/// Stride between consecutive text windows, in tokens.
pub const WINDOW_STRIDE: usize = 30;

/// Upper bound on a query token's term frequency.
///
/// Long OCR'd pages repeat unit words endlessly; clipping keeps a single
/// noisy token from dominating the query vector.
pub const QUERY_TF_CLIP: usize = 2;

/// Minimum document frequency for a token to enter the vocabulary.
pub const MIN_DF: usize = 2;

/// Maximum document frequency, as a fraction of the corpus, before a token
/// is considered noise and dropped. The absolute bound is never below 1.
pub const MAX_DF_RATIO: f64 = 0.7;

/// Multiplicative weight for document tokens that appear in the item name.
pub const NAME_BOOST: f64 = 3.0;

/// Multiplicative weight for document tokens that appear inside the SKU.
///
/// The check is substring-based, not token-equal, so a dimension embedded
/// in a SKU like `XK-250-7` still boosts a bare `250` token.
pub const SKU_FIELD_BOOST: f64 = 3.0;

/// Multiplicative weight for document tokens that appear inside the brand.
pub const BRAND_BOOST: f64 = 1.5;

/// Query-side boost for SKU-shaped tokens (letters and digits mixed), applied
/// only when the query contains at least one such anchor token.
pub const SKU_ANCHOR_BOOST: f64 = 3.0;

/// Accept threshold for the SKU fuzzy fallback (stage A).
pub const FUZZY_SKU_THRESHOLD: f64 = 0.85;

/// Accept threshold for the name fuzzy fallback (stage B).
pub const FUZZY_NAME_THRESHOLD: f64 = 0.6;

/// Default number of candidates returned per query item.
pub const TOP_K: usize = 5;

/// Default cosine similarity gate a candidate must pass to become the best
/// match without fuzzy help.
pub const SIMILARITY_THRESHOLD: f64 = 0.35;

/// How many warmed catalogs the registry holds before rejecting new ids.
pub const MAX_LOADED_CATALOGS: usize = 3;
