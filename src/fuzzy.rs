// Copyright 2025-present Refine contributors
// SPDX-License-Identifier: Apache-2.0

//! Ratcliff/Obershelp string similarity.
//!
//! The ratio is `2·M / T` where `M` is the total length of all matching
//! blocks (found by recursing around the longest common block) and `T` is
//! the combined length of both strings. The fallback thresholds in
//! [`crate::config`] are calibrated to exactly this measure; substituting
//! Levenshtein or Jaro here silently shifts what "0.85 similar" means.
//!
//! Operates on Unicode scalar values, not bytes, so Cyrillic SKUs and names
//! compare the way a human would count characters.

use std::collections::HashMap;

/// Similarity of two strings in `[0, 1]`. Two empty strings are identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
///
/// Finds the longest common block, then recurses on the pieces to its left
/// and right. An explicit work stack replaces the recursion; blocks never
/// overlap, so the sum is well-defined.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b_positions.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_block(a, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }
    matched
}

/// Longest matching block within `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Returns `(i, j, size)` with ties broken toward the earliest start in `a`,
/// then in `b`, which keeps the overall decomposition deterministic. The
/// `runs` map carries, for each end position in `b`, the length of the match
/// ending there; one pass per character of `a`.
fn longest_block(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let mut best_i = a_lo;
    let mut best_j = b_lo;
    let mut best_size = 0;
    let mut runs: HashMap<usize, usize> = HashMap::new();

    for i in a_lo..a_hi {
        let mut next_runs: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b_positions.get(&a[i]) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let len = if j == 0 {
                    1
                } else {
                    runs.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next_runs.insert(j, len);
                if len > best_size {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_size = len;
                }
            }
        }
        runs = next_runs;
    }
    (best_i, best_j, best_size)
}
