//! Text normalization and tokenization.
//!
//! Everything downstream of here assumes the same normal form: lowercase,
//! single-space separated, with number patterns joined before tokenization
//! so `330 x 233 мм` survives as the single token `330x233мм`. Tokens are
//! maximal runs of Unicode letters, digits, underscores and hyphens; the
//! char-class walk keeps Cyrillic in-vocabulary without a regex engine.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Minimal RU/EN stopword list: prepositions, conjunctions, articles.
///
/// Kept deliberately small and auditable. No language detection happens
/// anywhere; both languages are filtered unconditionally.
const STOPWORDS: &[&str] = &[
    "и", "в", "на", "для", "от", "до", "с", "по", "из", "а", "но", "или", "как", "что",
    "the", "a", "an", "for", "of", "to", "in", "on", "by", "and", "or", "with",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Lowercase, trim, and collapse whitespace runs to a single space.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Is this character part of a token?
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Normalize and split into maximal token-character runs.
///
/// `char::is_alphanumeric` is Unicode-aware, so `бумага` and `a4` tokenize
/// the same way; punctuation and other separators are dropped.
pub fn simple_tokenize(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in normalized.chars() {
        if is_token_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Check if a token is in the fixed stopword set.
#[inline]
pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

/// Drop stopwords, preserving the order of the remaining tokens.
pub fn filter_stopwords(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().filter(|t| !is_stopword(t)).collect()
}

/// Join number patterns so dimensions survive tokenization.
///
/// Whitespace adjacent to an ASCII `x` is removed (`330 x 233` → `330x233`),
/// and whitespace before the Cyrillic unit `мм` is removed (`330 мм` →
/// `330мм`). Runs before tokenization, after [`normalize_text`].
pub fn normalize_numbers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let before_x = chars.get(j) == Some(&'x');
            let before_mm = chars.get(j) == Some(&'м') && chars.get(j + 1) == Some(&'м');
            let after_x = out.ends_with('x');
            if !(before_x || before_mm || after_x) {
                out.extend(chars[i..j].iter());
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Does this token look like a SKU: at least one digit and one letter?
///
/// Used both for query-side anchor detection and for picking the tokens the
/// SKU fuzzy fallback compares against candidate SKUs.
pub fn is_sku_like(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit()) && token.chars().any(char::is_alphabetic)
}
