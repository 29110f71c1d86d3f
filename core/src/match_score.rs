//! Similarity scoring between a deleted and an added token.
//!
//! Scores only rank candidates inside one delete/add run of the change-list
//! builder; they are never persisted and there is no minimum threshold (see
//! the builder's documented matching quirk).

use rustc_hash::FxHashMap;

use crate::token::{tokens_match, Token, TokenKind};

/// Score returned for a kind mismatch; the bottom of the order.
pub const MIN_SCORE: f64 = 0.0;

/// Ranks how plausible it is that `new` is a rewritten form of `old`.
///
/// Implementations must be pure, total and deterministic: no side effects, no
/// panics, higher means more similar. Tests inject fixed-value stubs through
/// this seam.
pub trait MatchScorer: Send {
    fn score(&self, old: &Token, new: &Token) -> f64;
}

/// Default scorer: shared-character ratio over normalized text, gated by
/// token kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenSimilarityScorer;

impl MatchScorer for TokenSimilarityScorer {
    fn score(&self, old: &Token, new: &Token) -> f64 {
        if old.kind() != new.kind() {
            return MIN_SCORE;
        }
        match old.kind() {
            TokenKind::Word => char_overlap(old.normalized_text(), new.normalized_text()),
            TokenKind::Punctuation | TokenKind::Whitespace | TokenKind::NumberingLabel => {
                char_overlap(old.text(), new.text())
            }
            // No text to compare; equal or nothing.
            TokenKind::FormatMark | TokenKind::Empty => {
                if tokens_match(old, new) {
                    1.0
                } else {
                    MIN_SCORE
                }
            }
        }
    }
}

/// Multiset character overlap: `2·|common| / (len_a + len_b)`, in `[0, 1]`.
fn char_overlap(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 && len_b == 0 {
        return 1.0;
    }
    if len_a == 0 || len_b == 0 {
        return MIN_SCORE;
    }
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    for ch in a.chars() {
        *counts.entry(ch).or_insert(0) += 1;
    }
    let mut common = 0usize;
    for ch in b.chars() {
        if let Some(n) = counts.get_mut(&ch) {
            if *n > 0 {
                *n -= 1;
                common += 1;
            }
        }
    }
    (2.0 * common as f64) / ((len_a + len_b) as f64)
}
