//! Recollate: a text-reconciliation engine for collation tables.
//!
//! This crate provides functionality for:
//! - Tokenizing witness text into words, punctuation and numbering labels
//! - Computing token-level edit scripts with a cancellable, iteration-capped diff
//! - Reducing edit scripts to column-addressed change lists (replace, delete, insert)
//! - Applying change lists to a collation table and repairing apparatus references
//!
//! # Quick Start
//!
//! ```ignore
//! use recollate::{NoProgress, ReconcileConfig, Reconciler, Token};
//!
//! let mut reconciler = Reconciler::new(ReconcileConfig::default())?;
//! let row = vec![Token::word("the"), Token::word("quick"), Token::word("fox")];
//! let result = reconciler.reconcile_text(&row, "the quick brown fox", &NoProgress)?;
//!
//! for change in &result.changes {
//!     println!("{:?}", change);
//! }
//! ```

mod apply;
mod change_list;
mod changes;
mod config;
mod edit_script;
mod match_score;
mod progress;
mod punctuation;
mod reconciler;
mod store;
mod table;
mod token;
mod token_diff;
mod tokenizer;

pub use apply::{apply_changes, ApplyError, ApplySummary};
pub use change_list::{build_change_list, ChangeListError};
pub use changes::{Change, ChangeSet};
pub use config::{ConfigError, Language, ReconcileConfig, DEFAULT_MAX_ITERATIONS};
pub use edit_script::{EditOp, EditScript};
pub use match_score::{MatchScorer, TokenSimilarityScorer, MIN_SCORE};
pub use progress::{NoProgress, ProgressCallback};
pub use punctuation::{CharClass, PunctuationTable};
pub use reconciler::{ReconcileError, Reconciler};
pub use store::{AlignmentStore, ReferenceFixup, StoreError};
pub use table::{Apparatus, ApparatusEntry, CollationTable, Witness};
pub use token::{
    filter_new_tokens, filter_row, tokens_match, ColumnToken, Normalization, Token, TokenKind,
    WordFormat, PARAGRAPH_END_MARK,
};
pub use token_diff::{AbortHandle, DiffOutcome, EngineError, RunId, StepStatus, TokenDiffEngine};
pub use tokenizer::{tokenize, INTRA_WORD_QUOTES_SOURCE};
