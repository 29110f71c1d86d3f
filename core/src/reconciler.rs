//! Reconciliation facade.
//!
//! Owns the diff engine, the match scorer and the configuration, and exposes
//! the one call most embedders need: given a witness row and the re-edited
//! token sequence, produce the change list that turns the former into the
//! latter. Aborting and superseding are driven through [`AbortHandle`]s
//! handed out by [`Reconciler::abort_handle`].

use std::hash::{Hash, Hasher};

use log::debug;
use thiserror::Error;
use xxhash_rust::xxh64::Xxh64;

use crate::change_list::{build_change_list, ChangeListError};
use crate::changes::ChangeSet;
use crate::config::{ConfigError, ReconcileConfig};
use crate::match_score::{MatchScorer, TokenSimilarityScorer};
use crate::progress::ProgressCallback;
use crate::token::{filter_new_tokens, filter_row, tokens_match, Token};
use crate::token_diff::{AbortHandle, EngineError, StepStatus, TokenDiffEngine};
use crate::tokenizer::tokenize;

/// Progress is reported at most once per this many diagonal evaluations.
const PROGRESS_EVERY_ITERATIONS: u64 = 4096;

const FINGERPRINT_SEED: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("[RECOLLATE_RECONCILE_001] run superseded by a newer request before it finished")]
    Superseded,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Builder(#[from] ChangeListError),
}

struct LastCommitted {
    fingerprint: u64,
    tokens: Vec<Token>,
}

pub struct Reconciler {
    config: ReconcileConfig,
    scorer: Box<dyn MatchScorer>,
    engine: TokenDiffEngine,
    last_committed: Option<LastCommitted>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Result<Self, ConfigError> {
        Self::with_scorer(config, Box::new(TokenSimilarityScorer))
    }

    pub fn with_scorer(
        config: ReconcileConfig,
        scorer: Box<dyn MatchScorer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = TokenDiffEngine::new(config.max_iterations);
        Ok(Reconciler {
            config,
            scorer,
            engine,
            last_committed: None,
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Handle for aborting the run in flight from another thread. Stays
    /// valid across runs.
    pub fn abort_handle(&self) -> AbortHandle {
        self.engine.abort_handle()
    }

    /// Number of runs started so far, including superseded ones.
    pub fn run_count(&self) -> u64 {
        self.engine.run_count()
    }

    /// Records the token sequence the owning editor last committed to the
    /// table. A later [`reconcile`](Self::reconcile) whose new text matches
    /// it short-circuits to an empty change set without running the diff.
    pub fn mark_committed(&mut self, tokens: &[Token]) {
        let tokens = filter_new_tokens(tokens);
        self.last_committed = Some(LastCommitted {
            fingerprint: fingerprint_tokens(&tokens),
            tokens,
        });
    }

    /// Tokenizes `new_text` with the configured language and detection flags,
    /// then reconciles.
    pub fn reconcile_text(
        &mut self,
        old_cells: &[Token],
        new_text: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<ChangeSet, ReconcileError> {
        let tokens = tokenize(
            new_text,
            self.config.language,
            self.config.detect_numbering_labels,
            self.config.detect_intra_word_quotes,
        );
        self.reconcile(old_cells, &tokens, progress)
    }

    /// Computes the change list that rewrites the witness row `old_cells`
    /// into `new_tokens`.
    ///
    /// Empty cells are skipped on the old side, empty and whitespace tokens
    /// on the new side; emitted changes carry original matrix columns. Any
    /// run still in flight is aborted first, so the latest request always
    /// wins. Returns [`ReconcileError::Superseded`] when this run is itself
    /// aborted before it finishes.
    pub fn reconcile(
        &mut self,
        old_cells: &[Token],
        new_tokens: &[Token],
        progress: &dyn ProgressCallback,
    ) -> Result<ChangeSet, ReconcileError> {
        if self.engine.is_running() {
            self.engine.abort();
            while self.engine.is_running() {
                self.engine.step()?;
            }
        }

        let new_filtered = filter_new_tokens(new_tokens);
        if let Some(committed) = &self.last_committed {
            if committed.fingerprint == fingerprint_tokens(&new_filtered)
                && committed.tokens.len() == new_filtered.len()
                && committed
                    .tokens
                    .iter()
                    .zip(&new_filtered)
                    .all(|(a, b)| tokens_match(a, b))
            {
                debug!("new text matches the last committed tokens, nothing to reconcile");
                return Ok(ChangeSet::empty());
            }
        }

        let old_filtered = filter_row(old_cells);
        let old_tokens: Vec<Token> = old_filtered.iter().map(|c| c.token.clone()).collect();

        let run = self.engine.begin(&old_tokens, &new_filtered)?;
        let ceiling = self.engine.max_iterations().unwrap_or(0);
        let mut last_report = 0u64;
        while self.engine.is_running() {
            match self.engine.step()? {
                StepStatus::Running => {
                    let done = self.engine.iterations();
                    if done - last_report >= PROGRESS_EVERY_ITERATIONS {
                        progress.on_progress(done, ceiling);
                        last_report = done;
                    }
                }
                StepStatus::Finished | StepStatus::Aborted => {}
            }
        }
        let outcome = self
            .engine
            .take_outcome(run)
            .ok_or(ReconcileError::Superseded)?;
        progress.on_progress(outcome.iterations, ceiling);

        let changes = build_change_list(
            &outcome.script,
            &old_filtered,
            &new_filtered,
            self.scorer.as_ref(),
        )?;
        debug!(
            "run {} finished: {} change(s), {} iteration(s), complete={}",
            run.value(),
            changes.len(),
            outcome.iterations,
            outcome.complete
        );
        Ok(ChangeSet {
            changes,
            complete: outcome.complete,
            iterations: outcome.iterations,
            warnings: outcome.warnings,
        })
    }
}

/// Order-sensitive digest of a token sequence. Formats are left out; the
/// cache that uses this confirms hits with an exact comparison.
fn fingerprint_tokens(tokens: &[Token]) -> u64 {
    let mut hasher = Xxh64::new(FINGERPRINT_SEED);
    tokens.len().hash(&mut hasher);
    for token in tokens {
        (token.kind() as u8).hash(&mut hasher);
        token.text().hash(&mut hasher);
        token.normalized_text().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Change;
    use crate::config::Language;
    use crate::progress::NoProgress;

    fn words(texts: &[&str]) -> Vec<Token> {
        texts.iter().copied().map(Token::word).collect()
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(ReconcileConfig::default()).unwrap()
    }

    #[test]
    fn identical_rows_produce_no_changes() {
        let mut rec = reconciler();
        let row = words(&["in", "principio", "erat"]);
        let result = rec.reconcile(&row, &row, &NoProgress).unwrap();
        assert!(result.changes.is_empty());
        assert!(result.complete);
    }

    #[test]
    fn inserted_word_lands_after_its_anchor() {
        let mut rec = reconciler();
        let old = words(&["the", "quick", "fox"]);
        let new = words(&["the", "quick", "brown", "fox"]);
        let result = rec.reconcile(&old, &new, &NoProgress).unwrap();
        assert_eq!(
            result.changes,
            vec![Change::Insert {
                after: Some(1),
                token: Token::word("brown"),
            }]
        );
    }

    #[test]
    fn reconcile_text_drops_whitespace_tokens() {
        let mut rec = reconciler();
        let old = words(&["in", "principio"]);
        let result = rec
            .reconcile_text(&old, "in principio erat", &NoProgress)
            .unwrap();
        assert_eq!(
            result.changes,
            vec![Change::Insert {
                after: Some(1),
                token: Token::word("erat"),
            }]
        );
    }

    #[test]
    fn empty_cells_in_the_row_are_skipped_but_keep_their_columns() {
        let mut rec = reconciler();
        let old = vec![Token::word("in"), Token::Empty, Token::word("principio")];
        let new = words(&["in", "principia"]);
        let result = rec.reconcile(&old, &new, &NoProgress).unwrap();
        assert_eq!(
            result.changes,
            vec![Change::Replace {
                column: 2,
                token: Token::word("principia"),
            }]
        );
    }

    #[test]
    fn committed_text_short_circuits() {
        let mut rec = reconciler();
        let tokens = words(&["in", "principio"]);
        rec.mark_committed(&tokens);
        let old = words(&["something", "entirely", "different"]);
        let result = rec.reconcile(&old, &tokens, &NoProgress).unwrap();
        assert!(result.changes.is_empty());
        assert_eq!(rec.run_count(), 0);

        // A different text goes through the engine as usual.
        let other = words(&["in", "principiis"]);
        let result = rec.reconcile(&old, &other, &NoProgress).unwrap();
        assert!(!result.changes.is_empty());
        assert_eq!(rec.run_count(), 1);
    }

    #[test]
    fn abort_mid_run_reports_superseded() {
        struct AbortOnProgress(AbortHandle);
        impl ProgressCallback for AbortOnProgress {
            fn on_progress(&self, _iterations: u64, _max_iterations: u64) {
                self.0.abort();
            }
        }

        let mut rec = reconciler();
        let old: Vec<Token> = (0..150).map(|i| Token::word(format!("w{i}"))).collect();
        let new: Vec<Token> = (0..150).map(|i| Token::word(format!("x{i}"))).collect();
        let callback = AbortOnProgress(rec.abort_handle());
        let err = rec.reconcile(&old, &new, &callback).unwrap_err();
        assert_eq!(err, ReconcileError::Superseded);
        assert_eq!(rec.run_count(), 1);

        // The engine is reusable afterwards.
        let result = rec
            .reconcile(&words(&["a"]), &words(&["a"]), &NoProgress)
            .unwrap();
        assert!(result.changes.is_empty());
        assert_eq!(rec.run_count(), 2);
    }

    #[test]
    fn ceiling_yields_an_incomplete_change_set() {
        let config = ReconcileConfig::default().with_max_iterations(Some(1));
        let mut rec = Reconciler::new(config).unwrap();
        let old = words(&["same", "a", "b", "same"]);
        let new = words(&["same", "x", "y", "same"]);
        let result = rec.reconcile(&old, &new, &NoProgress).unwrap();
        assert!(!result.complete);
        assert!(!result.warnings.is_empty());
        assert_eq!(
            result.changes,
            vec![
                Change::Replace {
                    column: 1,
                    token: Token::word("x"),
                },
                Change::Replace {
                    column: 2,
                    token: Token::word("y"),
                },
            ]
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        let config = ReconcileConfig::default().with_max_iterations(Some(0));
        assert!(Reconciler::new(config).is_err());
    }

    #[test]
    fn fingerprint_separates_kinds_and_order() {
        let a = fingerprint_tokens(&[Token::word("a"), Token::word("b")]);
        let b = fingerprint_tokens(&[Token::word("b"), Token::word("a")]);
        let c = fingerprint_tokens(&[Token::punctuation("a"), Token::word("b")]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn language_default_is_latin() {
        let rec = reconciler();
        assert_eq!(rec.config().language, Language::Latin);
    }
}
