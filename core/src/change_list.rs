//! Edit script to change list.
//!
//! A two-state machine resolves runs of Deletes/Adds between Keeps: inside a
//! run, each delete greedily claims the best-scoring queued add as a Replace;
//! queued adds that precede the claimed one become Inserts at the pre-replace
//! anchor, leftovers become Inserts after the last kept or replaced column.
//! Matching is local to one run; Deletes and Adds separated by a Keep are
//! never paired.

use std::collections::VecDeque;

use log::warn;
use thiserror::Error;

use crate::changes::Change;
use crate::edit_script::{EditOp, EditScript};
use crate::match_score::MatchScorer;
use crate::token::{ColumnToken, Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeListError {
    #[error(
        "[RECOLLATE_BUILDER_001] edit script references old index {index} but the filtered old sequence has {len} tokens"
    )]
    OldIndexOutOfRange { index: u32, len: usize },
    #[error(
        "[RECOLLATE_BUILDER_002] edit script references new index {index} but the filtered new sequence has {len} tokens"
    )]
    NewIndexOutOfRange { index: u32, len: usize },
    #[error(
        "[RECOLLATE_BUILDER_003] builder finished with {deletes} queued deletes and {adds} queued adds; a run was left unresolved"
    )]
    QueueNotDrained { deletes: usize, adds: usize },
}

/// Reduces an edit script to an ordered change list.
///
/// `old` is the filtered witness row (columns preserved), `new` the filtered
/// new-token sequence; script indices refer to these. Every emitted
/// `Replace`/`Delete` carries the original matrix column, never a filtered
/// position.
pub fn build_change_list(
    script: &EditScript,
    old: &[ColumnToken],
    new: &[Token],
    scorer: &dyn MatchScorer,
) -> Result<Vec<Change>, ChangeListError> {
    let mut builder = Builder::new(old, new, scorer);
    for op in script {
        builder.push(*op)?;
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No pending run.
    Balanced,
    /// Deletes (and possibly adds) are queued, awaiting resolution.
    PendingRun,
}

struct Builder<'a> {
    old: &'a [ColumnToken],
    new: &'a [Token],
    scorer: &'a dyn MatchScorer,
    state: State,
    delete_queue: VecDeque<u32>,
    add_queue: VecDeque<u32>,
    /// Original column of the most recent kept or replaced token; `None`
    /// before any.
    last_anchor: Option<u32>,
    out: Vec<Change>,
}

impl<'a> Builder<'a> {
    fn new(old: &'a [ColumnToken], new: &'a [Token], scorer: &'a dyn MatchScorer) -> Self {
        Builder {
            old,
            new,
            scorer,
            state: State::Balanced,
            delete_queue: VecDeque::new(),
            add_queue: VecDeque::new(),
            last_anchor: None,
            out: Vec::new(),
        }
    }

    fn push(&mut self, op: EditOp) -> Result<(), ChangeListError> {
        match op {
            EditOp::Keep { old, .. } => {
                let column = self.old_column(old)?;
                if self.state == State::PendingRun {
                    self.resolve_run();
                }
                self.last_anchor = Some(column);
                self.state = State::Balanced;
            }
            EditOp::Add { new } => {
                self.check_new(new)?;
                match self.state {
                    // A lone addition with nothing contended.
                    State::Balanced => {
                        let token = self.new[new as usize].clone();
                        self.out.push(Change::Insert {
                            after: self.last_anchor,
                            token,
                        });
                    }
                    State::PendingRun => self.add_queue.push_back(new),
                }
            }
            EditOp::Delete { old } => {
                self.old_column(old)?;
                self.delete_queue.push_back(old);
                self.state = State::PendingRun;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Change>, ChangeListError> {
        if self.state == State::PendingRun {
            self.resolve_run();
        }
        if !self.delete_queue.is_empty() || !self.add_queue.is_empty() {
            let error = ChangeListError::QueueNotDrained {
                deletes: self.delete_queue.len(),
                adds: self.add_queue.len(),
            };
            warn!("change-list builder invariant broken: {error}");
            return Err(error);
        }
        debug_assert!(
            self.state == State::Balanced,
            "builder must finish with no pending run"
        );
        Ok(self.out)
    }

    fn resolve_run(&mut self) {
        while let Some(d) = self.delete_queue.pop_front() {
            if self.add_queue.is_empty() {
                // No add remains: a plain delete.
                self.out.push(Change::Delete {
                    column: self.old[d as usize].column,
                });
                continue;
            }

            // Rank every queued add against the deleted token. Strict
            // comparison keeps the earliest queue position on ties, and any
            // add wins however low it scores (no similarity threshold; a
            // Replace is always preferred over Delete + Insert).
            let old_token = &self.old[d as usize].token;
            let mut best_pos = 0usize;
            let mut best_score = self
                .scorer
                .score(old_token, &self.new[self.add_queue[0] as usize]);
            for (pos, &a) in self.add_queue.iter().enumerate().skip(1) {
                let score = self.scorer.score(old_token, &self.new[a as usize]);
                if score > best_score {
                    best_score = score;
                    best_pos = pos;
                }
            }

            // Adds skipped over by the match belong before the replaced
            // column.
            for a in self.add_queue.drain(..best_pos) {
                let token = self.new[a as usize].clone();
                self.out.push(Change::Insert {
                    after: self.last_anchor,
                    token,
                });
            }
            if let Some(matched) = self.add_queue.pop_front() {
                let column = self.old[d as usize].column;
                let token = self.new[matched as usize].clone();
                self.out.push(Change::Replace { column, token });
                self.last_anchor = Some(column);
            }
        }

        while let Some(a) = self.add_queue.pop_front() {
            let token = self.new[a as usize].clone();
            self.out.push(Change::Insert {
                after: self.last_anchor,
                token,
            });
        }
        self.state = State::Balanced;
    }

    fn old_column(&self, index: u32) -> Result<u32, ChangeListError> {
        self.old
            .get(index as usize)
            .map(|c| c.column)
            .ok_or(ChangeListError::OldIndexOutOfRange {
                index,
                len: self.old.len(),
            })
    }

    fn check_new(&self, index: u32) -> Result<(), ChangeListError> {
        if (index as usize) < self.new.len() {
            Ok(())
        } else {
            Err(ChangeListError::NewIndexOutOfRange {
                index,
                len: self.new.len(),
            })
        }
    }
}
