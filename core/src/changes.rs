use serde::{Deserialize, Serialize};

use crate::token::Token;

/// A column-level change derived from an edit script.
///
/// Columns are original matrix positions from before the edit; the
/// orchestrator adds the running insertion offset when applying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    /// The column keeps its identity but its content changes.
    Replace { column: u32, token: Token },
    /// The cell becomes empty for this witness only; the column itself
    /// survives because other witnesses may occupy it.
    Delete { column: u32 },
    /// A brand-new column immediately after `after`, or at the very start
    /// when `after` is `None`.
    Insert { after: Option<u32>, token: Token },
}

impl Change {
    /// True for changes that alter the column count.
    pub fn is_structural(&self) -> bool {
        matches!(self, Change::Insert { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Change::Replace { .. } => "replace",
            Change::Delete { .. } => "delete",
            Change::Insert { .. } => "insert",
        }
    }
}

/// The outcome of one reconciliation pass.
///
/// Replaying `changes` in order against the original row (adjusting later
/// indices for earlier insertions) reproduces the new token sequence when
/// empties are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
    /// False when the diff hit its iteration ceiling and the list is derived
    /// from a best-effort, possibly non-minimal script.
    pub complete: bool,
    /// Diagonals evaluated by the diff engine.
    pub iterations: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ChangeSet {
    /// The "nothing changed" result.
    pub fn empty() -> Self {
        ChangeSet {
            changes: Vec::new(),
            complete: true,
            iterations: 0,
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn replace_count(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Replace { .. }))
            .count()
    }

    pub fn delete_count(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Delete { .. }))
            .count()
    }

    pub fn insert_count(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Insert { .. }))
            .count()
    }
}
