use serde::{Deserialize, Serialize};

/// One operation of an edit script.
///
/// Indices point into the filtered old/new sequences the script was computed
/// over, not into the unfiltered matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Keep { old: u32, new: u32 },
    Delete { old: u32 },
    Add { new: u32 },
}

/// Ordered edit script between two token sequences.
///
/// Replaying the script against the old sequence (ignoring Adds) and against
/// the new sequence (ignoring Deletes) reconstructs both, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    pub ops: Vec<EditOp>,
}

impl EditScript {
    pub fn new(ops: Vec<EditOp>) -> Self {
        EditScript { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditOp> {
        self.ops.iter()
    }

    /// True when the script contains no Delete or Add, i.e. both sequences
    /// are equal under the engine's equality predicate.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, EditOp::Keep { .. }))
    }

    pub fn keep_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Keep { .. }))
            .count()
    }

    pub fn delete_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Delete { .. }))
            .count()
    }

    pub fn add_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Add { .. }))
            .count()
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditOp;
    type IntoIter = std::slice::Iter<'a, EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
