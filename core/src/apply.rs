//! Applies a change list to an alignment store.
//!
//! Change columns refer to the matrix as it stood when the list was built,
//! so every structural insert shifts the columns of all later changes. The
//! orchestrator tracks that drift with a running offset instead of asking
//! the store to re-index.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::changes::Change;
use crate::store::{AlignmentStore, ReferenceFixup, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ApplySummary {
    pub changes_applied: u32,
    pub columns_added: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("[RECOLLATE_APPLY_001] change {index} ({kind}) could not be applied: {source}")]
    Store {
        index: usize,
        kind: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Applies `changes` to `row`, in order, then repairs column references.
///
/// Reference fixups are deferred until the whole batch has succeeded and run
/// once per inserted column, oldest insert first. A store failure aborts the
/// batch immediately; already-applied changes are not rolled back and no
/// fixups run, so the caller should treat the store as suspect afterwards.
pub fn apply_changes<S>(
    store: &mut S,
    row: u32,
    changes: &[Change],
) -> Result<ApplySummary, ApplyError>
where
    S: AlignmentStore + ReferenceFixup,
{
    let mut columns_added: u32 = 0;
    let mut inserted_at: Vec<u32> = Vec::new();

    for (index, change) in changes.iter().enumerate() {
        let fail = |source: StoreError| ApplyError::Store {
            index,
            kind: change.kind(),
            source,
        };
        match change {
            Change::Replace { column, token } => {
                store
                    .set_cell(row, column + columns_added, token.clone())
                    .map_err(fail)?;
            }
            Change::Delete { column } => {
                store.empty_cell(row, column + columns_added).map_err(fail)?;
            }
            Change::Insert { after, token } => {
                // An at-start insert stays at the start only while no column
                // has been added; afterwards it lands after the columns this
                // batch already inserted there.
                let position = match after {
                    Some(a) => Some(a + columns_added),
                    None => columns_added.checked_sub(1),
                };
                store.insert_column_after(row, position, 1).map_err(fail)?;
                let new_column = position.map(|p| p + 1).unwrap_or(0);
                store
                    .set_cell(row, new_column, token.clone())
                    .map_err(fail)?;
                inserted_at.push(new_column);
                columns_added += 1;
            }
        }
    }

    for &position in &inserted_at {
        store.shift_column_references(position, 1);
    }

    debug!(
        "applied {} change(s) to row {row}, {columns_added} column(s) added",
        changes.len()
    );
    Ok(ApplySummary {
        changes_applied: changes.len() as u32,
        columns_added,
    })
}
