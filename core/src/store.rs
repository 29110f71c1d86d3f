//! Storage seams for applying change lists.
//!
//! The reconciliation pipeline never touches a concrete table type; it talks
//! to these traits so the same change list can drive an in-memory matrix, a
//! database-backed edition, or a test double.

use thiserror::Error;

use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("[RECOLLATE_STORE_001] row {row} is out of range for a table with {rows} rows")]
    RowOutOfRange { row: u32, rows: u32 },
    #[error("[RECOLLATE_STORE_002] column {column} is out of range for a table {width} columns wide")]
    ColumnOutOfRange { column: u32, width: u32 },
    #[error("[RECOLLATE_STORE_003] insert position {position} is out of range for a table {width} columns wide")]
    PositionOutOfRange { position: u32, width: u32 },
}

/// Mutable view of an alignment matrix, one row per witness.
///
/// Inserting a column affects every row (other witnesses receive empty
/// cells), so the matrix stays rectangular. All indices are zero-based
/// absolute matrix coordinates.
pub trait AlignmentStore {
    /// Inserts `count` new columns immediately after `position`, or at the
    /// start of the table when `position` is `None`. The cells of `row` and
    /// of every other row are initialised empty.
    fn insert_column_after(
        &mut self,
        row: u32,
        position: Option<u32>,
        count: u32,
    ) -> Result<(), StoreError>;

    /// Overwrites the cell at (`row`, `column`).
    fn set_cell(&mut self, row: u32, column: u32, token: Token) -> Result<(), StoreError>;

    /// Empties the cell at (`row`, `column`). The column itself survives;
    /// other witnesses may still have readings in it.
    fn empty_cell(&mut self, row: u32, column: u32) -> Result<(), StoreError>;
}

/// Keeps column references in satellite data honest across inserts.
///
/// Critical apparatus entries and similar structures address column ranges.
/// After a column is inserted at `inserted_at`, every stored reference at or
/// past that position must move right by `delta`.
pub trait ReferenceFixup {
    fn shift_column_references(&mut self, inserted_at: u32, delta: u32);
}
