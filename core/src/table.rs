//! In-memory collation table.
//!
//! The reference implementation of [`AlignmentStore`] and [`ReferenceFixup`]:
//! a rectangular matrix of tokens, one row per witness, plus the apparatus
//! entries that address its columns. Serialisable, so editions can be saved
//! and reloaded as JSON.

use serde::{Deserialize, Serialize};

use crate::config::Language;
use crate::store::{AlignmentStore, ReferenceFixup, StoreError};
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    pub siglum: String,
    pub cells: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApparatusEntry {
    pub from: u32,
    pub to: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apparatus {
    pub kind: String,
    pub entries: Vec<ApparatusEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollationTable {
    pub language: Language,
    pub witnesses: Vec<Witness>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apparatuses: Vec<Apparatus>,
}

impl CollationTable {
    pub fn new(language: Language) -> Self {
        CollationTable {
            language,
            witnesses: Vec::new(),
            apparatuses: Vec::new(),
        }
    }

    /// Number of columns. Every row has the same width.
    pub fn width(&self) -> u32 {
        self.witnesses
            .first()
            .map(|w| w.cells.len() as u32)
            .unwrap_or(0)
    }

    pub fn witness_count(&self) -> u32 {
        self.witnesses.len() as u32
    }

    /// Appends a witness row, padding it (or every existing row) with empty
    /// cells so the matrix stays rectangular.
    pub fn push_witness(&mut self, siglum: impl Into<String>, mut cells: Vec<Token>) {
        let width = self.width() as usize;
        if self.witnesses.is_empty() {
            // First row defines the width.
        } else if cells.len() < width {
            cells.resize(width, Token::Empty);
        } else if cells.len() > width {
            let new_width = cells.len();
            for witness in &mut self.witnesses {
                witness.cells.resize(new_width, Token::Empty);
            }
        }
        self.witnesses.push(Witness {
            siglum: siglum.into(),
            cells,
        });
    }

    pub fn find_witness(&self, siglum: &str) -> Option<u32> {
        self.witnesses
            .iter()
            .position(|w| w.siglum == siglum)
            .map(|i| i as u32)
    }

    pub fn cell(&self, row: u32, column: u32) -> Option<&Token> {
        self.witnesses
            .get(row as usize)
            .and_then(|w| w.cells.get(column as usize))
    }

    pub fn row_cells(&self, row: u32) -> Option<&[Token]> {
        self.witnesses.get(row as usize).map(|w| w.cells.as_slice())
    }

    fn check_row(&self, row: u32) -> Result<(), StoreError> {
        if (row as usize) < self.witnesses.len() {
            Ok(())
        } else {
            Err(StoreError::RowOutOfRange {
                row,
                rows: self.witness_count(),
            })
        }
    }

    fn check_column(&self, column: u32) -> Result<(), StoreError> {
        if column < self.width() {
            Ok(())
        } else {
            Err(StoreError::ColumnOutOfRange {
                column,
                width: self.width(),
            })
        }
    }
}

impl AlignmentStore for CollationTable {
    fn insert_column_after(
        &mut self,
        row: u32,
        position: Option<u32>,
        count: u32,
    ) -> Result<(), StoreError> {
        self.check_row(row)?;
        let at = match position {
            None => 0,
            Some(p) => {
                if p >= self.width() {
                    return Err(StoreError::PositionOutOfRange {
                        position: p,
                        width: self.width(),
                    });
                }
                p as usize + 1
            }
        };
        for witness in &mut self.witnesses {
            witness
                .cells
                .splice(at..at, std::iter::repeat(Token::Empty).take(count as usize));
        }
        Ok(())
    }

    fn set_cell(&mut self, row: u32, column: u32, token: Token) -> Result<(), StoreError> {
        self.check_row(row)?;
        self.check_column(column)?;
        self.witnesses[row as usize].cells[column as usize] = token;
        Ok(())
    }

    fn empty_cell(&mut self, row: u32, column: u32) -> Result<(), StoreError> {
        self.set_cell(row, column, Token::Empty)
    }
}

impl ReferenceFixup for CollationTable {
    fn shift_column_references(&mut self, inserted_at: u32, delta: u32) {
        for apparatus in &mut self.apparatuses {
            for entry in &mut apparatus.entries {
                if entry.from >= inserted_at {
                    entry.from += delta;
                }
                if entry.to >= inserted_at {
                    entry.to += delta;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<Token> {
        texts.iter().copied().map(Token::word).collect()
    }

    fn two_witness_table() -> CollationTable {
        let mut table = CollationTable::new(Language::Latin);
        table.push_witness("A", words(&["in", "principio", "erat"]));
        table.push_witness("B", words(&["in", "principio", "fuit"]));
        table
    }

    #[test]
    fn push_witness_keeps_the_matrix_rectangular() {
        let mut table = CollationTable::new(Language::Latin);
        table.push_witness("A", words(&["a", "b", "c"]));
        table.push_witness("B", words(&["a"]));
        assert_eq!(table.width(), 3);
        assert_eq!(table.cell(1, 2), Some(&Token::Empty));

        table.push_witness("C", words(&["a", "b", "c", "d"]));
        assert_eq!(table.width(), 4);
        assert_eq!(table.cell(0, 3), Some(&Token::Empty));
    }

    #[test]
    fn insert_column_after_pads_every_row() {
        let mut table = two_witness_table();
        table.insert_column_after(0, Some(0), 1).unwrap();
        assert_eq!(table.width(), 4);
        assert_eq!(table.cell(0, 1), Some(&Token::Empty));
        assert_eq!(table.cell(1, 1), Some(&Token::Empty));
        assert_eq!(table.cell(0, 2), Some(&Token::word("principio")));
    }

    #[test]
    fn insert_column_at_start() {
        let mut table = two_witness_table();
        table.insert_column_after(0, None, 2).unwrap();
        assert_eq!(table.width(), 5);
        assert_eq!(table.cell(0, 0), Some(&Token::Empty));
        assert_eq!(table.cell(0, 2), Some(&Token::word("in")));
    }

    #[test]
    fn insert_position_out_of_range() {
        let mut table = two_witness_table();
        let err = table.insert_column_after(0, Some(3), 1).unwrap_err();
        assert_eq!(
            err,
            StoreError::PositionOutOfRange {
                position: 3,
                width: 3
            }
        );
    }

    #[test]
    fn set_and_empty_cell() {
        let mut table = two_witness_table();
        table.set_cell(1, 2, Token::word("erat")).unwrap();
        assert_eq!(table.cell(1, 2), Some(&Token::word("erat")));
        table.empty_cell(1, 2).unwrap();
        assert_eq!(table.cell(1, 2), Some(&Token::Empty));

        let err = table.set_cell(5, 0, Token::word("x")).unwrap_err();
        assert_eq!(err, StoreError::RowOutOfRange { row: 5, rows: 2 });
        let err = table.set_cell(0, 9, Token::word("x")).unwrap_err();
        assert_eq!(err, StoreError::ColumnOutOfRange { column: 9, width: 3 });
    }

    #[test]
    fn reference_fixup_shifts_entries_at_or_past_the_insert() {
        let mut table = two_witness_table();
        table.apparatuses.push(Apparatus {
            kind: "criticus".to_string(),
            entries: vec![
                ApparatusEntry {
                    from: 0,
                    to: 0,
                    text: "om. B".to_string(),
                },
                ApparatusEntry {
                    from: 1,
                    to: 2,
                    text: "fuit B".to_string(),
                },
            ],
        });
        // New column appears at index 1.
        table.shift_column_references(1, 1);
        assert_eq!(table.apparatuses[0].entries[0].from, 0);
        assert_eq!(table.apparatuses[0].entries[0].to, 0);
        assert_eq!(table.apparatuses[0].entries[1].from, 2);
        assert_eq!(table.apparatuses[0].entries[1].to, 3);
    }

    #[test]
    fn table_round_trips_through_json() {
        let mut table = two_witness_table();
        table.apparatuses.push(Apparatus {
            kind: "criticus".to_string(),
            entries: vec![ApparatusEntry {
                from: 2,
                to: 2,
                text: "fuit B".to_string(),
            }],
        });
        let json = serde_json::to_string(&table).unwrap();
        let back: CollationTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
