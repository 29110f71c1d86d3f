//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use recollate::{
    ChangeSet, CollationTable, Language, NoProgress, ReconcileConfig, Reconciler, Token,
};

pub fn words(texts: &[&str]) -> Vec<Token> {
    texts.iter().copied().map(Token::word).collect()
}

/// Builds a table from (siglum, cells) rows; a "-" cell becomes an empty
/// cell, everything else a word.
pub fn table_from_rows(language: Language, rows: &[(&str, &[&str])]) -> CollationTable {
    let mut table = CollationTable::new(language);
    for (siglum, cells) in rows {
        let cells = cells
            .iter()
            .map(|text| {
                if *text == "-" {
                    Token::Empty
                } else {
                    Token::word(*text)
                }
            })
            .collect();
        table.push_witness(*siglum, cells);
    }
    table
}

/// Renders a witness row back to compact text, empty cells as "-".
pub fn row_texts(table: &CollationTable, row: u32) -> Vec<String> {
    table
        .row_cells(row)
        .expect("row should exist")
        .iter()
        .map(|token| match token {
            Token::Empty => "-".to_string(),
            other => other.text().to_string(),
        })
        .collect()
}

pub fn default_reconciler() -> Reconciler {
    Reconciler::new(ReconcileConfig::default()).expect("default config should validate")
}

pub fn reconcile_words(old: &[&str], new: &[&str]) -> ChangeSet {
    let mut reconciler = default_reconciler();
    reconciler
        .reconcile(&words(old), &words(new), &NoProgress)
        .expect("reconcile should succeed")
}
