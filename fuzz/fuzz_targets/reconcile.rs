#![no_main]

use libfuzzer_sys::fuzz_target;
use recollate::{
    apply_changes, filter_row, tokens_match, CollationTable, Language, NoProgress,
    ReconcileConfig, Reconciler, Token,
};

// Small alphabet so the two sequences share tokens and the diff exercises
// snakes, runs and replacements rather than pure delete/insert walls.
fn word_for(byte: u8) -> Token {
    const WORDS: [&str; 8] = ["in", "principio", "erat", "verbum", "et", "deus", "caro", "lux"];
    Token::word(WORDS[(byte & 0x07) as usize])
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let old_len = (data[0] % 24) as usize;
    let new_len = (data[1] % 24) as usize;
    let rest = &data[2..];
    if rest.len() < old_len + new_len {
        return;
    }

    let old: Vec<Token> = rest[..old_len].iter().map(|&b| word_for(b)).collect();
    let new: Vec<Token> = rest[old_len..old_len + new_len]
        .iter()
        .map(|&b| word_for(b))
        .collect();

    let mut table = CollationTable::new(Language::Latin);
    table.push_witness("A", old.clone());

    let mut reconciler =
        Reconciler::new(ReconcileConfig::default()).expect("default config is valid");
    let result = reconciler
        .reconcile(&old, &new, &NoProgress)
        .expect("reconcile must not fail on word sequences");

    apply_changes(&mut table, 0, &result.changes).expect("changes must apply to their own row");

    // Replaying the change list must reproduce the new sequence exactly,
    // ignoring empty cells.
    let row = table.row_cells(0).expect("row exists");
    let survivors = filter_row(row);
    assert_eq!(survivors.len(), new.len());
    for (survivor, expected) in survivors.iter().zip(&new) {
        assert!(
            tokens_match(&survivor.token, expected),
            "replayed row diverged from the new sequence"
        );
    }
});
