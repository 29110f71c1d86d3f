use crate::commands::reconcile::Verbosity;
use anyhow::Result;
use recollate::{Change, ChangeSet, Token, TokenKind};
use std::io::Write;

pub fn write_change_report<W: Write>(
    w: &mut W,
    result: &ChangeSet,
    verbosity: Verbosity,
) -> Result<()> {
    if result.changes.is_empty() {
        writeln!(w, "No changes found.")?;
        write_summary(w, result, verbosity)?;
        return Ok(());
    }

    for change in &result.changes {
        match change {
            Change::Replace { column, token } => {
                writeln!(w, "Column {}: replace with {}", column, token_label(token))?;
            }
            Change::Delete { column } => {
                writeln!(w, "Column {}: delete", column)?;
            }
            Change::Insert { after, token } => match after {
                Some(column) => {
                    writeln!(w, "Insert {} after column {}", token_label(token), column)?;
                }
                None => {
                    writeln!(w, "Insert {} at the start", token_label(token))?;
                }
            },
        }
    }

    write_summary(w, result, verbosity)?;

    Ok(())
}

fn write_summary<W: Write>(w: &mut W, result: &ChangeSet, verbosity: Verbosity) -> Result<()> {
    if verbosity == Verbosity::Quiet && result.changes.is_empty() {
        return Ok(());
    }

    writeln!(w, "---")?;
    writeln!(w, "Summary:")?;
    writeln!(w, "  Total changes: {}", result.changes.len())?;

    let replaces = result.replace_count();
    let deletes = result.delete_count();
    let inserts = result.insert_count();
    if replaces > 0 {
        writeln!(w, "  Replacements: {}", replaces)?;
    }
    if deletes > 0 {
        writeln!(w, "  Deletions: {}", deletes)?;
    }
    if inserts > 0 {
        writeln!(w, "  Insertions: {}", inserts)?;
    }
    if verbosity == Verbosity::Verbose {
        writeln!(w, "  Iterations: {}", result.iterations)?;
    }

    if !result.complete {
        writeln!(w, "  Status: INCOMPLETE (the change list may not be minimal)")?;
    } else {
        writeln!(w, "  Status: complete")?;
    }

    Ok(())
}

pub fn write_token_list<W: Write>(w: &mut W, tokens: &[Token]) -> Result<()> {
    for token in tokens {
        let kind = kind_name(token.kind());
        if token.normalized_text() != token.text() {
            writeln!(
                w,
                "{:<16} {:?} -> {:?}",
                kind,
                token.text(),
                token.normalized_text()
            )?;
        } else {
            writeln!(w, "{:<16} {:?}", kind, token.text())?;
        }
    }
    writeln!(w)?;
    writeln!(w, "{} tokens", tokens.len())?;
    Ok(())
}

fn token_label(token: &Token) -> String {
    match token.kind() {
        TokenKind::Word => format!("{:?}", token.text()),
        kind => format!("{:?} ({})", token.text(), kind_name(kind)),
    }
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Word => "word",
        TokenKind::Punctuation => "punctuation",
        TokenKind::Whitespace => "whitespace",
        TokenKind::FormatMark => "format_mark",
        TokenKind::NumberingLabel => "numbering_label",
        TokenKind::Empty => "empty",
    }
}
