use anyhow::{Context, Result};
use recollate::{CollationTable, Token};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

pub fn run(table_path: &str, show_apparatus: bool) -> Result<ExitCode> {
    let file = File::open(table_path)
        .with_context(|| format!("Failed to open collation table: {}", table_path))?;
    let table: CollationTable = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse collation table: {}", table_path))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let filename = Path::new(table_path)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| table_path.into());

    writeln!(handle, "Table: {}", filename)?;
    writeln!(handle, "Language: {}", table.language)?;
    writeln!(handle, "Columns: {}", table.width())?;
    writeln!(handle, "Witnesses: {}", table.witness_count())?;

    for witness in &table.witnesses {
        let empty = witness
            .cells
            .iter()
            .filter(|t| matches!(t, Token::Empty))
            .count();
        writeln!(
            handle,
            "  - \"{}\": {} readings, {} empty cells",
            witness.siglum,
            witness.cells.len() - empty,
            empty
        )?;
    }

    if show_apparatus {
        writeln!(handle)?;
        if table.apparatuses.is_empty() {
            writeln!(handle, "Apparatus: none")?;
        } else {
            writeln!(handle, "Apparatus: {} kinds", table.apparatuses.len())?;
            for apparatus in &table.apparatuses {
                writeln!(
                    handle,
                    "  - \"{}\": {} entries",
                    apparatus.kind,
                    apparatus.entries.len()
                )?;
            }
        }
    }

    Ok(ExitCode::from(0))
}
