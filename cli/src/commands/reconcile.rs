use crate::output::{json, text};
use crate::OutputFormat;
use anyhow::{bail, Context, Result};
use recollate::{
    apply_changes, CollationTable, NoProgress, ProgressCallback, ReconcileConfig, Reconciler,
};
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

struct StderrProgress;

impl ProgressCallback for StderrProgress {
    fn on_progress(&self, iterations: u64, max_iterations: u64) {
        if max_iterations > 0 {
            eprintln!("reconcile: {} / {} iterations", iterations, max_iterations);
        } else {
            eprintln!("reconcile: {} iterations", iterations);
        }
    }
}

pub fn run(
    table_path: &str,
    siglum: &str,
    text_file: Option<&str>,
    text: Option<&str>,
    format: OutputFormat,
    apply: bool,
    output: Option<&str>,
    max_iterations: Option<u64>,
    unbounded: bool,
    progress: bool,
    quiet: bool,
    verbose: bool,
) -> Result<ExitCode> {
    if max_iterations.is_some() && unbounded {
        bail!("Cannot use both --max-iterations and --unbounded");
    }
    if output.is_some() && !apply {
        bail!("--output only makes sense together with --apply");
    }

    let verbosity = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let new_text = read_input_text(text_file, text)?;

    let file = File::open(table_path)
        .with_context(|| format!("Failed to open collation table: {}", table_path))?;
    let mut table: CollationTable = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse collation table: {}", table_path))?;

    let row = match table.find_witness(siglum) {
        Some(row) => row,
        None => bail!(
            "Witness \"{}\" not found in {} (available: {})",
            siglum,
            table_path,
            available_sigla(&table)
        ),
    };
    let cells = table.row_cells(row).map(|c| c.to_vec()).unwrap_or_default();

    let config = build_config(&table, max_iterations, unbounded);
    let mut reconciler = Reconciler::new(config).context("Invalid reconciliation configuration")?;

    let result = if progress {
        reconciler.reconcile_text(&cells, &new_text, &StderrProgress)?
    } else {
        reconciler.reconcile_text(&cells, &new_text, &NoProgress)?
    };

    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }

    let applied = if apply {
        let summary = apply_changes(&mut table, row, &result.changes)
            .context("Failed to apply changes to the table")?;
        let target = output.unwrap_or(table_path);
        let out = File::create(target)
            .with_context(|| format!("Failed to write collation table: {}", target))?;
        serde_json::to_writer_pretty(&out, &table)?;
        writeln!(&out)?;
        Some((summary, target))
    } else {
        None
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Text => {
            text::write_change_report(&mut handle, &result, verbosity)?;
            if let Some((summary, target)) = applied {
                if verbosity != Verbosity::Quiet {
                    writeln!(
                        handle,
                        "Applied {} change(s) ({} column(s) added) to {}",
                        summary.changes_applied, summary.columns_added, target
                    )?;
                }
            }
        }
        OutputFormat::Json => {
            json::write_json_result(&mut handle, &result)?;
        }
    }

    if result.changes.is_empty() && result.complete {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(1))
    }
}

fn build_config(
    table: &CollationTable,
    max_iterations: Option<u64>,
    unbounded: bool,
) -> ReconcileConfig {
    let config = ReconcileConfig::default().with_language(table.language);
    if unbounded {
        config.with_max_iterations(None)
    } else if max_iterations.is_some() {
        config.with_max_iterations(max_iterations)
    } else {
        config
    }
}

pub(crate) fn read_input_text(text_file: Option<&str>, text: Option<&str>) -> Result<String> {
    match (text_file, text) {
        (Some(path), None) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path)),
        (None, Some(inline)) => Ok(inline.to_string()),
        (Some(_), Some(_)) => {
            bail!("Provide the text either as a file argument or with --text, not both")
        }
        (None, None) => bail!("No text given; pass a file argument or --text"),
    }
}

fn available_sigla(table: &CollationTable) -> String {
    let sigla: Vec<&str> = table.witnesses.iter().map(|w| w.siglum.as_str()).collect();
    if sigla.is_empty() {
        "none".to_string()
    } else {
        sigla.join(", ")
    }
}
