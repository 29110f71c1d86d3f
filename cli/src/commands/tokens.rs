use crate::commands::reconcile::read_input_text;
use crate::output::text;
use crate::OutputFormat;
use anyhow::Result;
use recollate::{tokenize, Language};
use std::io::{self, Write};
use std::process::ExitCode;

pub fn run(
    text_file: Option<&str>,
    text: Option<&str>,
    language: &str,
    format: OutputFormat,
    no_numbering_labels: bool,
    intra_word_quotes: bool,
) -> Result<ExitCode> {
    let language: Language = language.parse()?;
    let input = read_input_text(text_file, text)?;

    let tokens = tokenize(&input, language, !no_numbering_labels, intra_word_quotes);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Text => {
            text::write_token_list(&mut handle, &tokens)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut handle, &tokens)?;
            writeln!(handle)?;
        }
    }

    Ok(ExitCode::from(0))
}
