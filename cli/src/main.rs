mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, Metadata, Record};
use recollate::{ChangeListError, EngineError, ReconcileError, StoreError};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "recollate")]
#[command(about = "Reconcile witness text against a collation table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compute the changes that bring a witness row up to date")]
    Reconcile {
        #[arg(help = "Path to the collation table (JSON)")]
        table: String,
        #[arg(help = "Siglum of the witness to reconcile")]
        siglum: String,
        #[arg(help = "Path to a file with the re-edited witness text")]
        text_file: Option<String>,
        #[arg(long, help = "Re-edited witness text given inline instead of as a file")]
        text: Option<String>,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, help = "Apply the changes and write the table back")]
        apply: bool,
        #[arg(long, value_name = "PATH", help = "Write the updated table here instead of in place")]
        output: Option<String>,
        #[arg(long, value_name = "N", help = "Diff iteration ceiling (default one million)")]
        max_iterations: Option<u64>,
        #[arg(long, help = "Remove the diff iteration ceiling")]
        unbounded: bool,
        #[arg(long, help = "Show reconciliation progress on stderr")]
        progress: bool,
        #[arg(long, short, help = "Quiet mode: only show the summary")]
        quiet: bool,
        #[arg(long, short, help = "Verbose mode: show additional details")]
        verbose: bool,
    },
    #[command(about = "Tokenize witness text and print the tokens")]
    Tokens {
        #[arg(help = "Path to a file with the witness text")]
        text_file: Option<String>,
        #[arg(long, help = "Witness text given inline instead of as a file")]
        text: Option<String>,
        #[arg(long, short, default_value = "la", help = "Language code (la, ar, he)")]
        language: String,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, help = "Do not treat [1.2]-style markers as numbering labels")]
        no_numbering_labels: bool,
        #[arg(long, help = "Strip quotation marks inside words during normalization")]
        intra_word_quotes: bool,
    },
    #[command(about = "Show information about a collation table")]
    Info {
        #[arg(help = "Path to the collation table (JSON)")]
        table: String,
        #[arg(long, help = "Include per-apparatus entry counts")]
        apparatus: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reconcile {
            table,
            siglum,
            text_file,
            text,
            format,
            apply,
            output,
            max_iterations,
            unbounded,
            progress,
            quiet,
            verbose,
        } => commands::reconcile::run(
            &table,
            &siglum,
            text_file.as_deref(),
            text.as_deref(),
            format,
            apply,
            output.as_deref(),
            max_iterations,
            unbounded,
            progress,
            quiet,
            verbose,
        ),
        Commands::Tokens {
            text_file,
            text,
            language,
            format,
            no_numbering_labels,
            intra_word_quotes,
        } => commands::tokens::run(
            text_file.as_deref(),
            text.as_deref(),
            &language,
            format,
            no_numbering_labels,
            intra_word_quotes,
        ),
        Commands::Info { table, apparatus } => commands::info::run(&table, apparatus),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_internal_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

fn is_internal_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(rec_err) = cause.downcast_ref::<ReconcileError>() {
            return !matches!(rec_err, ReconcileError::Superseded);
        }
        cause.is::<EngineError>() || cause.is::<ChangeListError>() || cause.is::<StoreError>()
    })
}

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging() {
    static LOGGER: SimpleLogger = SimpleLogger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log_level_from_env());
}

fn log_level_from_env() -> LevelFilter {
    match std::env::var("RECOLLATE_LOG").as_deref() {
        Ok("error") => LevelFilter::Error,
        Ok("warn") => LevelFilter::Warn,
        Ok("info") => LevelFilter::Info,
        Ok("debug") => LevelFilter::Debug,
        Ok("trace") => LevelFilter::Trace,
        Ok("off") => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}
