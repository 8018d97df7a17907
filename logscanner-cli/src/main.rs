mod prompt;

use clap::Parser;
use colored::Colorize;
use crossterm::{execute, terminal::SetTitle};
use logscanner::{
    scan::{PdfExtractor, PlainTextExtractor, TextExtractor},
    CancellationToken, CliOverrides, ConsoleSink, DocumentFormat, RunController, RunSummary,
    ScanConfig, ScanError, StatusEntry, StatusKind, StatusSink,
};
use std::io::{self, IsTerminal};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

/// Scan a folder of documents for a search term
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder whose documents are scanned (prompted for when omitted)
    #[arg(short = 'd', long = "dir")]
    folder: Option<PathBuf>,

    /// Search term, matched case-insensitively (prompted for when omitted)
    #[arg(short = 't', long = "term")]
    term: Option<String>,

    /// Document format (pdf|text)
    #[arg(short = 'f', long = "format")]
    format: Option<DocumentFormat>,

    /// File extensions to include (e.g. pdf,PDF)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Never prompt; use configured defaults for missing values
    #[arg(long)]
    no_prompt: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let needs_folder = cli.folder.is_none();
    let needs_term = cli.term.is_none();
    let interactive = !cli.no_prompt && io::stdin().is_terminal();

    let overrides = CliOverrides {
        folder_path: cli.folder,
        search_term: cli.term,
        document_format: cli.format,
        file_extensions: cli.extensions.as_ref().map(|e| {
            e.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        }),
        thread_count: cli.threads,
        log_level: cli.log_level,
        no_color: cli.no_color,
    };
    let mut config = ScanConfig::load_from(cli.config.as_deref())?.merge_with_cli(overrides);
    config.apply_input_defaults();

    init_tracing(&config.log_level);
    if config.no_color {
        colored::control::set_override(false);
    }

    let colors = !config.no_color && io::stdout().is_terminal();
    let sink: Arc<dyn StatusSink> = Arc::new(ConsoleSink::stdout(colors));
    let cancel = CancellationToken::new();
    let scanning = Arc::new(AtomicBool::new(false));
    install_cancel_handler(Arc::clone(&sink), cancel.clone(), Arc::clone(&scanning))?;

    set_title("LogScanner");

    if interactive && (needs_folder || needs_term) {
        prompt::banner(sink.as_ref());
        let mut stdin = io::stdin().lock();
        if needs_folder {
            match prompt::ask_folder(sink.as_ref(), &mut stdin, &config.folder_path, &cancel)? {
                Some(folder) => config.folder_path = folder,
                None => return Ok(()),
            }
        }
        if needs_term {
            match prompt::ask_term(sink.as_ref(), &mut stdin, &config.search_term, &cancel)? {
                Some(term) => config.search_term = term,
                None => return Ok(()),
            }
        }
        config.apply_input_defaults();
    }

    debug!("Effective configuration: {:?}", config);
    let json = cli.json;
    scanning.store(true, Ordering::SeqCst);
    let summary = match config.document_format {
        DocumentFormat::Pdf => scan(config, PdfExtractor::new(), sink, cancel)?,
        DocumentFormat::Text => scan(config, PlainTextExtractor::new(), sink, cancel)?,
    };

    set_title("LogScanner - Done!");
    if json {
        let text = summary
            .to_json()
            .map_err(|e| ScanError::config_error(format!("Unable to encode summary: {}", e)))?;
        println!("{}", text);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn scan<E: TextExtractor>(
    config: ScanConfig,
    extractor: E,
    sink: Arc<dyn StatusSink>,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    RunController::new(config, Arc::new(extractor), sink)
        .with_cancellation(cancel)
        .run()
}

fn set_title(title: &str) {
    if io::stdout().is_terminal() {
        let _ = execute!(io::stdout(), SetTitle(title));
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Turns Ctrl+C into a soft cancellation of the run.
///
/// Before scanning starts there is nothing to wind down, and a pending
/// prompt read cannot be interrupted, so the process exits right away.
fn install_cancel_handler(
    sink: Arc<dyn StatusSink>,
    cancel: CancellationToken,
    scanning: Arc<AtomicBool>,
) -> Result<()> {
    ctrlc::set_handler(move || {
        if !scanning.load(Ordering::SeqCst) {
            cancel.cancel();
            sink.report(StatusEntry::new(
                StatusKind::CancelComplete,
                "Cancelled before scanning started. No files were scanned.",
            ));
            process::exit(0);
        }
        if cancel.cancel() {
            sink.report(StatusEntry::cancel_requested());
        } else {
            warn!("Cancel already requested, waiting for running jobs to finish");
        }
    })
    .map_err(|e| ScanError::config_error(format!("Unable to install Ctrl+C handler: {}", e)))
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\n{} {} matched, {} not matched, {} failed{} ({} files in {})",
        "Summary:".bold(),
        summary.matched.to_string().green(),
        summary.not_matched,
        if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().normal()
        },
        if summary.skipped > 0 {
            format!(", {} skipped", summary.skipped).yellow()
        } else {
            "".normal()
        },
        summary.files_discovered,
        summary.elapsed_display()
    );

    if let Some(path) = &summary.results_path {
        println!("Results saved to {}", path.display().to_string().blue());
    }
}
