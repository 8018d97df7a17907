use logscanner::{CancellationToken, ScanError, StatusEntry, StatusKind, StatusSink};
use std::io::BufRead;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, ScanError>;

const BANNER_WIDTH: usize = 38;

/// Prints the welcome banner through the status sink
pub fn banner(sink: &dyn StatusSink) {
    let blank = " ".repeat(BANNER_WIDTH);
    let title = format!("{:^width$}", "Welcome to LogScanner!", width = BANNER_WIDTH);
    sink.report(StatusEntry::new(StatusKind::Banner, blank.clone()));
    sink.report(StatusEntry::new(StatusKind::Banner, title));
    sink.report(StatusEntry::new(StatusKind::Banner, blank));
}

/// Reads one trimmed line. `None` at end of input
fn read_answer(input: &mut dyn BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Asks for a folder until an existing directory is given.
///
/// An empty answer, or end of input, selects `default`. Returns `None` when
/// the run was cancelled while waiting for the answer.
pub fn ask_folder(
    sink: &dyn StatusSink,
    input: &mut dyn BufRead,
    default: &Path,
    cancel: &CancellationToken,
) -> Result<Option<PathBuf>> {
    loop {
        sink.report(StatusEntry::new(
            StatusKind::Prompt,
            format!(
                "Enter folder path to scan (default: '{}'):",
                default.display()
            ),
        ));

        let answer = read_answer(input)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let folder = match answer {
            Some(text) if !text.is_empty() => PathBuf::from(text),
            Some(_) => default.to_path_buf(),
            None => return Ok(Some(default.to_path_buf())),
        };

        if folder.is_dir() {
            return Ok(Some(folder));
        }
        sink.report(StatusEntry::new(
            StatusKind::Error,
            "The folder path you provided is not valid. Try again, or use CTRL+C to quit.",
        ));
    }
}

/// Asks for the search term. An empty answer selects `default`, a cancelled
/// run yields `None`
pub fn ask_term(
    sink: &dyn StatusSink,
    input: &mut dyn BufRead,
    default: &str,
    cancel: &CancellationToken,
) -> Result<Option<String>> {
    sink.report(StatusEntry::new(
        StatusKind::Prompt,
        format!("Enter a search term (default: '{}'):", default),
    ));

    let answer = read_answer(input)?;
    if cancel.is_cancelled() {
        return Ok(None);
    }
    Ok(Some(match answer {
        Some(text) if !text.is_empty() => text,
        _ => default.to_string(),
    }))
}
