//! Serialized status reporting.
//!
//! Every line the run produces goes through a [`StatusSink`]. The sink
//! renders the line on a live surface (normally the terminal) and appends it
//! to the run's [`Transcript`], both under a single lock, so concurrent
//! workers never interleave partial lines. Entry order is the order in which
//! `report` calls acquire the lock, which is not the job submission order.
use crossterm::{
    cursor::MoveToPreviousLine,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

use crate::results::ScanOutcome;

/// Semantic category of a status line, mapped to a color pair on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Banner,
    Prompt,
    Info,
    Discovered,
    JobsCreated,
    Running,
    Matched,
    NotMatched,
    Failed,
    Error,
    CancelRequested,
    CancelComplete,
    Done,
}

impl StatusKind {
    /// Foreground and background colors for this kind
    pub fn colors(self) -> (Color, Color) {
        match self {
            StatusKind::Banner => (Color::White, Color::DarkBlue),
            StatusKind::Prompt => (Color::DarkYellow, Color::Black),
            StatusKind::Info => (Color::DarkCyan, Color::Black),
            StatusKind::Discovered => (Color::Cyan, Color::Black),
            StatusKind::JobsCreated => (Color::DarkGreen, Color::Black),
            StatusKind::Running => (Color::White, Color::DarkGreen),
            StatusKind::Matched => (Color::Green, Color::Black),
            StatusKind::NotMatched => (Color::DarkGrey, Color::Black),
            StatusKind::Failed => (Color::White, Color::DarkRed),
            StatusKind::Error => (Color::White, Color::DarkRed),
            StatusKind::CancelRequested => (Color::Black, Color::Yellow),
            StatusKind::CancelComplete => (Color::White, Color::DarkRed),
            StatusKind::Done => (Color::White, Color::Black),
        }
    }

    /// Whether entries of this kind record a job outcome
    pub fn is_outcome(self) -> bool {
        matches!(
            self,
            StatusKind::Matched | StatusKind::NotMatched | StatusKind::Failed
        )
    }
}

/// One status line plus its presentation hints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub kind: StatusKind,
    pub message: String,
    /// Overwrite the previous console line instead of starting a new one
    pub replace_last_line: bool,
}

impl StatusEntry {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            replace_last_line: false,
        }
    }

    /// Marks the entry as a replacement for the previous console line
    pub fn replacing(mut self) -> Self {
        self.replace_last_line = true;
        self
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, message)
    }

    /// Builds the status line that records a job's outcome
    pub fn outcome(display_name: &str, outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Matched => Self::new(
                StatusKind::Matched,
                format!("[***** MATCH *****] {}", display_name),
            ),
            ScanOutcome::NotMatched => {
                Self::new(StatusKind::NotMatched, format!("[NO MATCH] {}", display_name))
            }
            ScanOutcome::Failed(reason) => Self::new(
                StatusKind::Failed,
                format!("[ERROR] {}: {}", display_name, reason),
            ),
        }
    }

    pub fn cancel_requested() -> Self {
        Self::new(
            StatusKind::CancelRequested,
            "Requesting cancel, please wait...",
        )
    }
}

/// Ordered record of every status entry reported during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<StatusEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that record a job outcome
    pub fn outcomes(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter().filter(|e| e.kind.is_outcome())
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: StatusKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Plain text rendering, one line per entry
    pub fn render(&self) -> String {
        let mut text = String::with_capacity(self.entries.iter().map(|e| e.message.len() + 1).sum());
        for entry in &self.entries {
            text.push_str(&entry.message);
            text.push('\n');
        }
        text
    }
}

/// Destination for status lines, shared by the controller and all workers
pub trait StatusSink: Send + Sync {
    /// Renders the entry and appends it to the transcript as one atomic step
    fn report(&self, entry: StatusEntry);

    /// Snapshot of the transcript so far
    fn transcript(&self) -> Transcript;
}

struct SinkState<W> {
    out: W,
    transcript: Transcript,
}

/// Status sink that renders colored lines to a writer, usually stdout
pub struct ConsoleSink<W: Write + Send> {
    state: Mutex<SinkState<W>>,
    colors: bool,
}

impl ConsoleSink<io::Stdout> {
    /// Sink writing to the process's standard output
    pub fn stdout(colors: bool) -> Self {
        Self::new(io::stdout(), colors)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, colors: bool) -> Self {
        Self {
            state: Mutex::new(SinkState {
                out,
                transcript: Transcript::new(),
            }),
            colors,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState<W>> {
        // A worker that panicked mid-report leaves the state usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Consumes the sink and returns the writer, mostly for tests
    pub fn into_inner(self) -> W {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.out
    }

    fn render(&self, out: &mut W, entry: &StatusEntry) -> io::Result<()> {
        if entry.replace_last_line {
            // Not every terminal supports cursor movement
            let _ = queue!(out, MoveToPreviousLine(1), Clear(ClearType::CurrentLine));
        }

        if self.colors {
            let (fg, bg) = entry.kind.colors();
            queue!(
                out,
                SetForegroundColor(fg),
                SetBackgroundColor(bg),
                Print(&entry.message),
                ResetColor,
                Print("\n")
            )?;
        } else {
            writeln!(out, "{}", entry.message)?;
        }
        out.flush()
    }
}

impl<W: Write + Send> StatusSink for ConsoleSink<W> {
    fn report(&self, entry: StatusEntry) {
        let mut state = self.lock();
        let SinkState { out, transcript } = &mut *state;
        if let Err(e) = self.render(out, &entry) {
            trace!("Status line not rendered: {}", e);
        }
        transcript.push(entry);
    }

    fn transcript(&self) -> Transcript {
        self.lock().transcript.clone()
    }
}
