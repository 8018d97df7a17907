use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Classification of a single scanned document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScanOutcome {
    /// The document text contains the search term
    Matched,
    /// The document was read but the term was not found
    NotMatched,
    /// The document could not be opened or its text could not be extracted
    Failed(String),
}

/// Totals for a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Files found by the job builder
    pub files_discovered: usize,
    /// Jobs that ran to an outcome
    pub files_scanned: usize,
    pub matched: usize,
    pub not_matched: usize,
    pub failed: usize,
    /// Jobs never dispatched because the run was cancelled
    pub skipped: usize,
    pub cancelled: bool,
    /// Transcript file written at the end of the run
    pub results_path: Option<PathBuf>,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl RunSummary {
    /// Human readable elapsed time, truncated to milliseconds
    pub fn elapsed_display(&self) -> String {
        let millis = Duration::from_millis(self.elapsed.as_millis() as u64);
        humantime::format_duration(millis).to_string()
    }

    /// JSON form of the summary, for scripting
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
