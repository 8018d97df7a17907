use std::any::Any;
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::extractor::TextExtractor;
use super::jobs::ScanJob;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::ScanOutcome;

const BUFFER_CAPACITY: usize = 65536;

/// Decodes extracted bytes permissively, replacing invalid UTF-8
fn decode_text<'a>(bytes: &'a [u8], path: &Path) -> Cow<'a, str> {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!("Invalid UTF-8 replaced in text of {}", path.display());
    }
    text
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs the per-document pipeline: open, extract, decode, search
#[derive(Debug)]
pub struct DocumentProcessor<E> {
    extractor: Arc<E>,
    metrics: ScanMetrics,
}

impl<E: TextExtractor> DocumentProcessor<E> {
    pub fn new(extractor: Arc<E>, metrics: ScanMetrics) -> Self {
        Self { extractor, metrics }
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Processes one job and classifies it.
    ///
    /// Never fails: errors and extractor panics become [`ScanOutcome::Failed`].
    pub fn process(&self, job: &ScanJob) -> ScanOutcome {
        debug!("[SCANNING] {}", job.display_name);
        self.metrics.job_started();

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.search_document(job))) {
            Ok(Ok(true)) => ScanOutcome::Matched,
            Ok(Ok(false)) => ScanOutcome::NotMatched,
            Ok(Err(e)) => {
                warn!("Failed to scan {}: {}", job.path.display(), e);
                ScanOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                warn!("Extractor panicked on {}: {}", job.path.display(), msg);
                ScanOutcome::Failed(format!("document library panicked: {}", msg))
            }
        };

        self.metrics.job_finished();
        self.metrics.record_outcome(&outcome);
        outcome
    }

    fn search_document(&self, job: &ScanJob) -> ScanResult<bool> {
        // The file handle lives only for the parse step
        let document = {
            let file = File::open(&job.path).map_err(|e| ScanError::from_open(&job.path, e))?;
            if let Ok(metadata) = file.metadata() {
                self.metrics.record_bytes_read(metadata.len());
            }
            let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
            self.extractor.open(&mut reader)?
        };

        let bytes = self.extractor.extract_text(document)?;
        self.metrics.record_text_extracted(bytes.len() as u64);
        trace!("Extracted {} bytes of text from {}", bytes.len(), job.path.display());

        let text = decode_text(&bytes, &job.path);
        Ok(job.matcher.is_match(&text))
    }
}
