use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::results::ScanOutcome;

/// Counters updated by workers while a scan is running
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    matched: Arc<AtomicU64>,
    not_matched: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    skipped: Arc<AtomicU64>,

    // Bytes read from disk and bytes of text extracted
    bytes_read: Arc<AtomicU64>,
    text_bytes: Arc<AtomicU64>,
    peak_in_flight: Arc<AtomicU64>,
    in_flight: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            matched: Arc::new(AtomicU64::new(0)),
            not_matched: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
            skipped: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            text_bytes: Arc::new(AtomicU64::new(0)),
            peak_in_flight: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records the outcome of one job
    pub fn record_outcome(&self, outcome: &ScanOutcome) {
        let counter = match outcome {
            ScanOutcome::Matched => &self.matched,
            ScanOutcome::NotMatched => &self.not_matched,
            ScanOutcome::Failed(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records jobs that were never dispatched
    pub fn record_skipped(&self, count: u64) {
        self.skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_bytes_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_text_extracted(&self, bytes: u64) {
        self.text_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Marks a job as started, tracking the peak number of concurrent jobs
    pub fn job_started(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => peak = actual,
            }
        }
    }

    pub fn job_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Gets the current counter values
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            matched: self.matched.load(Ordering::Relaxed),
            not_matched: self.not_matched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            text_bytes: self.text_bytes.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Outcomes (match/no match/failed): {}/{}/{}\n\
             Skipped after cancel: {}\n\
             Read: {} bytes, extracted text: {} bytes\n\
             Peak concurrent jobs: {}",
            stats.matched,
            stats.not_matched,
            stats.failed,
            stats.skipped,
            stats.bytes_read,
            stats.text_bytes,
            stats.peak_in_flight
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub matched: u64,
    pub not_matched: u64,
    pub failed: u64,
    pub skipped: u64,
    pub bytes_read: u64,
    pub text_bytes: u64,
    pub peak_in_flight: u64,
}

impl ScanStats {
    /// Jobs that produced an outcome
    pub fn completed(&self) -> u64 {
        self.matched + self.not_matched + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tracking() {
        let metrics = ScanMetrics::new();
        metrics.record_outcome(&ScanOutcome::Matched);
        metrics.record_outcome(&ScanOutcome::NotMatched);
        metrics.record_outcome(&ScanOutcome::NotMatched);
        metrics.record_outcome(&ScanOutcome::Failed("bad".into()));
        metrics.record_skipped(2);

        let stats = metrics.get_stats();
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.not_matched, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.completed(), 4);
    }

    #[test]
    fn test_peak_in_flight() {
        let metrics = ScanMetrics::new();
        metrics.job_started();
        metrics.job_started();
        metrics.job_finished();
        metrics.job_started();
        metrics.job_finished();
        metrics.job_finished();
        assert_eq!(metrics.get_stats().peak_in_flight, 2);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ScanMetrics::new();
        let clone = metrics.clone();
        clone.record_bytes_read(1024);
        clone.record_text_extracted(100);
        let stats = metrics.get_stats();
        assert_eq!(stats.bytes_read, 1024);
        assert_eq!(stats.text_bytes, 100);
    }
}
