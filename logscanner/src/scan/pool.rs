use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::extractor::TextExtractor;
use super::jobs::ScanJob;
use super::processor::DocumentProcessor;
use crate::cancel::CancellationToken;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::{ScanMetrics, ScanStats};
use crate::status::{StatusEntry, StatusSink};

/// What happened to the job list during one pool run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Jobs taken off the queue and run to an outcome
    pub dispatched: usize,
    /// Jobs left on the queue because of cancellation
    pub skipped: usize,
    pub stats: ScanStats,
}

/// Bounded set of workers draining a shared job queue
pub struct ScanWorkerPool<E> {
    pool: ThreadPool,
    workers: usize,
    processor: DocumentProcessor<E>,
}

impl<E: TextExtractor> ScanWorkerPool<E> {
    /// Creates a pool with `thread_count` workers
    pub fn new(extractor: Arc<E>, thread_count: NonZeroUsize) -> ScanResult<Self> {
        Self::with_metrics(extractor, thread_count, ScanMetrics::new())
    }

    pub fn with_metrics(
        extractor: Arc<E>,
        thread_count: NonZeroUsize,
        metrics: ScanMetrics,
    ) -> ScanResult<Self> {
        let workers = thread_count.get();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("logscanner-worker-{}", i))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            workers,
            processor: DocumentProcessor::new(extractor, metrics),
        })
    }

    pub fn metrics(&self) -> &ScanMetrics {
        self.processor.metrics()
    }

    /// Runs every job and blocks until all dispatched jobs have reported.
    ///
    /// Each worker checks `cancel` before taking the next job, so a
    /// cancellation stops dispatch without interrupting running jobs. Every
    /// dispatched job reports exactly one outcome entry to `sink`.
    pub fn run(
        &self,
        jobs: &[ScanJob],
        sink: &dyn StatusSink,
        cancel: &CancellationToken,
    ) -> PoolReport {
        let next = AtomicUsize::new(0);
        let dispatched = AtomicUsize::new(0);
        let workers = self.workers.min(jobs.len());
        debug!("Running {} jobs on {} workers", jobs.len(), workers);

        let next = &next;
        let dispatched = &dispatched;
        let processor = &self.processor;

        self.pool.scope(|s| {
            for worker in 0..workers {
                s.spawn(move |_| loop {
                    if cancel.is_cancelled() {
                        debug!("Worker {} stopping: cancellation requested", worker);
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(job) = jobs.get(index) else {
                        break;
                    };
                    dispatched.fetch_add(1, Ordering::SeqCst);

                    let outcome = processor.process(job);
                    sink.report(StatusEntry::outcome(&job.display_name, &outcome));
                });
            }
        });

        let dispatched = dispatched.load(Ordering::SeqCst);
        let skipped = jobs.len() - dispatched;
        if skipped > 0 {
            info!("{} jobs not dispatched after cancellation", skipped);
            self.metrics().record_skipped(skipped as u64);
        }
        self.metrics().log_stats();

        PoolReport {
            dispatched,
            skipped,
            stats: self.metrics().get_stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::extractor::PlainTextExtractor;
    use crate::scan::jobs::JobBuilder;
    use crate::scan::matcher::TermMatcher;
    use crate::status::{ConsoleSink, StatusKind};
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn jobs_for(dir: &std::path::Path, term: &str) -> Vec<ScanJob> {
        JobBuilder::new(
            Arc::new(TermMatcher::new(term).unwrap()),
            vec!["txt".to_string()],
        )
        .build(dir)
        .unwrap()
    }

    #[test]
    fn test_every_job_reports_once() {
        let dir = tempdir().unwrap();
        for i in 0..40 {
            let body = if i % 4 == 0 { "65 Main Street" } else { "Elm Road" };
            fs::write(dir.path().join(format!("log_{}.txt", i)), body).unwrap();
        }
        let jobs = jobs_for(dir.path(), "65 main street");

        let pool =
            ScanWorkerPool::new(Arc::new(PlainTextExtractor), NonZeroUsize::new(4).unwrap())
                .unwrap();
        let sink = ConsoleSink::new(io::sink(), false);
        let report = pool.run(&jobs, &sink, &CancellationToken::new());

        assert_eq!(report.dispatched, 40);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.stats.matched, 10);
        assert_eq!(report.stats.not_matched, 30);

        let transcript = sink.transcript();
        assert_eq!(transcript.outcomes().count(), 40);
        assert_eq!(transcript.count(StatusKind::Matched), 10);
        assert!(report.stats.peak_in_flight <= 4);
    }

    #[test]
    fn test_cancelled_before_run_dispatches_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::write(dir.path().join("b.txt"), "x").unwrap();
        let jobs = jobs_for(dir.path(), "x");

        let pool =
            ScanWorkerPool::new(Arc::new(PlainTextExtractor), NonZeroUsize::new(2).unwrap())
                .unwrap();
        let sink = ConsoleSink::new(io::sink(), false);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = pool.run(&jobs, &sink, &cancel);
        assert_eq!(report.dispatched, 0);
        assert_eq!(report.skipped, 2);
        assert!(sink.transcript().is_empty());
    }

    #[test]
    fn test_empty_job_list() {
        let pool =
            ScanWorkerPool::new(Arc::new(PlainTextExtractor), NonZeroUsize::new(2).unwrap())
                .unwrap();
        let sink = ConsoleSink::new(io::sink(), false);
        let report = pool.run(&[], &sink, &CancellationToken::new());
        assert_eq!(report, PoolReport::default());
    }
}
