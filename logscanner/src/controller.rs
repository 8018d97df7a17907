use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::persist::ResultPersister;
use crate::results::RunSummary;
use crate::scan::{JobBuilder, ScanWorkerPool, TermMatcher, TextExtractor};
use crate::status::{StatusEntry, StatusKind, StatusSink};

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    CollectingInput,
    Discovering,
    Dispatching,
    Running,
    Cancelling,
    Finalizing,
    Done,
}

/// Drives one scan from input validation to the persisted transcript
pub struct RunController<E> {
    config: ScanConfig,
    extractor: Arc<E>,
    sink: Arc<dyn StatusSink>,
    cancel: CancellationToken,
    persister: ResultPersister,
    state: RunState,
}

impl<E: TextExtractor> RunController<E> {
    pub fn new(config: ScanConfig, extractor: Arc<E>, sink: Arc<dyn StatusSink>) -> Self {
        let persister = ResultPersister::new(config.results_dir.clone());
        Self {
            config,
            extractor,
            sink,
            cancel: CancellationToken::new(),
            persister,
            state: RunState::Idle,
        }
    }

    /// Uses an externally owned cancellation token, e.g. one wired to Ctrl+C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn report(&self, kind: StatusKind, message: impl Into<String>) {
        self.sink.report(StatusEntry::new(kind, message));
    }

    /// Executes the run. May be called once.
    ///
    /// Invalid input fails before any job is built. Once jobs exist, the
    /// transcript is always persisted, including after a cancellation; a
    /// persistence failure is returned as the run's error.
    pub fn run(&mut self) -> ScanResult<RunSummary> {
        if self.state != RunState::Idle {
            return Err(ScanError::invalid_input("this run has already been started"));
        }
        let started = Instant::now();

        self.transition(RunState::CollectingInput);
        self.config.validate()?;
        let matcher = Arc::new(TermMatcher::new(self.config.search_term.clone())?);
        info!(
            "Scanning {} for {:?}",
            self.config.folder_path.display(),
            matcher.term()
        );

        self.transition(RunState::Discovering);
        let builder = JobBuilder::new(matcher, self.config.effective_extensions());
        let jobs = builder.build(&self.config.folder_path)?;
        self.report(
            StatusKind::Discovered,
            format!(
                "Discovered {} {} files.",
                jobs.len(),
                self.config.document_label()
            ),
        );

        self.transition(RunState::Dispatching);
        self.report(StatusKind::Info, "Building jobs list...");
        self.report(StatusKind::JobsCreated, format!("{} jobs created.", jobs.len()));
        let pool = ScanWorkerPool::new(Arc::clone(&self.extractor), self.config.thread_count)?;

        self.transition(RunState::Running);
        self.report(StatusKind::Running, "Running jobs in parallel...");
        let report = pool.run(&jobs, self.sink.as_ref(), &self.cancel);

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            self.transition(RunState::Cancelling);
            let message = if report.skipped > 0 {
                format!(
                    "Cancel request complete. {} of {} files were not scanned.",
                    report.skipped,
                    jobs.len()
                )
            } else {
                "Cancel request complete. Every file was already dispatched and has been scanned."
                    .to_string()
            };
            self.report(StatusKind::CancelComplete, message);
        }

        self.transition(RunState::Finalizing);
        if report.skipped > 0 {
            self.report(
                StatusKind::Done,
                format!(
                    "Operation cancelled. The results above cover the {} files scanned before the cancel request.",
                    report.dispatched
                ),
            );
        } else {
            self.report(
                StatusKind::Done,
                "Operation Complete. All files have been scanned, check the results above for any hits.",
            );
        }

        let transcript = self.sink.transcript();
        let persisted = self.persister.persist(&self.config.folder_path, &transcript);
        self.transition(RunState::Done);
        let results_path = persisted?;

        let summary = RunSummary {
            files_discovered: jobs.len(),
            files_scanned: report.stats.completed() as usize,
            matched: report.stats.matched as usize,
            not_matched: report.stats.not_matched as usize,
            failed: report.stats.failed as usize,
            skipped: report.skipped,
            cancelled,
            results_path: Some(results_path),
            elapsed: started.elapsed(),
        };
        info!(
            "Run finished in {}: {} matched, {} not matched, {} failed, {} skipped",
            summary.elapsed_display(),
            summary.matched,
            summary.not_matched,
            summary.failed,
            summary.skipped
        );
        Ok(summary)
    }
}
