use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::matcher::TermMatcher;
use crate::errors::{ScanError, ScanResult};
use crate::filters::{display_name, has_valid_extension};

/// One unit of work: scan a single document for the search term.
///
/// Jobs are built before dispatch and never mutated, so each worker owns
/// its own copy of the path and a shared handle to the compiled term.
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub path: PathBuf,
    pub display_name: String,
    pub matcher: Arc<TermMatcher>,
}

impl ScanJob {
    pub fn new(path: PathBuf, matcher: Arc<TermMatcher>) -> Self {
        let display_name = display_name(&path);
        Self {
            path,
            display_name,
            matcher,
        }
    }

    pub fn search_term(&self) -> &str {
        self.matcher.term()
    }
}

/// Enumerates the documents in a folder and produces one job per file
#[derive(Debug, Clone)]
pub struct JobBuilder {
    matcher: Arc<TermMatcher>,
    extensions: Vec<String>,
}

impl JobBuilder {
    pub fn new(matcher: Arc<TermMatcher>, extensions: Vec<String>) -> Self {
        Self {
            matcher,
            extensions,
        }
    }

    /// Lists the immediate children of `folder` with an accepted extension.
    ///
    /// Subdirectories are not descended into. Jobs keep the directory's
    /// enumeration order, which carries no meaning for processing order.
    /// Failing to read `folder` itself is an error; an unreadable child is
    /// skipped with a warning.
    pub fn build(&self, folder: &Path) -> ScanResult<Vec<ScanJob>> {
        // The walker yields a plain file root as an entry instead of failing
        fs::read_dir(folder).map_err(|e| ScanError::from_open(folder, e))?;

        let mut walker = WalkBuilder::new(folder);
        walker
            .max_depth(Some(1))
            .standard_filters(false)
            .follow_links(true);

        let mut jobs = Vec::new();
        for entry in walker.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == Some(0) => return Err(walk_error(folder, e)),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", folder.display(), e);
                    continue;
                }
            };

            if entry.depth() == 1
                && entry.file_type().is_some_and(|ft| ft.is_file())
                && has_valid_extension(entry.path(), &self.extensions)
            {
                jobs.push(ScanJob::new(entry.into_path(), Arc::clone(&self.matcher)));
            }
        }

        debug!(
            "Built {} jobs from {} (extensions: {:?})",
            jobs.len(),
            folder.display(),
            self.extensions
        );
        Ok(jobs)
    }
}

fn walk_error(folder: &Path, err: ignore::Error) -> ScanError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(io_err) => ScanError::from_open(folder, io_err),
        None => ScanError::Io(io::Error::new(io::ErrorKind::Other, message)),
    }
}
