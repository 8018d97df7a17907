//! Concurrent document scanning.
//!
//! The pipeline has four stages:
//!
//! 1. [`JobBuilder`] lists the documents in a folder and builds an immutable
//!    [`ScanJob`] for each one.
//! 2. [`ScanWorkerPool`] runs a fixed number of `rayon` workers that pull
//!    jobs from a shared queue until it is empty or the run is cancelled.
//! 3. [`DocumentProcessor`] opens the file, hands the stream to a
//!    [`TextExtractor`], decodes the text and checks it against the
//!    case-insensitive [`TermMatcher`].
//! 4. Each outcome is reported through the shared
//!    [`StatusSink`](crate::status::StatusSink) as soon as it is known.
//!
//! ```rust,ignore
//! let matcher = Arc::new(TermMatcher::new("65 Main Street")?);
//! let jobs = JobBuilder::new(matcher, vec!["pdf".into()]).build(folder)?;
//! let pool = ScanWorkerPool::new(Arc::new(PdfExtractor), thread_count)?;
//! let report = pool.run(&jobs, &sink, &cancel);
//! ```
//!
//! A job that fails, including one whose extractor panics, is reported as
//! failed and never affects the other jobs.
pub mod extractor;
pub mod jobs;
pub mod matcher;
pub mod pool;
pub mod processor;

pub use extractor::{PdfExtractor, PlainTextExtractor, TextExtractor};
pub use jobs::{JobBuilder, ScanJob};
pub use matcher::TermMatcher;
pub use pool::{PoolReport, ScanWorkerPool};
pub use processor::DocumentProcessor;
