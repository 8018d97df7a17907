pub mod cancel;
pub mod config;
pub mod controller;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod persist;
pub mod results;
pub mod scan;
pub mod status;

pub use cancel::CancellationToken;
pub use config::{CliOverrides, DocumentFormat, ScanConfig};
pub use controller::{RunController, RunState};
pub use errors::{ScanError, ScanResult};
pub use persist::ResultPersister;
pub use results::{RunSummary, ScanOutcome};
pub use status::{ConsoleSink, StatusEntry, StatusKind, StatusSink, Transcript};
