use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::DEFAULT_RESULTS_DIR;
use crate::errors::{ScanError, ScanResult};
use crate::status::Transcript;

const RESULT_SUFFIX: &str = "LogScanner Result";
const TIMESTAMP_FORMAT: &str = "%Y.%m%d.%H%M%S";

// Upper bound on " (n)" suffixes tried within one second
const MAX_COLLISIONS: u32 = 1000;

/// Writes run transcripts to `<folder>/<results_dir>/<timestamp> LogScanner Result.txt`
#[derive(Debug, Clone)]
pub struct ResultPersister {
    results_dir: String,
}

impl Default for ResultPersister {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_DIR)
    }
}

impl ResultPersister {
    pub fn new(results_dir: impl Into<String>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Directory that receives result files for `folder`
    pub fn results_dir(&self, folder: &Path) -> PathBuf {
        folder.join(&self.results_dir)
    }

    /// Persists the transcript using the current local time
    pub fn persist(&self, folder: &Path, transcript: &Transcript) -> ScanResult<PathBuf> {
        self.persist_at(folder, transcript, Local::now())
    }

    /// Persists the transcript with an explicit timestamp.
    ///
    /// Existing files are never overwritten: a name already taken within the
    /// same second gets a ` (2)`, ` (3)`, ... suffix.
    pub fn persist_at(
        &self,
        folder: &Path,
        transcript: &Transcript,
        now: DateTime<Local>,
    ) -> ScanResult<PathBuf> {
        let dir = self.results_dir(folder);
        fs::create_dir_all(&dir).map_err(|e| ScanError::persistence(&dir, e))?;

        let stem = format!("{} {}", now.format(TIMESTAMP_FORMAT), RESULT_SUFFIX);
        let text = transcript.render();

        for attempt in 1..=MAX_COLLISIONS {
            let name = if attempt == 1 {
                format!("{}.txt", stem)
            } else {
                format!("{} ({}).txt", stem, attempt)
            };
            let path = dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(text.as_bytes())
                        .and_then(|_| file.sync_all())
                        .map_err(|e| ScanError::persistence(&path, e))?;
                    info!(
                        "Wrote {} transcript lines to {}",
                        transcript.len(),
                        path.display()
                    );
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("{} already exists, trying next name", path.display());
                }
                Err(e) => return Err(ScanError::persistence(&path, e)),
            }
        }

        Err(ScanError::persistence(
            dir.join(format!("{}.txt", stem)),
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "too many result files with the same timestamp",
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusEntry;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_transcript() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(StatusEntry::info("Discovered 2 files."));
        transcript.push(StatusEntry::info("[NO MATCH] a.pdf"));
        transcript
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_file_name_and_contents() {
        let dir = tempdir().unwrap();
        let persister = ResultPersister::default();
        let path = persister
            .persist_at(dir.path(), &sample_transcript(), fixed_time())
            .unwrap();

        assert_eq!(path.parent().unwrap(), dir.path().join("Results"));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "2024.0307.140509 LogScanner Result.txt"
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Discovered 2 files.\n[NO MATCH] a.pdf\n"
        );
    }

    #[test]
    fn test_same_second_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let persister = ResultPersister::default();
        let first = persister
            .persist_at(dir.path(), &sample_transcript(), fixed_time())
            .unwrap();
        let second = persister
            .persist_at(dir.path(), &Transcript::new(), fixed_time())
            .unwrap();

        assert_ne!(first, second);
        assert!(second.to_str().unwrap().ends_with("LogScanner Result (2).txt"));
        assert_eq!(
            fs::read_to_string(&first).unwrap(),
            sample_transcript().render()
        );
        assert_eq!(fs::read_to_string(&second).unwrap(), "");
    }

    #[test]
    fn test_existing_results_dir_is_reused() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Out")).unwrap();
        let persister = ResultPersister::new("Out");
        let path = persister.persist(dir.path(), &sample_transcript()).unwrap();
        assert!(path.starts_with(dir.path().join("Out")));
    }

    #[test]
    fn test_unwritable_location_is_persistence_error() {
        let dir = tempdir().unwrap();
        // A regular file where the results directory should go
        fs::write(dir.path().join("Results"), "occupied").unwrap();
        let err = ResultPersister::default()
            .persist(dir.path(), &sample_transcript())
            .unwrap_err();
        assert!(matches!(err, ScanError::Persistence { .. }));
    }
}
