use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};

/// Search term used when the operator leaves the prompt empty.
pub const DEFAULT_SEARCH_TERM: &str = "65 Main Street";

/// Name of the subdirectory that receives result transcripts.
pub const DEFAULT_RESULTS_DIR: &str = "Results";

/// Document format handled by the text extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// PDF documents, text pulled from the page content streams
    #[default]
    Pdf,
    /// Plain text files, read as-is
    Text,
}

impl DocumentFormat {
    /// Extensions scanned for this format when none are configured
    pub fn default_extensions(self) -> Vec<String> {
        match self {
            DocumentFormat::Pdf => vec!["pdf".to_string()],
            DocumentFormat::Text => vec!["txt".to_string(), "log".to_string()],
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "text" | "txt" => Ok(DocumentFormat::Text),
            other => Err(ScanError::config_error(format!(
                "Unknown document format '{}', expected 'pdf' or 'text'",
                other
            ))),
        }
    }
}

/// Configuration for one scan run.
///
/// # Configuration Locations
///
/// Loaded from the following files, later ones taking precedence:
/// 1. Global `$CONFIG_DIR/logscanner/config.yaml`
/// 2. Local `.logscanner.yaml` in the current directory
/// 3. Custom file given with `--config`
///
/// # Configuration Format
///
/// ```yaml
/// folder_path: "/srv/police-logs"
/// search_term: "65 Main Street"
/// document_format: "pdf"
/// file_extensions: ["pdf"]
/// thread_count: 4
/// log_level: "info"
/// results_dir: "Results"
/// ```
///
/// Every field has a default, so an empty file is valid. Command-line
/// arguments are layered on top with [`ScanConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Folder whose immediate children are scanned
    pub folder_path: PathBuf,

    /// Term searched for, compared case-insensitively
    pub search_term: String,

    /// Format of the documents in the folder
    pub document_format: DocumentFormat,

    /// Extensions to include. If None, the format's defaults are used
    pub file_extensions: Option<Vec<String>>,

    /// Number of worker threads.
    /// Defaults to number of CPU cores if not specified
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Name of the results subdirectory created under `folder_path`
    pub results_dir: String,

    /// Disable colored status lines
    pub no_color: bool,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            folder_path: PathBuf::from("."),
            search_term: DEFAULT_SEARCH_TERM.to_string(),
            document_format: DocumentFormat::default(),
            file_extensions: None,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
            results_dir: DEFAULT_RESULTS_DIR.to_string(),
            no_color: false,
        }
    }
}

impl ScanConfig {
    /// Creates a config for `folder_path` and `search_term` with defaults elsewhere
    pub fn new(folder_path: impl Into<PathBuf>, search_term: impl Into<String>) -> Self {
        Self {
            folder_path: folder_path.into(),
            search_term: search_term.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations plus an optional custom file
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("logscanner/config.yaml")),
            Some(PathBuf::from(".logscanner.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Fields left as `None` on the CLI side keep the file value.
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(folder) = cli.folder_path {
            self.folder_path = folder;
        }
        if let Some(term) = cli.search_term {
            self.search_term = term;
        }
        if let Some(format) = cli.document_format {
            self.document_format = format;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if cli.no_color {
            self.no_color = true;
        }
        self
    }

    /// Applies the documented defaults to blank operator input
    pub fn apply_input_defaults(&mut self) {
        if self.folder_path.as_os_str().is_empty() {
            self.folder_path = PathBuf::from(".");
        }
        if self.search_term.trim().is_empty() {
            self.search_term = DEFAULT_SEARCH_TERM.to_string();
        }
    }

    /// Extensions that the job builder should accept
    pub fn effective_extensions(&self) -> Vec<String> {
        match &self.file_extensions {
            Some(exts) if !exts.is_empty() => exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            _ => self.document_format.default_extensions(),
        }
    }

    /// Name for the scanned documents in status lines, e.g. "PDF" or "DOC/RTF"
    pub fn document_label(&self) -> String {
        match &self.file_extensions {
            Some(exts) if !exts.is_empty() => self
                .effective_extensions()
                .iter()
                .map(|e| e.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join("/"),
            _ => match self.document_format {
                DocumentFormat::Pdf => "PDF".to_string(),
                DocumentFormat::Text => "text".to_string(),
            },
        }
    }

    /// Checks the folder and search term before any job is built
    pub fn validate(&self) -> ScanResult<()> {
        if !self.folder_path.is_dir() {
            return Err(ScanError::invalid_input(format!(
                "folder '{}' does not exist or is not a directory",
                self.folder_path.display()
            )));
        }
        if self.search_term.is_empty() {
            return Err(ScanError::invalid_input("search term must not be empty"));
        }
        if self.results_dir.is_empty() {
            return Err(ScanError::config_error("results_dir must not be empty"));
        }
        Ok(())
    }
}

/// Values supplied on the command line, each optional
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub folder_path: Option<PathBuf>,
    pub search_term: Option<String>,
    pub document_format: Option<DocumentFormat>,
    pub file_extensions: Option<Vec<String>>,
    pub thread_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
            folder_path: "logs"
            search_term: "Elm Road"
            document_format: "text"
            file_extensions: ["log"]
            thread_count: 3
            log_level: "debug"
            results_dir: "Out"
        "#,
        )
        .unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.folder_path, PathBuf::from("logs"));
        assert_eq!(config.search_term, "Elm Road");
        assert_eq!(config.document_format, DocumentFormat::Text);
        assert_eq!(config.file_extensions, Some(vec!["log".to_string()]));
        assert_eq!(config.thread_count, NonZeroUsize::new(3).unwrap());
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.results_dir, "Out");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "search_term: \"Oak\"\n").unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.search_term, "Oak");
        assert_eq!(config.folder_path, PathBuf::from("."));
        assert_eq!(config.document_format, DocumentFormat::Pdf);
        assert_eq!(config.file_extensions, None);
        assert_eq!(
            config.thread_count,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.results_dir, DEFAULT_RESULTS_DIR);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
            thread_count: "lots"
            document_format: "docx"
        "#,
        )
        .unwrap();

        let result = ScanConfig::load_from(Some(&config_path));
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ScanConfig::load_from(Some(Path::new("nonexistent-logscanner.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_document_label() {
        let mut config = ScanConfig::default();
        assert_eq!(config.document_label(), "PDF");

        config.document_format = DocumentFormat::Text;
        assert_eq!(config.document_label(), "text");

        config.file_extensions = Some(vec![".doc".to_string(), "rtf".to_string()]);
        assert_eq!(config.document_label(), "DOC/RTF");

        config.file_extensions = Some(Vec::new());
        assert_eq!(config.document_label(), "text");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = ScanConfig {
            folder_path: PathBuf::from("logs"),
            search_term: "Elm Road".to_string(),
            file_extensions: Some(vec!["pdf".to_string()]),
            thread_count: NonZeroUsize::new(2).unwrap(),
            ..ScanConfig::default()
        };

        let merged = file_config.merge_with_cli(CliOverrides {
            search_term: Some("Oak Avenue".to_string()),
            thread_count: NonZeroUsize::new(8),
            no_color: true,
            ..CliOverrides::default()
        });

        assert_eq!(merged.folder_path, PathBuf::from("logs")); // file value
        assert_eq!(merged.search_term, "Oak Avenue"); // CLI value
        assert_eq!(merged.file_extensions, Some(vec!["pdf".to_string()]));
        assert_eq!(merged.thread_count, NonZeroUsize::new(8).unwrap());
        assert!(merged.no_color);
    }

    #[test]
    fn test_apply_input_defaults() {
        let mut config = ScanConfig::new("", "   ");
        config.apply_input_defaults();
        assert_eq!(config.folder_path, PathBuf::from("."));
        assert_eq!(config.search_term, DEFAULT_SEARCH_TERM);
    }

    #[test]
    fn test_effective_extensions() {
        let mut config = ScanConfig::default();
        assert_eq!(config.effective_extensions(), vec!["pdf"]);

        config.document_format = DocumentFormat::Text;
        assert_eq!(config.effective_extensions(), vec!["txt", "log"]);

        config.file_extensions = Some(vec![".doc".to_string()]);
        assert_eq!(config.effective_extensions(), vec!["doc"]);
    }

    #[test]
    fn test_validate() {
        let dir = tempdir().unwrap();
        assert!(ScanConfig::new(dir.path(), "term").validate().is_ok());

        let missing = ScanConfig::new(dir.path().join("nope"), "term");
        assert!(matches!(missing.validate(), Err(ScanError::InvalidInput(_))));

        let empty_term = ScanConfig::new(dir.path(), "");
        assert!(matches!(
            empty_term.validate(),
            Err(ScanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_document_format_from_str() {
        assert_eq!("PDF".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!("text".parse::<DocumentFormat>().unwrap(), DocumentFormat::Text);
        assert!("docx".parse::<DocumentFormat>().is_err());
    }
}
