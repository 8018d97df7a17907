use regex::{Regex, RegexBuilder};

use crate::errors::{ScanError, ScanResult};

/// Case-insensitive literal matcher for the search term
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    regex: Regex,
}

impl TermMatcher {
    /// Compiles a matcher for `term`. Regex metacharacters are matched literally
    pub fn new(term: impl Into<String>) -> ScanResult<Self> {
        let term = term.into();
        if term.is_empty() {
            return Err(ScanError::invalid_input("search term must not be empty"));
        }

        let regex = RegexBuilder::new(&regex::escape(&term))
            .case_insensitive(true)
            .build()
            .map_err(|e| ScanError::config_error(format!("Invalid search term: {}", e)))?;

        Ok(Self { term, regex })
    }

    /// The term as entered
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
