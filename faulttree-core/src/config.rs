//! Viewer configuration

use std::time::Duration;

use crate::fetch::DEFAULT_TIMEOUT_MS;

pub const DEFAULT_DATA_DIR: &str = "data/";
pub const DEFAULT_MAIN_FILE: &str = "main.json";

/// Where the dataset lives and how to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Base directory or `http(s)://` base URL of the dataset
    pub data: String,
    /// Main document, relative to `data`
    pub main_file: String,
    /// Timeout for HTTP fetches
    pub timeout: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data: DEFAULT_DATA_DIR.to_string(),
            main_file: DEFAULT_MAIN_FILE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ViewerConfig {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_main_file(mut self, main_file: impl Into<String>) -> Self {
        self.main_file = main_file.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bundled_layout() {
        let config = ViewerConfig::default();
        assert_eq!(config.data, "data/");
        assert_eq!(config.main_file, "main.json");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder() {
        let config = ViewerConfig::new("https://example.com/kb/")
            .with_main_file("tree.json")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(config.data, "https://example.com/kb/");
        assert_eq!(config.main_file, "tree.json");
        assert_eq!(config.timeout, Duration::from_secs(2));
    }
}
