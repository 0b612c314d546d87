//! Configuration management.
//!
//! Configuration is read from `~/.config/chorus/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. Missing fields fall back to their defaults, so a partial file
//! is fine.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::scraper::WaitPlan;
use crate::summary::SummaryBackend;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub scrape: WaitPlan,
    pub summary: SummaryConfig,
}

/// Where the already-running browser is listening.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// HTTP debugging endpoint or a `ws://` debugger URL.
    pub endpoint: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9222".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// `local` (offline heuristics) or `remote` (OpenAI API).
    pub backend: SummaryBackend,
    /// Credential for the remote backend. The `OPENAI_API_KEY` environment
    /// variable takes precedence.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            backend: SummaryBackend::Local,
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl SummaryConfig {
    /// The effective credential: environment first, then the config file.
    pub fn effective_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with
    /// comments. If it exists but is invalid, returns an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/chorus/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("chorus").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Chorus configuration
#
# Chorus attaches to an already-running Chrome instance; start it with
#   google-chrome --remote-debugging-port=9222
# and keep your chat tabs open and logged in.

[browser]
# HTTP debugging endpoint, or a ws:// debugger URL directly
endpoint = "http://127.0.0.1:9222"

[scrape]
# Delay after prompt injection before looking for the submit control (ms)
settle_ms = 500

# Delay before the late submit-button retry (ms)
retry_delay_ms = 100

# Delay before the first look at the response area (ms)
initial_wait_ms = 3000

# Interval between busy-indicator polls (ms)
poll_interval_ms = 1000

# Poll ceiling; caps the wait on pages that never clear their indicator
max_polls = 10

[summary]
# "local" for the offline heuristic analyzer, "remote" for the OpenAI API
backend = "local"

# Remote backend credential; the OPENAI_API_KEY environment variable
# takes precedence over this value
# api_key = "sk-..."

model = "gpt-3.5-turbo"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_content_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.browser.endpoint, "http://127.0.0.1:9222");
        assert_eq!(config.scrape, WaitPlan::default());
        assert_eq!(config.summary.backend, SummaryBackend::Local);
        assert_eq!(config.summary.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_partial_config() {
        let content = r#"
[scrape]
initial_wait_ms = 5000
"#;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.scrape.initial_wait_ms, 5000);
        // Defaults fill the rest
        assert_eq!(config.scrape.max_polls, 10);
        assert_eq!(config.browser.endpoint, "http://127.0.0.1:9222");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.summary.backend, SummaryBackend::Local);
    }

    #[test]
    fn test_remote_backend_parses() {
        let content = r#"
[summary]
backend = "remote"
api_key = "sk-test"
"#;
        let config: Config = toml::from_str(content).expect("valid config");
        assert_eq!(config.summary.backend, SummaryBackend::Remote);
        assert_eq!(config.summary.api_key.as_deref(), Some("sk-test"));
    }
}
