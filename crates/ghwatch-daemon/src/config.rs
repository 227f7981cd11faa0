use std::path::Path;

use serde::Deserialize;

use ghwatch_core::tray::DEFAULT_TRAY_CAPACITY;
use ghwatch_github::PollerConfig;
use ghwatch_github::config::{DEFAULT_API_ROOT, DEFAULT_POLL_INTERVAL_SECS};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ghwatch.toml";

/// Top-level daemon configuration, loaded from `ghwatch.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub github: GitHubSection,
    pub ui: UiSection,
}

/// Repository, credentials and polling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSection {
    /// `owner/repository`.
    pub repo: String,
    /// API token. Prefer `GHWATCH_TOKEN` over putting it in the file.
    pub token: String,
    pub api_root: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            repo: String::new(),
            token: String::new(),
            api_root: DEFAULT_API_ROOT.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: 30,
        }
    }
}

/// Front-end options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Print a status line after each manual check.
    pub show_indicator: bool,
    /// Notifications kept on screen before the oldest rotates out.
    pub tray_capacity: usize,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            show_indicator: false,
            tray_capacity: DEFAULT_TRAY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("github.poll_interval_secs must be > 0")]
    ZeroPollInterval,
    #[error("github.request_timeout_secs must be > 0")]
    ZeroRequestTimeout,
    #[error("ui.tray_capacity must be > 0")]
    ZeroTrayCapacity,
    #[error("github.api_root must be an http(s) url, got {0:?}")]
    InvalidApiRoot(String),
}

impl DaemonConfig {
    /// Load config from `path` if it exists, then apply env var overrides.
    pub fn load(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<DaemonConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Failed to parse config: {e}, using defaults");
                    DaemonConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                DaemonConfig::default()
            },
        };

        if !config.github.token.is_empty() {
            tracing::warn!("github.token is set in config file; use GHWATCH_TOKEN instead");
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `GHWATCH_*` overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(repo) = lookup("GHWATCH_REPO")
            && !repo.is_empty()
        {
            self.github.repo = repo;
        }
        if let Some(token) = lookup("GHWATCH_TOKEN")
            && !token.is_empty()
        {
            self.github.token = token;
        }
        if let Some(root) = lookup("GHWATCH_API_ROOT")
            && !root.is_empty()
        {
            self.github.api_root = root;
        }
        if let Some(val) = lookup("GHWATCH_POLL_INTERVAL")
            && let Ok(n) = val.parse::<u64>()
        {
            self.github.poll_interval_secs = n;
        }
    }

    /// Reject values the poller cannot run with; warn about soft issues.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.github.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        if self.ui.tray_capacity == 0 {
            return Err(ConfigError::ZeroTrayCapacity);
        }
        let root = self.github.api_root.as_str();
        if !(root.starts_with("http://") || root.starts_with("https://")) {
            return Err(ConfigError::InvalidApiRoot(self.github.api_root.clone()));
        }

        if self.github.repo.is_empty() {
            tracing::warn!("No repository configured; polls fail until github-repo is set");
        }
        if self.github.token.is_empty() {
            tracing::info!("No token configured; using unauthenticated requests");
        }
        Ok(())
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            api_root: self.github.api_root.clone(),
            poll_interval_secs: self.github.poll_interval_secs,
            request_timeout_secs: self.github.request_timeout_secs,
            ..PollerConfig::default()
        }
    }
}
