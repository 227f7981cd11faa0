/// Default repository API root; `{owner}/{repo}` is appended.
pub const DEFAULT_API_ROOT: &str = "https://api.github.com/repos";

/// Default seconds between automatic polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Configuration for the event feed poller.
///
/// Repository and token are not here: they live in the settings store and
/// are re-read on every poll.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Repository API root, e.g. `https://api.github.com/repos`.
    pub api_root: String,
    /// Polling interval in seconds.
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: 30,
            user_agent: concat!("ghwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
