use std::time::Duration;

use serde_json::Value;

use crate::config::PollerConfig;

/// One raw upstream event. Only the fields the classifier needs are ever
/// read, so it stays untyped.
pub type RawEvent = Value;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Why a feed fetch produced no events.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("repository must be \"owner/repository\", got {0:?}")]
    InvalidRepo(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GitHub API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected a JSON array of events")]
    NotAnArray,
}

/// Thin HTTP client for the two event endpoints.
#[derive(Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    api_root: String,
}

impl FeedClient {
    pub fn new(config: &PollerConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_root: config.api_root.clone(),
        })
    }

    /// Base url for `repo` under this client's API root.
    pub fn base_url(&self, repo: &str) -> Result<String, FetchError> {
        repo_base_url(&self.api_root, repo)
    }

    /// GET `base_url + path` and return the events, newest first.
    ///
    /// An empty `token` sends the request unauthenticated.
    pub async fn fetch(
        &self,
        base_url: &str,
        path: &str,
        token: &str,
    ) -> Result<Vec<RawEvent>, FetchError> {
        let url = format!("{base_url}{path}");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let bytes = resp.bytes().await?;
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Array(events) => {
                tracing::trace!(url = %url, count = events.len(), "Fetched events");
                Ok(events)
            },
            _ => Err(FetchError::NotAnArray),
        }
    }
}

/// Build `{api_root}/{owner}/{repo}`, rejecting anything that is not a
/// single `owner/repository` pair.
pub fn repo_base_url(api_root: &str, repo: &str) -> Result<String, FetchError> {
    let trimmed = repo.trim().trim_matches('/');
    let valid = matches!(
        trimmed.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    );
    if !valid {
        return Err(FetchError::InvalidRepo(repo.to_string()));
    }
    Ok(format!("{}/{trimmed}", api_root.trim_end_matches('/')))
}

/// GitHub error bodies are `{"message": "..."}`; fall back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
