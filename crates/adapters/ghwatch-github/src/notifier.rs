use std::sync::{Arc, Mutex};

use ghwatch_core::settings::{KEY_GITHUB_REPO, KEY_GITHUB_TOKEN};
use ghwatch_core::{Feed, NotificationSink, SettingsStore};

use crate::client::{FeedClient, FetchError};
use crate::config::PollerConfig;
use crate::cursor::CursorTracker;
use crate::policy::{FeedReport, process_feed};

/// Result of polling both feeds once.
#[derive(Debug)]
pub struct PollSummary {
    pub activity: Result<FeedReport, FetchError>,
    pub issue_events: Result<FeedReport, FetchError>,
}

impl PollSummary {
    /// Notifications emitted across both feeds.
    pub fn emitted(&self) -> usize {
        [&self.activity, &self.issue_events]
            .into_iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.emitted)
            .sum()
    }

    /// Feeds whose fetch failed this cycle.
    pub fn failed_feeds(&self) -> Vec<Feed> {
        let mut failed = Vec::new();
        if self.activity.is_err() {
            failed.push(Feed::Activity);
        }
        if self.issue_events.is_err() {
            failed.push(Feed::IssueEvents);
        }
        failed
    }
}

/// Polls both feeds of the configured repository into a notification sink.
///
/// Owns all poll state: one instance per enable, dropped on disable.
pub struct Notifier {
    client: FeedClient,
    settings: Arc<dyn SettingsStore>,
    sink: Arc<dyn NotificationSink>,
    cursors: Mutex<CursorTracker>,
}

impl Notifier {
    pub fn new(
        config: &PollerConfig,
        settings: Arc<dyn SettingsStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: FeedClient::new(config)?,
            settings,
            sink,
            cursors: Mutex::new(CursorTracker::new()),
        })
    }

    /// Poll both feeds concurrently. A failure on one feed never affects the
    /// other feed's processing or cursor.
    pub async fn poll_now(&self) -> PollSummary {
        let (activity, issue_events) = tokio::join!(
            self.poll_feed(Feed::Activity),
            self.poll_feed(Feed::IssueEvents)
        );
        PollSummary {
            activity,
            issue_events,
        }
    }

    /// Fetch and process one feed. Repository and token are read from the
    /// settings store on every call.
    pub async fn poll_feed(&self, feed: Feed) -> Result<FeedReport, FetchError> {
        let result = self.fetch_and_process(feed).await;
        match &result {
            Ok(report) => tracing::debug!(
                %feed,
                emitted = report.emitted,
                duplicates = report.duplicates,
                unsupported = report.unsupported,
                malformed = report.malformed,
                "Feed processed"
            ),
            Err(e) => tracing::warn!(%feed, error = %e, "Failed to poll feed"),
        }
        result
    }

    async fn fetch_and_process(&self, feed: Feed) -> Result<FeedReport, FetchError> {
        let repo = self.settings.get_string(KEY_GITHUB_REPO);
        let token = self.settings.get_string(KEY_GITHUB_TOKEN);
        let base_url = self.client.base_url(&repo)?;

        let events = self.client.fetch(&base_url, feed.path(), &token).await?;

        // The lock is never held across an await.
        let mut cursors = self
            .cursors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(process_feed(feed, &events, &mut cursors, self.sink.as_ref()))
    }

    /// Current cursor for `feed`, if any poll has advanced it.
    pub fn cursor(&self, feed: Feed) -> Option<String> {
        self.cursors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .current(feed)
            .map(String::from)
    }
}
