pub mod config;
pub mod console;
pub mod launcher;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use ghwatch_core::settings::KEY_SHOW_INDICATOR;
use ghwatch_core::tray::SOURCE_TITLE;
use ghwatch_core::{
    MemorySettings, Notification, NotificationSink, NotificationTray, SettingsStore,
};
use ghwatch_github::{
    FetchError, Notifier, PollCompleted, PollSummary, Scheduler, SchedulerHandle,
};

use crate::config::{ConfigError, DaemonConfig};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
}

/// Outcome of [`App::run_once`].
#[derive(Debug)]
pub struct OncePoll {
    pub summary: PollSummary,
    /// Emitted notifications in emission order.
    pub notifications: Vec<Notification>,
}

/// Wired-up poller state for one daemon run.
pub struct App {
    pub settings: Arc<MemorySettings>,
    pub tray: Arc<NotificationTray>,
    pub notifier: Arc<Notifier>,
    poll_interval: Duration,
}

impl App {
    /// Validate `config`, seed the settings store from it and build the
    /// notifier. Repository and token stay editable through the settings.
    pub fn new(config: &DaemonConfig) -> Result<Self, AppError> {
        config.validate()?;

        let settings = Arc::new(MemorySettings::with_values(
            &config.github.repo,
            &config.github.token,
            config.ui.show_indicator,
        ));
        let tray = Arc::new(NotificationTray::with_capacity(config.ui.tray_capacity));
        let notifier = Notifier::new(
            &config.poller_config(),
            Arc::clone(&settings) as Arc<dyn SettingsStore>,
            Arc::clone(&tray) as Arc<dyn NotificationSink>,
        )?;

        Ok(Self {
            settings,
            tray,
            notifier: Arc::new(notifier),
            poll_interval: Duration::from_secs(config.github.poll_interval_secs),
        })
    }

    /// Poll both feeds once. The returned notifications are everything the
    /// poll emitted, including any the tray has already rotated out.
    pub async fn run_once(&self) -> OncePoll {
        let mut added = self.tray.subscribe();
        let summary = self.notifier.poll_now().await;

        let mut notifications = Vec::new();
        loop {
            match added.try_recv() {
                Ok(n) => notifications.push(n),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed notifications while collecting");
                },
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        OncePoll {
            summary,
            notifications,
        }
    }

    /// Start the periodic scheduler.
    pub fn start(&self) -> SchedulerHandle {
        Scheduler::spawn(Arc::clone(&self.notifier), self.poll_interval)
    }

    pub fn show_indicator(&self) -> bool {
        self.settings.get_bool(KEY_SHOW_INDICATOR)
    }
}

/// One notification as printed on the console.
pub fn render_notification(n: &Notification) -> String {
    let mut out = format!("[{SOURCE_TITLE}] {}\n    {}", n.title, n.body);
    if let Some(url) = n.url.as_deref()
        && !url.is_empty()
    {
        out.push_str("\n    ");
        out.push_str(url);
    }
    out
}

/// Status line printed after a manual check.
pub fn status_line(done: &PollCompleted) -> String {
    let mut line = match done.emitted {
        0 => "no new notifications".to_string(),
        1 => "1 new notification".to_string(),
        n => format!("{n} new notifications"),
    };
    if !done.failed_feeds.is_empty() {
        let failed: Vec<String> = done.failed_feeds.iter().map(|f| f.to_string()).collect();
        line.push_str(&format!(" ({} failed)", failed.join(", ")));
    }
    line
}
