use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::notification::{Notification, NotificationSink};

/// Number of notifications a tray source keeps before rotating out the oldest.
pub const DEFAULT_TRAY_CAPACITY: usize = 3;

/// Default broadcast channel capacity for renderer fan-out.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Title shown for the tray's notification source.
pub const SOURCE_TITLE: &str = "GitHub Notifier";

/// Called with the notification url when the user opens a notification.
pub type ActivationHandler = Box<dyn Fn(&str) + Send + Sync>;

/// The live notification source. Exists only between first use and the next
/// teardown.
#[derive(Debug, Default)]
struct TraySource {
    notifications: VecDeque<Notification>,
}

/// In-memory notification sink with a fixed number of display slots.
///
/// The source is created lazily on first `add` and dropped by
/// [`NotificationTray::dismiss_all`]; while it is absent the active set
/// reads as empty.
pub struct NotificationTray {
    source: Mutex<Option<TraySource>>,
    capacity: usize,
    broadcast_tx: broadcast::Sender<Notification>,
    on_activate: Mutex<Option<ActivationHandler>>,
}

impl Default for NotificationTray {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationTray {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TRAY_CAPACITY)
    }

    /// Create a tray that keeps at most `capacity` notifications.
    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            source: Mutex::new(None),
            capacity: capacity.max(1),
            broadcast_tx,
            on_activate: Mutex::new(None),
        }
    }

    /// Register the handler that opens notification urls.
    pub fn set_activation_handler(&self, handler: ActivationHandler) {
        *lock(&self.on_activate) = Some(handler);
    }

    /// Subscribe to notifications as they are added.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.broadcast_tx.subscribe()
    }

    /// Whether a source currently exists.
    pub fn is_live(&self) -> bool {
        lock(&self.source).is_some()
    }

    pub fn len(&self) -> usize {
        lock(&self.source)
            .as_ref()
            .map_or(0, |s| s.notifications.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tear down the source, dismissing every notification.
    pub fn dismiss_all(&self) {
        if lock(&self.source).take().is_some() {
            tracing::debug!("Notification source destroyed");
        }
    }

    /// Open the notification at `index` (0 = oldest displayed). Returns true
    /// if it had a url and the activation handler was invoked.
    pub fn activate(&self, index: usize) -> bool {
        let url = lock(&self.source)
            .as_ref()
            .and_then(|s| s.notifications.get(index))
            .and_then(|n| n.url.clone());

        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return false;
        };

        match lock(&self.on_activate).as_ref() {
            Some(handler) => {
                handler(&url);
                true
            },
            None => {
                tracing::debug!(url = %url, "No activation handler registered");
                false
            },
        }
    }
}

impl NotificationSink for NotificationTray {
    fn current_notifications(&self) -> Vec<Notification> {
        lock(&self.source)
            .as_ref()
            .map(|s| s.notifications.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn add(&self, notification: Notification) {
        {
            let mut guard = lock(&self.source);
            let source = guard.get_or_insert_with(|| {
                tracing::debug!(title = SOURCE_TITLE, "Notification source created");
                TraySource::default()
            });
            source.notifications.push_back(notification.clone());
            while source.notifications.len() > self.capacity {
                source.notifications.pop_front();
            }
        }
        let _ = self.broadcast_tx.send(notification);
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
