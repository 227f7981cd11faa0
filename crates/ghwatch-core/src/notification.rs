use serde::{Deserialize, Serialize};

/// A human-readable notification derived from one upstream event.
///
/// Equality is structural over all three fields and is what duplicate
/// suppression compares, not the upstream event id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url,
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.body)?;
        if let Some(ref url) = self.url {
            write!(f, " <{url}>")?;
        }
        Ok(())
    }
}

/// Destination for emitted notifications.
///
/// The sink owns the active notification set. The poller only reads it for
/// content comparison and appends to it; dismissing and rendering are the
/// sink's business.
pub trait NotificationSink: Send + Sync {
    /// Notifications currently displayed and not dismissed. Empty when the
    /// sink has no live source.
    fn current_notifications(&self) -> Vec<Notification>;

    /// Display a new notification.
    fn add(&self, notification: Notification);

    /// Whether an identical notification is currently displayed.
    fn contains(&self, notification: &Notification) -> bool {
        self.current_notifications()
            .iter()
            .any(|existing| existing == notification)
    }
}
