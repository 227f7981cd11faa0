pub mod feed;
pub mod notification;
pub mod settings;
pub mod tray;

pub use feed::Feed;
pub use notification::{Notification, NotificationSink};
pub use settings::{MemorySettings, SettingsStore};
pub use tray::NotificationTray;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use serde_json::{Value, json};

    /// A PushEvent as returned by `/events`.
    pub fn push_event(id: &str, actor: &str, message: &str, url: &str) -> Value {
        json!({
            "id": id,
            "type": "PushEvent",
            "actor": {"login": actor},
            "payload": {
                "commits": [{"message": message, "url": url}]
            }
        })
    }

    /// A PullRequestEvent as returned by `/events`.
    pub fn pull_request_event(id: &str, actor: &str, number: u64, action: &str) -> Value {
        json!({
            "id": id,
            "type": "PullRequestEvent",
            "actor": {"login": actor},
            "payload": {
                "action": action,
                "number": number,
                "pull_request": {
                    "number": number,
                    "title": format!("Change #{number}"),
                    "html_url": format!("https://github.com/o/r/pull/{number}")
                }
            }
        })
    }

    /// An IssueCommentEvent as returned by `/events`.
    pub fn issue_comment_event(id: &str, actor: &str, body: &str) -> Value {
        json!({
            "id": id,
            "type": "IssueCommentEvent",
            "actor": {"login": actor},
            "payload": {
                "action": "created",
                "comment": {
                    "body": body,
                    "html_url": format!("https://github.com/o/r/issues/1#issuecomment-{id}")
                }
            }
        })
    }

    /// An event of a kind no mapping exists for.
    pub fn unsupported_event(id: &str, kind: &str) -> Value {
        json!({
            "id": id,
            "type": kind,
            "actor": {"login": "someone"},
            "payload": {}
        })
    }

    /// A `head_ref_force_pushed` entry as returned by `/issues/events`.
    /// Issue event ids are numeric upstream.
    pub fn force_push_event(id: u64, actor: &str, number: u64, title: &str) -> Value {
        json!({
            "id": id,
            "event": "head_ref_force_pushed",
            "actor": {"login": actor},
            "issue": {
                "number": number,
                "title": title,
                "html_url": format!("https://github.com/o/r/pull/{number}")
            }
        })
    }
}
