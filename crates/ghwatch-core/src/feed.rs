use serde::{Deserialize, Serialize};

/// One of the two polled repository event endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    /// Repository activity events (`/events`).
    Activity,
    /// Issue and pull request timeline events (`/issues/events`).
    IssueEvents,
}

impl Feed {
    /// Both feeds, in the order they are polled.
    pub const ALL: [Feed; 2] = [Feed::Activity, Feed::IssueEvents];

    /// Path appended to the repository API root.
    pub fn path(self) -> &'static str {
        match self {
            Self::Activity => "/events",
            Self::IssueEvents => "/issues/events",
        }
    }

    /// Name of the JSON field that carries the event kind.
    pub fn kind_field(self) -> &'static str {
        match self {
            Self::Activity => "type",
            Self::IssueEvents => "event",
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activity => write!(f, "activity"),
            Self::IssueEvents => write!(f, "issue_events"),
        }
    }
}
