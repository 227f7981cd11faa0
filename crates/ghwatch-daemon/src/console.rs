use std::sync::Arc;

use ghwatch_core::settings::{KEY_GITHUB_REPO, KEY_GITHUB_TOKEN, KEY_SHOW_INDICATOR};
use ghwatch_core::{NotificationSink, NotificationTray, SettingsStore};

/// A line typed at the daemon console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check for notifications now.
    Check,
    List,
    /// Open the n-th listed notification (1-based).
    Open(usize),
    Dismiss,
    Prefs,
    Set { key: String, value: String },
    Indicator(bool),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown setting {0:?}")]
    UnknownKey(String),
}

pub const HELP: &str = "\
commands:
  check                 check for notifications now
  list                  show displayed notifications
  open N                open notification N in the browser
  dismiss               dismiss all notifications
  prefs                 show preferences
  set KEY VALUE         change github-repo, github-token or show-indicator
  indicator on|off      toggle the status line
  quit                  stop polling and exit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Err(CommandError::Usage("help"));
        };

        match cmd {
            "check" => Ok(Self::Check),
            "list" | "ls" => Ok(Self::List),
            "open" => parts
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .map(Self::Open)
                .ok_or(CommandError::Usage("open N")),
            "dismiss" => Ok(Self::Dismiss),
            "prefs" => Ok(Self::Prefs),
            "set" => {
                let key = parts.next().ok_or(CommandError::Usage("set KEY VALUE"))?;
                if ![KEY_GITHUB_REPO, KEY_GITHUB_TOKEN, KEY_SHOW_INDICATOR].contains(&key) {
                    return Err(CommandError::UnknownKey(key.to_string()));
                }
                // Token and repo may legitimately be cleared
                let value = parts.collect::<Vec<_>>().join(" ");
                Ok(Self::Set {
                    key: key.to_string(),
                    value,
                })
            },
            "indicator" => match parts.next() {
                Some("on") => Ok(Self::Indicator(true)),
                Some("off") => Ok(Self::Indicator(false)),
                _ => Err(CommandError::Usage("indicator on|off")),
            },
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Whether the console loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Caller should trigger a poll.
    PollNow,
    Quit,
}

/// Applies console commands to the tray and settings. Output goes to the
/// returned string so the caller decides where it is printed.
pub struct Console {
    settings: Arc<dyn SettingsStore>,
    tray: Arc<NotificationTray>,
}

impl Console {
    pub fn new(settings: Arc<dyn SettingsStore>, tray: Arc<NotificationTray>) -> Self {
        Self { settings, tray }
    }

    pub fn execute(&self, command: Command) -> (Flow, String) {
        match command {
            Command::Check => (Flow::PollNow, "checking for notifications...".to_string()),
            Command::List => (Flow::Continue, self.list()),
            Command::Open(n) => {
                let opened = n.checked_sub(1).is_some_and(|i| self.tray.activate(i));
                let out = if opened {
                    format!("opening notification {n}")
                } else {
                    format!("notification {n} has nothing to open")
                };
                (Flow::Continue, out)
            },
            Command::Dismiss => {
                self.tray.dismiss_all();
                (Flow::Continue, "dismissed all notifications".to_string())
            },
            Command::Prefs => (Flow::Continue, self.prefs()),
            Command::Set { key, value } => (Flow::Continue, self.set(&key, &value)),
            Command::Indicator(on) => {
                self.settings.set_bool(KEY_SHOW_INDICATOR, on);
                (Flow::Continue, format!("indicator {}", if on { "on" } else { "off" }))
            },
            Command::Help => (Flow::Continue, HELP.to_string()),
            Command::Quit => (Flow::Quit, String::new()),
        }
    }

    fn list(&self) -> String {
        let notifications = self.tray.current_notifications();
        if notifications.is_empty() {
            return "no notifications".to_string();
        }
        notifications
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{:>2}. {n}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn prefs(&self) -> String {
        let repo = self.settings.get_string(KEY_GITHUB_REPO);
        let token = if self.settings.get_string(KEY_GITHUB_TOKEN).is_empty() {
            "(none)"
        } else {
            "(set)"
        };
        format!(
            "{KEY_GITHUB_REPO}: {}\n{KEY_GITHUB_TOKEN}: {token}\n{KEY_SHOW_INDICATOR}: {}",
            if repo.is_empty() { "(none)" } else { repo.as_str() },
            self.settings.get_bool(KEY_SHOW_INDICATOR),
        )
    }

    fn set(&self, key: &str, value: &str) -> String {
        if key == KEY_SHOW_INDICATOR {
            match value {
                "true" | "on" | "1" => self.settings.set_bool(key, true),
                "false" | "off" | "0" => self.settings.set_bool(key, false),
                _ => return format!("{key} expects true or false"),
            }
        } else {
            self.settings.set_string(key, value);
        }
        format!("{key} updated")
    }
}
