use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

/// Repository to watch, as `owner/repository`.
pub const KEY_GITHUB_REPO: &str = "github-repo";
/// API token; empty means unauthenticated requests.
pub const KEY_GITHUB_TOKEN: &str = "github-token";
/// Whether the status indicator is shown. Only the front end reads it.
pub const KEY_SHOW_INDICATOR: &str = "show-indicator";

/// Key-value settings capability.
///
/// Unknown keys read as the empty string / `false`. `subscribe` delivers the
/// name of every key that changes, which is how front ends bind widgets.
pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str) -> String;
    fn set_string(&self, key: &str, value: &str);
    fn get_bool(&self, key: &str) -> bool;
    fn set_bool(&self, key: &str, value: bool);
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

#[derive(Debug, Clone, PartialEq)]
enum SettingValue {
    Str(String),
    Bool(bool),
}

/// Process-local [`SettingsStore`].
pub struct MemorySettings {
    values: RwLock<HashMap<String, SettingValue>>,
    changed_tx: broadcast::Sender<String>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySettings {
    pub fn new() -> Self {
        let (changed_tx, _) = broadcast::channel(32);
        Self {
            values: RwLock::new(HashMap::new()),
            changed_tx,
        }
    }

    /// Build a store seeded with the three known keys.
    pub fn with_values(repo: &str, token: &str, show_indicator: bool) -> Self {
        let settings = Self::new();
        {
            let mut values = settings
                .values
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            values.insert(
                KEY_GITHUB_REPO.to_string(),
                SettingValue::Str(repo.to_string()),
            );
            values.insert(
                KEY_GITHUB_TOKEN.to_string(),
                SettingValue::Str(token.to_string()),
            );
            values.insert(
                KEY_SHOW_INDICATOR.to_string(),
                SettingValue::Bool(show_indicator),
            );
        }
        settings
    }

    fn set(&self, key: &str, value: SettingValue) {
        let changed = {
            let mut values = self
                .values
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            values.insert(key.to_string(), value.clone()) != Some(value)
        };
        if changed {
            tracing::debug!(key, "Setting changed");
            let _ = self.changed_tx.send(key.to_string());
        }
    }

    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            Some(SettingValue::Str(s)) => s,
            _ => String::new(),
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.set(key, SettingValue::Str(value.to_string()));
    }

    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(SettingValue::Bool(true)))
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.set(key, SettingValue::Bool(value));
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changed_tx.subscribe()
    }
}
