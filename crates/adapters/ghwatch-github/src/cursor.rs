use std::collections::HashMap;

use ghwatch_core::Feed;

/// Last-seen newest event id per feed.
///
/// A feed with no cursor has no history: no id is treated as seen. Upstream
/// ids grow monotonically, so the cursor only ever moves forward and any id
/// at or below it counts as seen.
#[derive(Debug, Default, Clone)]
pub struct CursorTracker {
    cursors: HashMap<Feed, String>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `event_id` is newer than the feed's cursor.
    pub fn is_new(&self, feed: Feed, event_id: &str) -> bool {
        self.current(feed).is_none_or(|cursor| is_newer(event_id, cursor))
    }

    /// Record `newest_event_id` as the feed's cursor. An id at or below the
    /// current cursor leaves it where it is.
    pub fn advance(&mut self, feed: Feed, newest_event_id: &str) {
        if self.is_new(feed, newest_event_id) {
            tracing::debug!(%feed, cursor = newest_event_id, "Cursor advanced");
            self.cursors.insert(feed, newest_event_id.to_string());
        } else if self.current(feed) != Some(newest_event_id) {
            tracing::debug!(
                %feed,
                cursor = ?self.current(feed),
                stale = newest_event_id,
                "Ignoring older head id"
            );
        }
    }

    pub fn current(&self, feed: Feed) -> Option<&str> {
        self.cursors.get(&feed).map(String::as_str)
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.cursors.clear();
    }
}

/// Numeric ids compare by value. Anything non-numeric can only be told
/// apart by equality.
fn is_newer(candidate: &str, cursor: &str) -> bool {
    match (candidate.parse::<u128>(), cursor.parse::<u128>()) {
        (Ok(candidate), Ok(cursor)) => candidate > cursor,
        _ => candidate != cursor,
    }
}
