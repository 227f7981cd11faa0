use ghwatch_core::{Feed, NotificationSink};

use crate::classify::{ClassifyError, classify, event_id, log_skipped};
use crate::client::RawEvent;
use crate::cursor::CursorTracker;

/// Maximum notifications emitted per feed per poll. The sink rotates out its
/// oldest entries, so emitting past this would push out the newest ones.
pub const EMIT_CAP: usize = 3;

/// What one pass over a feed response did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub emitted: usize,
    pub duplicates: usize,
    pub unsupported: usize,
    pub malformed: usize,
    /// Iteration stopped at the previous cursor.
    pub reached_cursor: bool,
    /// Iteration stopped because `EMIT_CAP` was reached.
    pub hit_cap: bool,
}

/// Walk `events` newest-first and emit notifications for the new ones.
///
/// Stops at the first event at or below the feed's cursor or after
/// `EMIT_CAP` emissions. Content already in the sink is skipped even when the
/// id is new. The cursor moves to the first event's id whenever `events` is
/// non-empty and that id is newer, however many were emitted; a stale
/// response from an overlapping poll leaves it alone.
pub fn process_feed(
    feed: Feed,
    events: &[RawEvent],
    cursors: &mut CursorTracker,
    sink: &dyn NotificationSink,
) -> FeedReport {
    let mut report = FeedReport::default();

    for event in events {
        let id = event_id(event);
        if let Some(ref id) = id
            && !cursors.is_new(feed, id)
        {
            tracing::debug!(%feed, id = %id, "Reached already processed events");
            report.reached_cursor = true;
            break;
        }

        let notification = match classify(feed, event) {
            Ok(n) => n,
            Err(e) => {
                log_skipped(feed, id.as_deref(), &e);
                match e {
                    ClassifyError::Unsupported { .. } => report.unsupported += 1,
                    ClassifyError::MissingField { .. } => report.malformed += 1,
                }
                continue;
            },
        };

        if sink.contains(&notification) {
            tracing::debug!(%feed, ?id, title = %notification.title, "Identical notification already shown");
            report.duplicates += 1;
            continue;
        }

        tracing::info!(%feed, ?id, title = %notification.title, "Emitting notification");
        sink.add(notification);
        report.emitted += 1;

        if report.emitted >= EMIT_CAP {
            report.hit_cap = true;
            break;
        }
    }

    if let Some(newest) = events.first() {
        match event_id(newest) {
            Some(id) => cursors.advance(feed, &id),
            None => tracing::warn!(%feed, "Newest event has no id, cursor unchanged"),
        }
    }

    report
}
