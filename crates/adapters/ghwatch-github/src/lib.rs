pub mod classify;
pub mod client;
pub mod config;
pub mod cursor;
pub mod notifier;
pub mod policy;
pub mod scheduler;

pub use classify::{ClassifyError, classify, classify_event};
pub use client::{FeedClient, FetchError, RawEvent};
pub use config::PollerConfig;
pub use cursor::CursorTracker;
pub use notifier::{Notifier, PollSummary};
pub use policy::{EMIT_CAP, FeedReport, process_feed};
pub use scheduler::{PollCompleted, PollTrigger, Scheduler, SchedulerHandle};
