use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};

use ghwatch_core::Feed;

use crate::notifier::Notifier;

/// Commands sent from a [`SchedulerHandle`] to the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    PollNow,
    Stop,
}

/// What started a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTrigger {
    Timer,
    Manual,
}

/// Broadcast after every finished poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCompleted {
    pub trigger: PollTrigger,
    pub emitted: usize,
    pub failed_feeds: Vec<Feed>,
}

/// Drives a [`Notifier`] on a fixed timer plus on-demand polls.
pub struct Scheduler;

impl Scheduler {
    /// Start polling every `interval`. The first automatic poll happens one
    /// interval after start; use [`SchedulerHandle::poll_now`] for an
    /// immediate one.
    pub fn spawn(notifier: Arc<Notifier>, interval: Duration) -> SchedulerHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (completed_tx, _) = broadcast::channel(16);
        let task = tokio::spawn(run(notifier, interval, cmd_rx, completed_tx.clone()));
        SchedulerHandle {
            cmd_tx,
            completed_tx,
            task: Some(task),
        }
    }
}

/// Control handle for a running scheduler. Dropping it aborts the loop.
pub struct SchedulerHandle {
    cmd_tx: mpsc::UnboundedSender<SchedulerCommand>,
    completed_tx: broadcast::Sender<PollCompleted>,
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Request an immediate poll of both feeds. Returns false once the
    /// scheduler has stopped.
    pub fn poll_now(&self) -> bool {
        self.cmd_tx.send(SchedulerCommand::PollNow).is_ok()
    }

    /// Subscribe to poll completions.
    pub fn subscribe(&self) -> broadcast::Receiver<PollCompleted> {
        self.completed_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer, abandon in-flight polls and release all poll state.
    pub async fn disable(mut self) {
        let _ = self.cmd_tx.send(SchedulerCommand::Stop);
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
            && e.is_panic()
        {
            tracing::error!(error = %e, "Scheduler task panicked");
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    notifier: Arc<Notifier>,
    interval: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<SchedulerCommand>,
    completed_tx: broadcast::Sender<PollCompleted>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // Polls run as separate tasks so a hung fetch never delays the next tick.
    let mut in_flight: JoinSet<()> = JoinSet::new();

    tracing::info!(interval_secs = interval.as_secs(), "Scheduler enabled");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                spawn_poll(&mut in_flight, &notifier, &completed_tx, PollTrigger::Timer);
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SchedulerCommand::PollNow) => {
                        spawn_poll(&mut in_flight, &notifier, &completed_tx, PollTrigger::Manual);
                    },
                    Some(SchedulerCommand::Stop) | None => break,
                }
            }
            Some(res) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = res
                    && e.is_panic()
                {
                    tracing::error!(error = %e, "Poll task panicked");
                }
            }
        }
    }

    in_flight.shutdown().await;
    tracing::info!("Scheduler disabled");
}

fn spawn_poll(
    in_flight: &mut JoinSet<()>,
    notifier: &Arc<Notifier>,
    completed_tx: &broadcast::Sender<PollCompleted>,
    trigger: PollTrigger,
) {
    let notifier = Arc::clone(notifier);
    let completed_tx = completed_tx.clone();
    in_flight.spawn(async move {
        tracing::debug!(?trigger, "Polling feeds");
        let summary = notifier.poll_now().await;
        let _ = completed_tx.send(PollCompleted {
            trigger,
            emitted: summary.emitted(),
            failed_feeds: summary.failed_feeds(),
        });
    });
}
