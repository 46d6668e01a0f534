//! Poll scheduler: one supervised timer task per poll kind.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use voteth_chain::{ElectionReader, StatusSnapshot};
use voteth_types::{CandidateView, PollKind};

/// Fixed period between refreshes of each poll kind.
pub const POLL_PERIOD: Duration = Duration::from_secs(5);

/// Snapshot pushed to the presentation layer after a successful tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    Status(StatusSnapshot),
    Results(Vec<CandidateView>),
}

/// Which election views are currently on screen. Decides which polls a
/// newly visible page needs, independent of what ran before it was
/// hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewShape {
    pub has_candidate_table: bool,
    pub has_results_container: bool,
}

#[derive(Default)]
struct TaskSlots {
    status: Option<JoinHandle<()>>,
    results: Option<JoinHandle<()>>,
}

impl TaskSlots {
    fn slot(&mut self, kind: PollKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            PollKind::Status => &mut self.status,
            PollKind::Results => &mut self.results,
        }
    }
}

/// Owns the poll tasks for one election.
///
/// Each started kind runs at most one timer: `start` aborts any
/// predecessor of the same kind before spawning, so a double start never
/// stacks intervals. A tick that fails is logged and the loop keeps its
/// cadence; a tick that runs long delays the next one rather than
/// overlapping it.
pub struct SyncScheduler {
    reader: Arc<dyn ElectionReader>,
    updates_tx: mpsc::UnboundedSender<SyncUpdate>,
    tasks: Mutex<TaskSlots>,
}

impl SyncScheduler {
    /// Create a scheduler over the given reader. Nothing polls until
    /// [`SyncScheduler::start`] is called. The receiver carries every
    /// successful snapshot.
    pub fn new(reader: Arc<dyn ElectionReader>) -> (Self, mpsc::UnboundedReceiver<SyncUpdate>) {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        (
            Self {
                reader,
                updates_tx,
                tasks: Mutex::new(TaskSlots::default()),
            },
            updates_rx,
        )
    }

    /// Start (or restart) the poll loop for `kind`: one immediate
    /// refresh, then one every [`POLL_PERIOD`].
    pub fn start(&self, kind: PollKind) {
        let reader = self.reader.clone();
        let tx = self.updates_tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let update = match kind {
                    PollKind::Status => reader.status().await.map(SyncUpdate::Status),
                    PollKind::Results => reader.candidates().await.map(SyncUpdate::Results),
                };
                match update {
                    // Send fails only when the receiver is gone; the
                    // task is aborted along with it.
                    Ok(update) => {
                        let _ = tx.send(update);
                    }
                    Err(e) => tracing::warn!(?kind, error = %e, "poll tick failed"),
                }
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = tasks.slot(kind).replace(handle) {
            tracing::debug!(?kind, "restarting poll, aborting previous timer");
            previous.abort();
        }
    }

    /// Stop the poll loop for `kind`. Idempotent.
    pub fn stop(&self, kind: PollKind) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = tasks.slot(kind).take() {
            handle.abort();
            tracing::debug!(?kind, "poll stopped");
        }
    }

    /// Stop every running poll. Called on unload/navigation.
    pub fn stop_all(&self) {
        self.stop(PollKind::Status);
        self.stop(PollKind::Results);
    }

    pub fn is_running(&self, kind: PollKind) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.slot(kind).is_some()
    }

    /// Apply the page-visibility policy.
    ///
    /// Hidden always stops the status poll. Becoming visible restarts
    /// polls from the current view shape, not from whatever was running
    /// before the page was hidden.
    pub fn visibility_changed(&self, hidden: bool, shape: ViewShape) {
        if hidden {
            self.stop(PollKind::Status);
            return;
        }
        if shape.has_candidate_table {
            self.start(PollKind::Status);
        }
        if shape.has_results_container {
            self.start(PollKind::Results);
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}
