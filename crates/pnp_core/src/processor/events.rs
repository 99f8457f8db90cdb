//! Observer and delegate interfaces, and the listener registry.
//!
//! Listeners are notified synchronously, in registration order, on the
//! thread that caused the event (the worker for run events, the caller
//! for control events). The registry lock is released before any
//! listener runs, so a listener may call `pause`, `resume` or `stop`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::machine::Feeder;
use crate::models::{BoardLocation, Job, Part, Placement};

use super::errors::JobError;
use super::types::{JobState, PickRetryAction};

/// Receives job lifecycle and progress notifications.
///
/// Every method has an empty default so observers implement only what
/// they need.
pub trait JobProcessorListener: Send + Sync {
    fn job_loaded(&self, _job: &Job) {}

    fn job_state_changed(&self, _state: JobState) {}

    fn job_encountered_error(&self, _error: JobError, _description: &str) {}

    fn part_processing_started(&self, _board: &BoardLocation, _placement: &Placement) {}

    fn part_picked(&self, _board: &BoardLocation, _placement: &Placement) {}

    fn part_placed(&self, _board: &BoardLocation, _placement: &Placement) {}

    fn part_processing_completed(&self, _board: &BoardLocation, _placement: &Placement) {}

    /// Human-readable description of the action about to occur.
    fn detailed_status_updated(&self, _status: &str) {}
}

/// Decides what to do when a pick fails.
pub trait JobProcessorDelegate: Send + Sync {
    fn part_pick_failed(
        &self,
        board: &BoardLocation,
        part: &Part,
        feeder: &dyn Feeder,
    ) -> PickRetryAction;
}

/// Always skips the failed part.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultJobProcessorDelegate;

impl JobProcessorDelegate for DefaultJobProcessorDelegate {
    fn part_pick_failed(
        &self,
        _board: &BoardLocation,
        _part: &Part,
        _feeder: &dyn Feeder,
    ) -> PickRetryAction {
        PickRetryAction::SkipAndContinue
    }
}

/// Handle returned by `add_listener`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Entry = (ListenerId, Arc<dyn JobProcessorListener>);

/// Ordered list of subscribers.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub(crate) fn add(&self, listener: Arc<dyn JobProcessorListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn broadcast(&self, notify: impl Fn(&dyn JobProcessorListener)) {
        let snapshot: Vec<Arc<dyn JobProcessorListener>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &snapshot {
            notify(listener.as_ref());
        }
    }

    pub(crate) fn job_loaded(&self, job: &Job) {
        tracing::debug!(job = %job.name, "fire job_loaded");
        self.broadcast(|l| l.job_loaded(job));
    }

    pub(crate) fn job_state_changed(&self, state: JobState) {
        tracing::debug!(%state, "fire job_state_changed");
        self.broadcast(|l| l.job_state_changed(state));
    }

    pub(crate) fn job_encountered_error(&self, error: JobError, description: &str) {
        tracing::debug!(%error, description, "fire job_encountered_error");
        self.broadcast(|l| l.job_encountered_error(error, description));
    }

    pub(crate) fn part_processing_started(&self, board: &BoardLocation, placement: &Placement) {
        tracing::debug!(board = %board.board.name, placement = %placement.id, "fire part_processing_started");
        self.broadcast(|l| l.part_processing_started(board, placement));
    }

    pub(crate) fn part_picked(&self, board: &BoardLocation, placement: &Placement) {
        tracing::debug!(board = %board.board.name, placement = %placement.id, "fire part_picked");
        self.broadcast(|l| l.part_picked(board, placement));
    }

    pub(crate) fn part_placed(&self, board: &BoardLocation, placement: &Placement) {
        tracing::debug!(board = %board.board.name, placement = %placement.id, "fire part_placed");
        self.broadcast(|l| l.part_placed(board, placement));
    }

    pub(crate) fn part_processing_completed(&self, board: &BoardLocation, placement: &Placement) {
        tracing::debug!(board = %board.board.name, placement = %placement.id, "fire part_processing_completed");
        self.broadcast(|l| l.part_processing_completed(board, placement));
    }

    pub(crate) fn detailed_status_updated(&self, status: &str) {
        tracing::debug!(status, "fire detailed_status_updated");
        self.broadcast(|l| l.detailed_status_updated(status));
    }
}
