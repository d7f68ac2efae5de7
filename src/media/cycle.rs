use crate::error::DownloadError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Lifecycle of a download cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl CycleState {
    pub fn is_running(self) -> bool {
        self == CycleState::Running
    }
}

#[derive(Debug, Default)]
pub struct CycleTracker {
    state: Mutex<CycleState>,
}

impl CycleTracker {
    pub fn current(&self) -> CycleState {
        *self.lock()
    }

    /// Moves to `Running`, passing through `Idle` when the previous cycle
    /// left a terminal state behind.
    pub fn begin(&self) -> Result<CycleGuard<'_>, DownloadError> {
        let mut state = self.lock();
        if state.is_running() {
            return Err(DownloadError::AlreadyRunning);
        }
        let previous = *state;
        if *state != CycleState::Idle {
            debug!("Cycle state {:?} -> Idle", *state);
            *state = CycleState::Idle;
        }
        *state = CycleState::Running;
        debug!("Cycle state Idle -> Running");

        Ok(CycleGuard {
            tracker: self,
            previous,
            finished: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the duration of a running cycle. Dropping it without calling
/// [`CycleGuard::finish`] marks the cycle as failed.
pub struct CycleGuard<'a> {
    tracker: &'a CycleTracker,
    previous: CycleState,
    finished: bool,
}

impl CycleGuard<'_> {
    /// Gives the slot back without the cycle having started, restoring the
    /// state seen before [`CycleTracker::begin`].
    pub fn cancel(mut self) {
        self.set(self.previous);
        self.finished = true;
    }

    pub fn finish(mut self, succeeded: bool) {
        self.set(if succeeded {
            CycleState::Succeeded
        } else {
            CycleState::Failed
        });
        self.finished = true;
    }

    fn set(&self, next: CycleState) {
        debug!("Cycle state Running -> {:?}", next);
        *self.tracker.lock() = next;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.set(CycleState::Failed);
        }
    }
}
