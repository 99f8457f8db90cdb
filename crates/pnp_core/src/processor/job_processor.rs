//! The job processor: lifecycle state machine and control API.
//!
//! One worker thread executes the run loop per `start`. The controlling
//! thread drives it through `pause`, `resume`, `step` and `stop`, which
//! take effect at the worker's next checkpoint. State and the pause
//! condition variable share a single mutex.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{debug, error, info};

use crate::models::Job;

use super::errors::{ProcessorError, ProcessorResult, RunError, RunResult};
use super::events::{
    DefaultJobProcessorDelegate, JobProcessorDelegate, JobProcessorListener, ListenerId,
    ListenerRegistry,
};
use super::run::run_job;
use super::types::{Configuration, JobProgress, JobState};

/// Fields guarded by the control mutex.
struct Control {
    state: JobState,
    /// One-shot: pause at the next checkpoint.
    pause_at_next_step: bool,
    job: Option<Arc<Job>>,
}

/// State shared between the processor handle and its worker.
pub(crate) struct Shared {
    pub(crate) config: Configuration,
    control: Mutex<Control>,
    resumed: Condvar,
    pub(crate) listeners: ListenerRegistry,
    delegate: RwLock<Arc<dyn JobProcessorDelegate>>,
    progress: Mutex<JobProgress>,
}

impl Shared {
    fn state(&self) -> JobState {
        self.control.lock().state
    }

    /// Set the state, notify listeners and wake a paused worker.
    /// Stopping also disarms a pending step.
    pub(crate) fn set_state(&self, state: JobState) {
        {
            let mut control = self.control.lock();
            control.state = state;
            if state == JobState::Stopped {
                control.pause_at_next_step = false;
            }
        }
        self.listeners.job_state_changed(state);
        self.resumed.notify_all();
    }

    /// Suspension point of the run loop.
    ///
    /// Consumes an armed step flag by pausing a running job, then blocks
    /// while paused. Returns `RunError::Stopped` once the state is `Stopped`.
    pub(crate) fn checkpoint(&self) -> RunResult<()> {
        let stepped = {
            let mut control = self.control.lock();
            if control.pause_at_next_step && control.state == JobState::Running {
                control.pause_at_next_step = false;
                control.state = JobState::Paused;
                true
            } else {
                false
            }
        };
        if stepped {
            debug!("step complete, pausing");
            self.listeners.job_state_changed(JobState::Paused);
        }

        let mut control = self.control.lock();
        loop {
            match control.state {
                JobState::Running => return Ok(()),
                JobState::Stopped => return Err(RunError::Stopped),
                JobState::Paused => self.resumed.wait(&mut control),
            }
        }
    }

    /// Apply `update` to the run's counters. Ignored once stopped, so a
    /// device operation finishing after `stop` or `load` is not counted.
    pub(crate) fn update_progress(&self, update: impl FnOnce(&mut JobProgress)) {
        let control = self.control.lock();
        if control.state != JobState::Stopped {
            update(&mut self.progress.lock());
        }
    }
}

/// Coordinates execution of a job on the configured machine.
///
/// # Example
///
/// ```ignore
/// let processor = JobProcessor::new(Configuration::with_machine(machine));
/// processor.add_listener(Arc::new(logger));
/// processor.load(job);
/// processor.start()?;
/// // ... later, from any thread
/// processor.pause();
/// processor.resume();
/// processor.join();
/// ```
pub struct JobProcessor {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JobProcessor {
    pub fn new(config: Configuration) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                control: Mutex::new(Control {
                    state: JobState::Stopped,
                    pause_at_next_step: false,
                    job: None,
                }),
                resumed: Condvar::new(),
                listeners: ListenerRegistry::default(),
                delegate: RwLock::new(Arc::new(DefaultJobProcessorDelegate)),
                progress: Mutex::new(JobProgress::default()),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.shared.config
    }

    pub fn state(&self) -> JobState {
        self.shared.state()
    }

    pub fn job(&self) -> Option<Arc<Job>> {
        self.shared.control.lock().job.clone()
    }

    /// Counters for the current (or last) run.
    pub fn progress(&self) -> JobProgress {
        self.shared.progress.lock().clone()
    }

    pub fn add_listener(&self, listener: Arc<dyn JobProcessorListener>) -> ListenerId {
        self.shared.listeners.add(listener)
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    pub fn set_delegate(&self, delegate: Arc<dyn JobProcessorDelegate>) {
        *self.shared.delegate.write() = delegate;
    }

    pub fn delegate(&self) -> Arc<dyn JobProcessorDelegate> {
        Arc::clone(&self.shared.delegate.read())
    }

    /// Replace the job. A run in progress is stopped first; loading while
    /// stopped only reports the new job.
    pub fn load(&self, job: impl Into<Arc<Job>>) {
        let job = job.into();
        debug!(job = %job.name, "load()");
        if self.state() != JobState::Stopped {
            self.stop();
        }
        {
            let mut control = self.shared.control.lock();
            control.job = Some(Arc::clone(&job));
            control.pause_at_next_step = false;
        }
        *self.shared.progress.lock() = JobProgress::default();
        self.shared.listeners.job_loaded(&job);
    }

    /// Start the loaded job on a new worker thread.
    ///
    /// Only legal from `Stopped`, and only once the previous worker has
    /// exited. Listeners must not call `start`, `step` or `join` from
    /// inside the `Running` notification this emits.
    pub fn start(&self) -> ProcessorResult<()> {
        debug!("start()");
        let mut worker = self.worker.lock();
        let job = {
            let mut control = self.shared.control.lock();
            if control.state != JobState::Stopped {
                return Err(ProcessorError::InvalidState {
                    state: control.state,
                });
            }
            if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
                return Err(ProcessorError::PreviousRunActive);
            }
            let job = control.job.clone().ok_or(ProcessorError::NoJobLoaded)?;
            control.state = JobState::Running;
            job
        };

        if let Some(previous) = worker.take() {
            reap(previous);
        }

        info!(job = %job.name, "starting job");
        *self.shared.progress.lock() = JobProgress::started_now();
        self.shared.listeners.job_state_changed(JobState::Running);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("job-processor".to_string())
            .spawn(move || run_job(&shared, job));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!("failed to spawn job worker: {}", e);
                drop(worker);
                self.shared.set_state(JobState::Stopped);
                Err(ProcessorError::SpawnFailed(e))
            }
        }
    }

    /// Pause at the worker's next checkpoint. Ignored while stopped.
    pub fn pause(&self) {
        debug!("pause()");
        {
            let mut control = self.shared.control.lock();
            if control.state == JobState::Stopped {
                debug!("pause() ignored, job is stopped");
                return;
            }
            control.state = JobState::Paused;
        }
        self.shared.listeners.job_state_changed(JobState::Paused);
    }

    /// Resume a paused job. Ignored while stopped.
    pub fn resume(&self) {
        debug!("resume()");
        {
            let mut control = self.shared.control.lock();
            if control.state == JobState::Stopped {
                debug!("resume() ignored, job is stopped");
                return;
            }
            control.state = JobState::Running;
        }
        self.shared.listeners.job_state_changed(JobState::Running);
        self.shared.resumed.notify_all();
    }

    /// Run until the next checkpoint, then pause. Starts the job first
    /// if it is stopped.
    pub fn step(&self) -> ProcessorResult<()> {
        debug!("step()");
        let state = {
            let mut control = self.shared.control.lock();
            control.pause_at_next_step = true;
            control.state
        };

        if state == JobState::Stopped {
            if let Err(e) = self.start() {
                self.shared.control.lock().pause_at_next_step = false;
                return Err(e);
            }
        } else {
            self.resume();
        }
        Ok(())
    }

    /// Stop the job and disarm any pending step. The worker exits at its
    /// next checkpoint; a device operation already in progress is not
    /// interrupted. Progress is not kept: the next `start` plans from
    /// scratch.
    pub fn stop(&self) {
        debug!("stop()");
        self.shared.set_state(JobState::Stopped);
    }

    /// Block until the current worker, if any, has exited.
    ///
    /// Has no effect when called from the worker itself (e.g. inside a
    /// listener notification).
    pub fn join(&self) {
        let handle = self.worker.lock().take();
        let Some(handle) = handle else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            *self.worker.lock() = Some(handle);
            return;
        }
        reap(handle);
    }
}

impl Drop for JobProcessor {
    fn drop(&mut self) {
        if self.state() != JobState::Stopped {
            self.stop();
        }
        self.join();
    }
}

fn reap(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("job worker panicked");
    }
}

#[cfg(test)]
#[path = "job_processor_tests.rs"]
mod tests;
