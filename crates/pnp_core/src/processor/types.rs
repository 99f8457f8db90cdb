//! Core types for the job processor.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::machine::Machine;

/// Lifecycle state of the processor. Exactly one value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Stopped => write!(f, "Stopped"),
            JobState::Running => write!(f, "Running"),
            JobState::Paused => write!(f, "Paused"),
        }
    }
}

/// Context injected into the processor at construction.
///
/// Replaces any ambient machine or settings lookup: everything the run
/// loop needs comes through here.
#[derive(Clone)]
pub struct Configuration {
    pub machine: Arc<dyn Machine>,
    pub settings: Settings,
}

impl Configuration {
    pub fn new(machine: Arc<dyn Machine>, settings: Settings) -> Self {
        Self { machine, settings }
    }

    /// Configuration with default settings.
    pub fn with_machine(machine: Arc<dyn Machine>) -> Self {
        Self::new(machine, Settings::default())
    }
}

/// Counters for the current run. Reset on `load` and `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    /// When the current run started.
    pub started_at: Option<String>,
    pub parts_picked: usize,
    pub parts_placed: usize,
    /// Planner batches fully placed.
    pub batches_completed: usize,
}

impl JobProgress {
    pub(crate) fn started_now() -> Self {
        Self {
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }
}

/// Answer from the delegate when a pick fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickRetryAction {
    RetryWithFeed,
    RetryWithoutFeed,
    SkipAndContinue,
}
