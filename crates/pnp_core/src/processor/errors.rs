//! Error types for the job processor.
//!
//! Two layers:
//! - `ProcessorError` is returned by the control API (`start`, `step`).
//! - `RunError` is internal to the worker. A failed device operation
//!   becomes `RunError::Failed` carrying a `JobError` kind, which is
//!   broadcast to listeners; it never crosses back to the caller.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::DeviceError;

use super::types::JobState;

/// Category of a failure reported to listeners during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobError {
    MachineHomingError,
    MachineMovementError,
    MachineRejectedJobError,
    FeederError,
    HeadError,
    PickError,
    PlaceError,
    PartError,
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobError::MachineHomingError => "MachineHomingError",
            JobError::MachineMovementError => "MachineMovementError",
            JobError::MachineRejectedJobError => "MachineRejectedJobError",
            JobError::FeederError => "FeederError",
            JobError::HeadError => "HeadError",
            JobError::PickError => "PickError",
            JobError::PlaceError => "PlaceError",
            JobError::PartError => "PartError",
        };
        f.write_str(name)
    }
}

/// Error returned by the processor's control API.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// `start` requires the `Stopped` state.
    #[error("Invalid state. Cannot start new job while state is {state}")]
    InvalidState { state: JobState },

    /// The worker of a previous run is still executing a device operation.
    #[error("Previous job has not yet finished")]
    PreviousRunActive,

    #[error("No job loaded")]
    NoJobLoaded,

    #[error("Failed to spawn job worker: {0}")]
    SpawnFailed(#[source] io::Error),
}

/// Result type for control operations.
pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// Why a run ended early.
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum RunError {
    #[error("{kind}: {message}")]
    Failed { kind: JobError, message: String },

    /// A checkpoint observed `Stopped`.
    #[error("job stopped")]
    Stopped,
}

impl RunError {
    pub(crate) fn failed(kind: JobError, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    /// Adapter for `map_err` on device results.
    pub(crate) fn device(kind: JobError) -> impl FnOnce(DeviceError) -> RunError {
        move |err| RunError::failed(kind, err.to_string())
    }
}

pub(crate) type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_state() {
        let err = ProcessorError::InvalidState {
            state: JobState::Paused,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state. Cannot start new job while state is Paused"
        );
    }

    #[test]
    fn device_errors_map_to_kind() {
        let err = RunError::device(JobError::PickError)(DeviceError::operation_failed(
            "N1", "pick", "no vacuum",
        ));
        match err {
            RunError::Failed { kind, message } => {
                assert_eq!(kind, JobError::PickError);
                assert!(message.contains("no vacuum"));
            }
            RunError::Stopped => panic!("expected failure"),
        }
    }

    #[test]
    fn job_error_serializes_by_name() {
        let json = serde_json::to_string(&JobError::FeederError).unwrap();
        assert_eq!(json, "\"FeederError\"");
    }
}
