//! Errors reported by machine devices.

use thiserror::Error;

/// Failure of a device operation (move, feed, pick, place).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The device attempted the operation and reported a failure.
    #[error("{device} {operation} failed: {message}")]
    OperationFailed {
        device: String,
        operation: String,
        message: String,
    },

    /// The device did not finish the operation in time.
    #[error("{device} {operation} timed out")]
    Timeout { device: String, operation: String },

    /// The device is not connected or not enabled.
    #[error("{0} is not connected")]
    Disconnected(String),

    /// Generic device error with message.
    #[error("{0}")]
    Other(String),
}

impl DeviceError {
    /// Create an operation failed error.
    pub fn operation_failed(
        device: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OperationFailed {
            device: device.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(device: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Timeout {
            device: device.into(),
            operation: operation.into(),
        }
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected(device.into())
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_failed_displays_context() {
        let err = DeviceError::operation_failed("N1", "pick", "vacuum not reached");
        let msg = err.to_string();
        assert!(msg.contains("N1"));
        assert!(msg.contains("pick"));
        assert!(msg.contains("vacuum not reached"));
    }

    #[test]
    fn timeout_names_device() {
        assert_eq!(
            DeviceError::timeout("H1", "move").to_string(),
            "H1 move timed out"
        );
    }
}
