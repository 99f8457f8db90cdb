//! Logging for job runs.
//!
//! Two layers:
//! - `tracing` for process-wide diagnostics, installed with
//!   [`init_tracing`]. The processor emits `debug!` for every event it
//!   broadcasts and `warn!` for job errors.
//! - [`JobLogger`], a processor listener that keeps a human-readable log
//!   file per job, with a compact mode and a tail of machine status lines
//!   written out on failure.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pnp_core::config::Settings;
//! use pnp_core::logging::JobLogger;
//!
//! let settings = Settings::default();
//! let logger = Arc::new(JobLogger::from_settings("panel_a", &settings).unwrap());
//! logger.info("Operator: shift B");
//! // processor.add_listener(logger.clone());
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{GuiLogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps and thread names
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .with(filter)
        .init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
