//! PnP Core - job execution engine for pick-and-place machines
//!
//! This crate drives a job (boards, placements, parts) through a machine's
//! heads, nozzles and feeders. It has no hardware or UI dependencies:
//! drivers implement the traits in [`machine`], front-ends observe the
//! processor through [`processor::JobProcessorListener`].

pub mod config;
pub mod logging;
pub mod machine;
pub mod models;
pub mod processor;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
