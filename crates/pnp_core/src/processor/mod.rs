//! Job processor: executes a pick-and-place job on a machine.
//!
//! A job is loaded, then started on a dedicated worker thread. The worker
//! asks the machine's planner for batches of placement solutions, one
//! head at a time in round-robin order, and runs each batch in two
//! passes: pick every part, then place every part.
//!
//! # Architecture
//!
//! ```text
//! JobProcessor (control thread)
//!     ├── load / start / pause / resume / step / stop
//!     └── worker "job-processor"
//!           ├── pre-process: every placement resolves to a part
//!           ├── heads to safe Z
//!           └── loop: HeadSequencer -> JobPlanner -> batch
//!                 ├── pick pipeline (per solution)
//!                 └── place pipeline (per solution)
//! ```
//!
//! Every device operation is preceded by a checkpoint, where the worker
//! honors pause, step and stop requests.
//!
//! # Example
//!
//! ```ignore
//! use pnp_core::processor::{Configuration, JobProcessor};
//!
//! let processor = JobProcessor::new(Configuration::with_machine(machine));
//! processor.load(job);
//! processor.start()?;
//! processor.join();
//! ```

mod errors;
mod events;
mod job_processor;
mod run;
mod transform;
mod types;

pub use errors::{JobError, ProcessorError, ProcessorResult};
pub use events::{
    DefaultJobProcessorDelegate, JobProcessorDelegate, JobProcessorListener, ListenerId,
};
pub use job_processor::JobProcessor;
pub use transform::placement_target_location;
pub use types::{Configuration, JobProgress, JobState, PickRetryAction};
