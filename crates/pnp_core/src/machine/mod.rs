//! Machine collaborators as seen by the job processor.
//!
//! Heads, nozzles, feeders and the job planner are implemented by drivers
//! outside this crate. The processor only drives them through the
//! capability traits defined here.
//!
//! # Architecture
//!
//! ```text
//! Machine
//!     ├── Head (ordered, fixed)
//!     │     └── Nozzle
//!     ├── Feeder (machine-wide)
//!     └── JobPlanner ── PlacementSolution { head, nozzle, feeder, board, placement }
//! ```

mod errors;
mod sequencer;
mod solution;
mod traits;

pub use errors::{DeviceError, DeviceResult};
pub use sequencer::{HeadCycle, HeadSequencer};
pub use solution::PlacementSolution;
pub use traits::{Feeder, Head, JobPlanner, Machine, Nozzle};
