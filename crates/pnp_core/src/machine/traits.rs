//! Capability traits implemented by machine drivers and planners.
//!
//! The job processor never owns devices. It holds `Arc` handles and
//! invokes these operations from its worker thread, one at a time. All
//! operations block until the device has finished (or failed), so
//! implementations use interior mutability and must be `Send + Sync`.

use std::sync::Arc;

use crate::models::{Job, Location};

use super::errors::DeviceResult;
use super::solution::PlacementSolution;

/// An actuator that picks and places a single part at a time.
pub trait Nozzle: Send + Sync {
    fn id(&self) -> &str;

    /// Last known nozzle location (used for status text).
    fn location(&self) -> Location;

    /// Move to `location`. Axes set to `NaN` are left unchanged.
    fn move_to(&self, location: &Location, feed_rate_ratio: f64) -> DeviceResult<()>;

    /// Retract to the machine's safe height.
    fn move_to_safe_z(&self, feed_rate_ratio: f64) -> DeviceResult<()>;

    fn pick(&self) -> DeviceResult<()>;

    fn place(&self) -> DeviceResult<()>;
}

/// A sub-assembly carrying one or more nozzles that move together.
pub trait Head: Send + Sync {
    fn id(&self) -> &str;

    fn nozzles(&self) -> Vec<Arc<dyn Nozzle>>;

    /// Retract every nozzle on the head to safe height.
    fn move_to_safe_z(&self, feed_rate_ratio: f64) -> DeviceResult<()>;
}

/// A device that presents parts for pickup.
pub trait Feeder: Send + Sync {
    fn id(&self) -> &str;

    /// Prepare a part for `nozzle` to pick.
    fn feed(&self, nozzle: &dyn Nozzle) -> DeviceResult<()>;

    /// Where the fed part can be picked. `None` when the feeder has no
    /// valid location to offer.
    fn pick_location(&self) -> DeviceResult<Option<Location>>;
}

/// Assigns placements to heads, nozzles and feeders.
pub trait JobPlanner: Send + Sync {
    /// Reset the planner for a new run of `job`.
    fn set_job(&self, job: Arc<Job>);

    /// Next batch of solutions bound to `head`, in execution order, or
    /// `None` when the planner has nothing more for this head.
    fn next_placement_solutions(&self, head: &Arc<dyn Head>) -> Option<Vec<PlacementSolution>>;
}

/// The machine as seen by the job processor.
pub trait Machine: Send + Sync {
    /// Heads in their fixed configured order.
    fn heads(&self) -> Vec<Arc<dyn Head>>;

    fn job_planner(&self) -> Arc<dyn JobPlanner>;
}
