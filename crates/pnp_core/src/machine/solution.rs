use std::fmt;
use std::sync::Arc;

use crate::models::{BoardLocation, Placement};

use super::traits::{Feeder, Head, Nozzle};

/// A runtime binding of one placement to concrete devices.
///
/// Produced by the planner for a single batch and dropped afterwards.
/// Nozzle and feeder are optional because a planner may be unable to find
/// one; the processor reports that as an error for the solution.
#[derive(Clone)]
pub struct PlacementSolution {
    pub head: Arc<dyn Head>,
    pub nozzle: Option<Arc<dyn Nozzle>>,
    pub feeder: Option<Arc<dyn Feeder>>,
    pub board_location: BoardLocation,
    pub placement: Placement,
}

impl PlacementSolution {
    pub fn new(
        head: Arc<dyn Head>,
        nozzle: Option<Arc<dyn Nozzle>>,
        feeder: Option<Arc<dyn Feeder>>,
        board_location: BoardLocation,
        placement: Placement,
    ) -> Self {
        Self {
            head,
            nozzle,
            feeder,
            board_location,
            placement,
        }
    }
}

impl fmt::Debug for PlacementSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacementSolution")
            .field("head", &self.head.id())
            .field("nozzle", &self.nozzle.as_ref().map(|n| n.id().to_string()))
            .field("feeder", &self.feeder.as_ref().map(|fd| fd.id().to_string()))
            .field("board", &self.board_location.board.name)
            .field("placement", &self.placement.id)
            .finish()
    }
}
