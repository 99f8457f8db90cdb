//! Boards, placements and parts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::location::Location;
use super::units::Length;

/// Which face of a board is being populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Top,
    Bottom,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Top => write!(f, "Top"),
            Side::Bottom => write!(f, "Bottom"),
        }
    }
}

/// A part type. Height is used to compute the place Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub height: Length,
}

impl Part {
    pub fn new(id: impl Into<String>, height: Length) -> Self {
        Self {
            id: id.into(),
            height,
        }
    }
}

/// A design-time instruction to put a part at a board-relative location.
#[derive(Debug, Clone)]
pub struct Placement {
    pub id: String,
    pub side: Side,
    /// Board-relative location.
    pub location: Location,
    /// `None` when the part reference could not be resolved.
    pub part: Option<Arc<Part>>,
}

impl Placement {
    pub fn new(
        id: impl Into<String>,
        side: Side,
        location: Location,
        part: Option<Arc<Part>>,
    ) -> Self {
        Self {
            id: id.into(),
            side,
            location,
            part,
        }
    }

    pub fn part_id(&self) -> Option<&str> {
        self.part.as_deref().map(|p| p.id.as_str())
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.id,
            self.part_id().unwrap_or("<no part>"),
            self.side
        )
    }
}

/// A named collection of placements. Read-only during a run.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub name: String,
    pub placements: Vec<Placement>,
}

impl Board {
    pub fn new(name: impl Into<String>, placements: Vec<Placement>) -> Self {
        Self {
            name: name.into(),
            placements,
        }
    }
}

/// A board mounted on the machine at a location, with a side facing up.
#[derive(Debug, Clone)]
pub struct BoardLocation {
    pub board: Arc<Board>,
    /// Board origin in machine coordinates.
    pub location: Location,
    pub side: Side,
}

impl BoardLocation {
    pub fn new(board: Arc<Board>, location: Location, side: Side) -> Self {
        Self {
            board,
            location,
            side,
        }
    }

    /// Placements on the side of the board facing up.
    pub fn active_placements(&self) -> impl Iterator<Item = &Placement> + '_ {
        self.board
            .placements
            .iter()
            .filter(move |p| p.side == self.side)
    }
}

impl std::fmt::Display for BoardLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ ({}) {}", self.board.name, self.location, self.side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_placements_match_board_side() {
        let part = Arc::new(Part::new("R0805", Length::mm(0.5)));
        let board = Arc::new(Board::new(
            "main",
            vec![
                Placement::new("R1", Side::Top, Location::default(), Some(part.clone())),
                Placement::new("R2", Side::Bottom, Location::default(), Some(part.clone())),
                Placement::new("R3", Side::Top, Location::default(), Some(part)),
            ],
        ));
        let bl = BoardLocation::new(board, Location::default(), Side::Top);

        let ids: Vec<&str> = bl.active_placements().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "R3"]);
    }

    #[test]
    fn placement_display_handles_missing_part() {
        let placement = Placement::new("U1", Side::Top, Location::default(), None);
        assert_eq!(placement.to_string(), "U1 (<no part>, Top)");
    }
}
