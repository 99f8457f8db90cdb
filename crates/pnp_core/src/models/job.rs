//! Job definition: the boards to populate in one run.

use super::board::{BoardLocation, Placement};

/// Ordered collection of board locations.
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub name: String,
    pub board_locations: Vec<BoardLocation>,
}

impl Job {
    pub fn new(name: impl Into<String>, board_locations: Vec<BoardLocation>) -> Self {
        Self {
            name: name.into(),
            board_locations,
        }
    }

    /// Number of placements that will be processed (those whose side
    /// matches their board's side).
    pub fn active_placement_count(&self) -> usize {
        self.board_locations
            .iter()
            .map(|bl| bl.active_placements().count())
            .sum()
    }

    /// First active placement without a resolved part, with its board.
    pub fn find_unresolved_placement(&self) -> Option<(&BoardLocation, &Placement)> {
        self.board_locations.iter().find_map(|bl| {
            bl.active_placements()
                .find(|p| p.part.is_none())
                .map(|p| (bl, p))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{Board, Length, Location, Part, Side};

    fn board(placements: Vec<Placement>) -> Arc<Board> {
        Arc::new(Board::new("b", placements))
    }

    #[test]
    fn counts_only_matching_sides() {
        let part = Arc::new(Part::new("C1", Length::mm(1.0)));
        let b = board(vec![
            Placement::new("C1", Side::Top, Location::default(), Some(part.clone())),
            Placement::new("C2", Side::Bottom, Location::default(), Some(part)),
        ]);
        let job = Job::new(
            "j",
            vec![
                BoardLocation::new(b.clone(), Location::default(), Side::Top),
                BoardLocation::new(b, Location::default(), Side::Bottom),
            ],
        );
        assert_eq!(job.active_placement_count(), 2);
    }

    #[test]
    fn unresolved_part_on_inactive_side_is_ignored() {
        let b = board(vec![Placement::new(
            "U9",
            Side::Bottom,
            Location::default(),
            None,
        )]);
        let job = Job::new(
            "j",
            vec![BoardLocation::new(b.clone(), Location::default(), Side::Top)],
        );
        assert!(job.find_unresolved_placement().is_none());

        let flipped = Job::new(
            "j",
            vec![BoardLocation::new(b, Location::default(), Side::Bottom)],
        );
        let (_, placement) = flipped.find_unresolved_placement().unwrap();
        assert_eq!(placement.id, "U9");
    }
}
