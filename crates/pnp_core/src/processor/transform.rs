//! Board-relative placement to machine-space target location.

use crate::models::{
    rotate_translate_scale_point, BoardLocation, Location, Part, Placement, Point, Side,
};

/// Where the nozzle must go to place `part` for `placement`.
///
/// Works in the placement's units. Bottom-side boards mirror the
/// placement in X before the board rotation and offset are applied.
/// Final Z is the board surface plus the part height.
pub fn placement_target_location(
    board_location: &BoardLocation,
    placement: &Placement,
    part: &Part,
) -> Location {
    let mut placement_location = placement.location;
    let units = placement_location.units;
    let board = board_location.location.convert_to_units(units);

    if board_location.side == Side::Bottom {
        placement_location = placement_location.invert(true, false, false, false);
    }

    let point = rotate_translate_scale_point(
        Point::new(placement_location.x, placement_location.y),
        board.rotation,
        board.x,
        board.y,
        1.0,
        1.0,
    );

    let rotation = (placement_location.rotation + board.rotation) % 360.0;
    let part_height = part.height.convert_to_units(units).value;

    placement_location.derive(
        Some(point.x),
        Some(point.y),
        Some(board.z + part_height),
        Some(rotation),
    )
}
