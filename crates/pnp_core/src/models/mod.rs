//! Data models for pick-and-place jobs.
//!
//! This module contains the design-time structures a job is built from:
//! - Units and lengths
//! - Machine-space locations and 2D point helpers
//! - Boards, placements and parts
//! - The job itself

mod board;
mod job;
mod location;
mod units;

pub use board::{Board, BoardLocation, Part, Placement, Side};
pub use job::Job;
pub use location::{
    rotate_point, rotate_translate_scale_point, scale_point, translate_point, Location, Point,
};
pub use units::{Length, LengthUnit};
