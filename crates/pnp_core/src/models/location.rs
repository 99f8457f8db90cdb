//! Machine-space locations and 2D point helpers.
//!
//! A `Location` is an X/Y/Z position plus a rotation (degrees) in a given
//! length unit. An axis set to `NaN` is "unconstrained": devices receiving
//! such a location leave that axis where it is. The pick and place
//! sequences use this to move in X/Y while staying at safe height.

use serde::{Deserialize, Serialize};

use super::units::LengthUnit;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    #[serde(default)]
    pub units: LengthUnit,
}

impl Location {
    pub fn new(units: LengthUnit, x: f64, y: f64, z: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            z,
            rotation,
            units,
        }
    }

    /// Millimeter shorthand.
    pub fn mm(x: f64, y: f64, z: f64, rotation: f64) -> Self {
        Self::new(LengthUnit::Millimeters, x, y, z, rotation)
    }

    /// Convert the linear axes to `units`. Rotation is unit-less and kept.
    pub fn convert_to_units(&self, units: LengthUnit) -> Location {
        if self.units == units {
            return *self;
        }
        Location {
            x: self.units.convert(self.x, units),
            y: self.units.convert(self.y, units),
            z: self.units.convert(self.z, units),
            rotation: self.rotation,
            units,
        }
    }

    /// Copy with the given axes replaced.
    pub fn derive(
        &self,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        rotation: Option<f64>,
    ) -> Location {
        Location {
            x: x.unwrap_or(self.x),
            y: y.unwrap_or(self.y),
            z: z.unwrap_or(self.z),
            rotation: rotation.unwrap_or(self.rotation),
            units: self.units,
        }
    }

    /// Copy with the selected axes negated.
    pub fn invert(&self, x: bool, y: bool, z: bool, rotation: bool) -> Location {
        let flip = |value: f64, on: bool| if on { -value } else { value };
        Location {
            x: flip(self.x, x),
            y: flip(self.y, y),
            z: flip(self.z, z),
            rotation: flip(self.rotation, rotation),
            units: self.units,
        }
    }

    /// Copy with Z unconstrained, for moves that keep the current height.
    pub fn with_unconstrained_z(&self) -> Location {
        self.derive(None, None, Some(f64::NAN), None)
    }

    /// True when X and Y are usable coordinates.
    pub fn is_valid_xy(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {:.3}, {:.3}, {:.3}, {:.3}",
            self.units, self.x, self.y, self.z, self.rotation
        )
    }
}

/// A bare 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rotate a point about the origin by `degrees`, counter-clockwise.
pub fn rotate_point(point: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point {
        x: point.x * cos - point.y * sin,
        y: point.x * sin + point.y * cos,
    }
}

pub fn translate_point(point: Point, dx: f64, dy: f64) -> Point {
    Point {
        x: point.x + dx,
        y: point.y + dy,
    }
}

pub fn scale_point(point: Point, scale_x: f64, scale_y: f64) -> Point {
    Point {
        x: point.x * scale_x,
        y: point.y * scale_y,
    }
}

/// Rotate, then translate, then scale.
pub fn rotate_translate_scale_point(
    point: Point,
    degrees: f64,
    dx: f64,
    dy: f64,
    scale_x: f64,
    scale_y: f64,
) -> Point {
    let point = rotate_point(point, degrees);
    let point = translate_point(point, dx, dy);
    scale_point(point, scale_x, scale_y)
}
