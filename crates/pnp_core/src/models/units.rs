//! Length units and unit-tagged lengths.

use serde::{Deserialize, Serialize};

/// Unit of linear measure used by locations and lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Millimeters,
    Centimeters,
    Meters,
    Inches,
    Feet,
    Microns,
}

impl LengthUnit {
    /// Number of millimeters in one of this unit.
    pub fn millimeters_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Millimeters => 1.0,
            LengthUnit::Centimeters => 10.0,
            LengthUnit::Meters => 1000.0,
            LengthUnit::Inches => 25.4,
            LengthUnit::Feet => 304.8,
            LengthUnit::Microns => 0.001,
        }
    }

    /// Convert a value expressed in this unit to `to`.
    pub fn convert(&self, value: f64, to: LengthUnit) -> f64 {
        if *self == to {
            return value;
        }
        value * self.millimeters_per_unit() / to.millimeters_per_unit()
    }

    /// Short suffix used when formatting values.
    pub fn short_name(&self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
            LengthUnit::Microns => "um",
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// A scalar length tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    #[serde(default)]
    pub units: LengthUnit,
}

impl Length {
    pub fn new(value: f64, units: LengthUnit) -> Self {
        Self { value, units }
    }

    /// Millimeter shorthand.
    pub fn mm(value: f64) -> Self {
        Self::new(value, LengthUnit::Millimeters)
    }

    /// Return this length expressed in `units`.
    pub fn convert_to_units(&self, units: LengthUnit) -> Length {
        Length {
            value: self.units.convert(self.value, units),
            units,
        }
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}{}", self.value, self.units)
    }
}
