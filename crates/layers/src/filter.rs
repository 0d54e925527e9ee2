use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};

use crate::symbology::{PointAttribute, PointAttributes};

/// Sea-level threshold in meters, as set by the slider.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeaLevel(f64);

impl SeaLevel {
    pub const MIN_M: f64 = 0.0;
    pub const MAX_M: f64 = 5.0;
    /// Slider resolution: 0.1 m.
    const STEPS_PER_M: f64 = 10.0;
    pub const DEFAULT: SeaLevel = SeaLevel(1.5);

    /// Clamps to the slider range and snaps to its 0.1 m step.
    /// Returns `None` for NaN or infinite input.
    pub fn new(meters: f64) -> Option<Self> {
        if !meters.is_finite() {
            return None;
        }
        let snapped = (meters.clamp(Self::MIN_M, Self::MAX_M) * Self::STEPS_PER_M).round()
            / Self::STEPS_PER_M;
        Some(Self(snapped))
    }

    pub fn meters(self) -> f64 {
        self.0
    }
}

impl Default for SeaLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Keeps points at or above a minimum elevation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ElevationFilter {
    pub min_z: f64,
}

impl ElevationFilter {
    pub fn at_sea_level(level: SeaLevel) -> Self {
        Self {
            min_z: level.meters(),
        }
    }

    pub fn accepts(&self, point: &PointAttributes) -> bool {
        point.z >= self.min_z
    }

    pub fn to_value(&self) -> Value {
        json!([">=", PointAttribute::Z.get_expr(), self.min_z])
    }
}

impl Serialize for ElevationFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
