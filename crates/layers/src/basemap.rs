use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::compose::LayoutInstruction;
use crate::layer::LayerId;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasemapMode {
    #[default]
    Streets,
    Satellite,
}

impl BasemapMode {
    pub fn toggled(self) -> Self {
        match self {
            BasemapMode::Streets => BasemapMode::Satellite,
            BasemapMode::Satellite => BasemapMode::Streets,
        }
    }
}

/// Satellite imagery raster drawn above the street basemap. Switching
/// basemaps only flips its visibility; both sources stay loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatelliteLayer {
    id: LayerId,
}

impl SatelliteLayer {
    pub fn new(id: impl Into<LayerId>) -> Self {
        Self { id: id.into() }
    }

    pub fn visibility_for(&self, mode: BasemapMode) -> LayoutInstruction {
        let visibility = match mode {
            BasemapMode::Satellite => "visible",
            BasemapMode::Streets => "none",
        };
        LayoutInstruction {
            layer_id: self.id.clone(),
            property: "visibility",
            value: json!(visibility),
        }
    }
}
