//! Turns the active style parameters into per-layer map instructions.
//!
//! Composition is pure: the same scheme or threshold over the same layer set
//! yields equal instructions. Applying them is a separate step against a
//! [`MapSurface`]; layers the map does not (yet) have are skipped.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::filter::{ElevationFilter, SeaLevel};
use crate::layer::{LayerId, LayerSet, MapSurface};
use crate::symbology::{ColorScheme, POINT_COLOR_PROPERTY, PaintExpression};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintInstruction {
    pub layer_id: LayerId,
    pub property: &'static str,
    pub value: PaintExpression,
}

/// Replaces, never merges with, the layer's existing filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterInstruction {
    pub layer_id: LayerId,
    pub filter: ElevationFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInstruction {
    pub layer_id: LayerId,
    pub property: &'static str,
    pub value: Value,
}

pub fn compose_paint(scheme: ColorScheme, layers: &LayerSet) -> Vec<PaintInstruction> {
    let expression = scheme.paint_expression();
    layers
        .iter()
        .map(|id| PaintInstruction {
            layer_id: id.clone(),
            property: POINT_COLOR_PROPERTY,
            value: expression.clone(),
        })
        .collect()
}

/// Like [`compose_paint`] for a scheme name straight from the UI.
/// Unknown names produce no instructions.
pub fn compose_paint_named(scheme: &str, layers: &LayerSet) -> Vec<PaintInstruction> {
    match scheme.parse::<ColorScheme>() {
        Ok(scheme) => compose_paint(scheme, layers),
        Err(err) => {
            debug!("{err}; leaving point colors unchanged");
            Vec::new()
        }
    }
}

pub fn compose_filter(level: SeaLevel, layers: &LayerSet) -> Vec<FilterInstruction> {
    let filter = ElevationFilter::at_sea_level(level);
    layers
        .iter()
        .map(|id| FilterInstruction {
            layer_id: id.clone(),
            filter,
        })
        .collect()
}

/// Summary of one apply pass.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Applied {
    pub applied: usize,
    pub skipped: usize,
}

impl Applied {
    fn record(&mut self, present: bool) {
        if present {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }
}

pub fn apply_paint(map: &mut dyn MapSurface, instructions: &[PaintInstruction]) -> Applied {
    let mut out = Applied::default();
    for ins in instructions {
        let present = map.has_layer(&ins.layer_id);
        if present {
            map.set_paint_property(&ins.layer_id, ins.property, ins.value.to_value());
        } else {
            debug!(layer = %ins.layer_id, "paint skipped; layer not on map");
        }
        out.record(present);
    }
    out
}

pub fn apply_filter(map: &mut dyn MapSurface, instructions: &[FilterInstruction]) -> Applied {
    let mut out = Applied::default();
    for ins in instructions {
        let present = map.has_layer(&ins.layer_id);
        if present {
            map.set_filter(&ins.layer_id, ins.filter.to_value());
        } else {
            debug!(layer = %ins.layer_id, "filter skipped; layer not on map");
        }
        out.record(present);
    }
    out
}

pub fn apply_layout(map: &mut dyn MapSurface, instructions: &[LayoutInstruction]) -> Applied {
    let mut out = Applied::default();
    for ins in instructions {
        let present = map.has_layer(&ins.layer_id);
        if present {
            map.set_layout_property(&ins.layer_id, ins.property, ins.value.clone());
        }
        out.record(present);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        Applied, apply_filter, apply_paint, compose_filter, compose_paint, compose_paint_named,
    };
    use crate::filter::SeaLevel;
    use crate::layer::{InMemoryMap, LayerId, LayerSet};
    use crate::symbology::{ColorScheme, POINT_COLOR_PROPERTY};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn layers() -> LayerSet {
        ["lidar-0", "lidar-1"].into_iter().collect()
    }

    #[test]
    fn one_identical_instruction_per_layer() {
        let ins = compose_paint(ColorScheme::Intensity, &layers());
        assert_eq!(ins.len(), 2);
        assert_eq!(ins[0].layer_id, LayerId::from("lidar-0"));
        assert_eq!(ins[1].layer_id, LayerId::from("lidar-1"));
        assert_eq!(ins[0].value, ins[1].value);
        assert_eq!(ins[0].property, POINT_COLOR_PROPERTY);
    }

    #[test]
    fn composition_is_deterministic() {
        assert_eq!(
            compose_paint(ColorScheme::Classification, &layers()),
            compose_paint(ColorScheme::Classification, &layers())
        );
        let level = SeaLevel::new(2.3).unwrap();
        assert_eq!(
            compose_filter(level, &layers()),
            compose_filter(level, &layers())
        );
    }

    #[test]
    fn unknown_scheme_name_is_a_no_op() {
        assert!(compose_paint_named("viridis", &layers()).is_empty());
        assert_eq!(
            compose_paint_named("rgb", &layers()),
            compose_paint(ColorScheme::Rgb, &layers())
        );
    }

    #[test]
    fn last_applied_scheme_wins_without_residue() {
        let mut replaced = InMemoryMap::with_layers(["lidar-0", "lidar-1"]);
        apply_paint(
            &mut replaced,
            &compose_paint(ColorScheme::Classification, &layers()),
        );
        apply_paint(&mut replaced, &compose_paint(ColorScheme::Elevation, &layers()));

        let mut direct = InMemoryMap::with_layers(["lidar-0", "lidar-1"]);
        apply_paint(&mut direct, &compose_paint(ColorScheme::Elevation, &layers()));

        for id in layers().iter() {
            assert_eq!(replaced.layer(id), direct.layer(id));
        }
    }

    #[test]
    fn filter_replaces_previous_filter() {
        let mut map = InMemoryMap::with_layers(["lidar-0"]);
        let set: LayerSet = ["lidar-0"].into_iter().collect();
        apply_filter(&mut map, &compose_filter(SeaLevel::new(4.0).unwrap(), &set));
        apply_filter(&mut map, &compose_filter(SeaLevel::new(0.5).unwrap(), &set));
        assert_eq!(
            map.layer(&LayerId::from("lidar-0")).unwrap().filter,
            Some(json!([">=", ["get", "Z"], 0.5]))
        );
    }

    #[test]
    fn missing_layers_are_skipped_silently() {
        let mut map = InMemoryMap::with_layers(["lidar-1"]);
        let applied = apply_paint(&mut map, &compose_paint(ColorScheme::Rgb, &layers()));
        assert_eq!(
            applied,
            Applied {
                applied: 1,
                skipped: 1
            }
        );
        assert!(map.layer(&LayerId::from("lidar-0")).is_none());
        assert!(
            map.layer(&LayerId::from("lidar-1"))
                .unwrap()
                .paint
                .contains_key(POINT_COLOR_PROPERTY)
        );
    }

    #[test]
    fn instructions_serialize_as_map_expressions() {
        let set: LayerSet = ["lidar-0"].into_iter().collect();
        let v = serde_json::to_value(compose_filter(SeaLevel::DEFAULT, &set)).unwrap();
        assert_eq!(
            v,
            json!([{ "layerId": "lidar-0", "filter": [">=", ["get", "Z"], 1.5] }])
        );
    }
}
