use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque name of a rendered layer, owned by the map engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point layers produced by the most recent dataset load, in render order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSet {
    ids: Vec<LayerId>,
}

impl LayerSet {
    pub fn iter(&self) -> impl Iterator<Item = &LayerId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<I: Into<LayerId>> FromIterator<I> for LayerSet {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// The slice of the map engine the style code writes to.
///
/// Setters on layers the map does not know about are expected to be no-ops;
/// callers check [`MapSurface::has_layer`] first so they can report skips.
pub trait MapSurface {
    fn has_layer(&self, id: &LayerId) -> bool;
    fn set_paint_property(&mut self, id: &LayerId, property: &str, value: Value);
    fn set_layout_property(&mut self, id: &LayerId, property: &str, value: Value);
    /// Replaces the layer's filter outright.
    fn set_filter(&mut self, id: &LayerId, filter: Value);
    /// Replaces the data of a GeoJSON source, adding the source if missing.
    fn set_geojson_source(&mut self, source: &str, data: Value);
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LayerState {
    pub paint: BTreeMap<String, Value>,
    pub layout: BTreeMap<String, Value>,
    pub filter: Option<Value>,
}

/// Map surface held entirely in memory. Used by previews and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMap {
    layers: BTreeMap<LayerId, LayerState>,
    sources: BTreeMap<String, Value>,
}

impl InMemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layers<I: Into<LayerId>>(ids: impl IntoIterator<Item = I>) -> Self {
        let mut map = Self::new();
        for id in ids {
            map.add_layer(id);
        }
        map
    }

    pub fn add_layer(&mut self, id: impl Into<LayerId>) {
        self.layers.entry(id.into()).or_default();
    }

    pub fn layer(&self, id: &LayerId) -> Option<&LayerState> {
        self.layers.get(id)
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &LayerState)> {
        self.layers.iter()
    }

    pub fn source(&self, name: &str) -> Option<&Value> {
        self.sources.get(name)
    }
}

impl MapSurface for InMemoryMap {
    fn has_layer(&self, id: &LayerId) -> bool {
        self.layers.contains_key(id)
    }

    fn set_paint_property(&mut self, id: &LayerId, property: &str, value: Value) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.paint.insert(property.to_string(), value);
        }
    }

    fn set_layout_property(&mut self, id: &LayerId, property: &str, value: Value) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.layout.insert(property.to_string(), value);
        }
    }

    fn set_filter(&mut self, id: &LayerId, filter: Value) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.filter = Some(filter);
        }
    }

    fn set_geojson_source(&mut self, source: &str, data: Value) {
        self.sources.insert(source.to_string(), data);
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryMap, LayerId, LayerSet, MapSurface};
    use serde_json::json;

    #[test]
    fn layer_set_preserves_order_and_serializes_as_list() {
        let set: LayerSet = ["b", "a", "c"].into_iter().collect();
        let ids: Vec<&str> = set.iter().map(LayerId::as_str).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["b", "a", "c"]));
    }

    #[test]
    fn setters_ignore_unknown_layers() {
        let mut map = InMemoryMap::with_layers(["points-0"]);
        let ghost = LayerId::from("ghost");
        map.set_filter(&ghost, json!(true));
        map.set_paint_property(&ghost, "circle-color", json!("#fff"));
        assert!(!map.has_layer(&ghost));
        assert!(map.layer(&ghost).is_none());
    }
}
