//! Map session coordinator.
//!
//! Owns the state the UI mutates (color scheme, sea level, basemap, current
//! point layers) and turns each [`SessionEvent`] into calls on the pure
//! ranking/styling code plus writes to the map.

use catalog::{DatasetDescriptor, select_best};
use formats::{FeatureCollection, florida_overlay_from_str};
use layers::{
    Applied, BasemapMode, ColorScheme, LayerId, LayerSet, MapSurface, SatelliteLayer, SeaLevel,
    apply_filter, apply_layout, apply_paint, compose_filter, compose_paint,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::event::SessionEvent;

/// Receives the dataset chosen after a search.
pub trait DatasetLoader {
    fn load_dataset(&mut self, dataset: &DatasetDescriptor);
}

impl<F: FnMut(&DatasetDescriptor)> DatasetLoader for F {
    fn load_dataset(&mut self, dataset: &DatasetDescriptor) {
        (*self)(dataset)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleParameters {
    pub color_scheme: ColorScheme,
    pub sea_level: SeaLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub satellite_layer: LayerId,
    /// GeoJSON source the sea-level-rise polygons are written to.
    pub overlay_source: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            satellite_layer: LayerId::from("satellite"),
            overlay_source: "sea-level-rise".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionState {
    pub style: StyleParameters,
    pub basemap: BasemapMode,
    pub layers: LayerSet,
    pub overlay_features: usize,
    pub selected: Option<DatasetDescriptor>,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    satellite: SatelliteLayer,
    overlay_source: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: SessionState::default(),
            satellite: SatelliteLayer::new(config.satellite_layer),
            overlay_source: config.overlay_source,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn handle(
        &mut self,
        event: SessionEvent,
        map: &mut dyn MapSurface,
        loader: &mut dyn DatasetLoader,
    ) {
        debug!(kind = event.kind(), "session event");
        match event {
            SessionEvent::SearchCompleted(results) => self.on_search_completed(&results, loader),
            SessionEvent::LoadCompleted(ids) => self.on_load_completed(ids, map),
            SessionEvent::ColorSchemeSelected(raw) => self.on_color_scheme_selected(&raw, map),
            SessionEvent::SeaLevelChanged(meters) => self.on_sea_level_changed(meters, map),
            SessionEvent::BasemapToggled => self.on_basemap_toggled(map),
            SessionEvent::OverlayFetched(result) => self.on_overlay_fetched(result, map),
        }
    }

    fn on_search_completed(
        &mut self,
        results: &[DatasetDescriptor],
        loader: &mut dyn DatasetLoader,
    ) {
        let Some(best) = select_best(results) else {
            info!("dataset search returned nothing; nothing to load");
            return;
        };
        info!(
            candidates = results.len(),
            quality = best.quality_score().value(),
            "loading best dataset"
        );
        loader.load_dataset(best);
        self.state.selected = Some(best.clone());
    }

    /// The new layer set replaces the old one and immediately receives the
    /// current scheme and threshold.
    fn on_load_completed(&mut self, ids: Vec<LayerId>, map: &mut dyn MapSurface) {
        self.state.layers = ids.into_iter().collect();
        info!(layers = self.state.layers.len(), "dataset loaded");
        self.restyle(map);
    }

    fn on_color_scheme_selected(&mut self, raw: &str, map: &mut dyn MapSurface) {
        let Ok(scheme) = raw.parse::<ColorScheme>() else {
            debug!(scheme = raw, "ignoring unknown color scheme");
            return;
        };
        self.state.style.color_scheme = scheme;
        let applied = apply_paint(map, &compose_paint(scheme, &self.state.layers));
        log_applied("paint", applied);
    }

    fn on_sea_level_changed(&mut self, meters: f64, map: &mut dyn MapSurface) {
        let Some(level) = SeaLevel::new(meters) else {
            warn!(meters, "ignoring non-finite sea level");
            return;
        };
        self.state.style.sea_level = level;
        let applied = apply_filter(map, &compose_filter(level, &self.state.layers));
        log_applied("filter", applied);
    }

    fn on_basemap_toggled(&mut self, map: &mut dyn MapSurface) {
        self.state.basemap = self.state.basemap.toggled();
        apply_layout(map, &[self.satellite.visibility_for(self.state.basemap)]);
        info!(basemap = ?self.state.basemap, "basemap switched");
    }

    fn on_overlay_fetched(&mut self, result: Result<String, String>, map: &mut dyn MapSurface) {
        let overlay = match result {
            Ok(payload) => florida_overlay_from_str(&payload),
            Err(err) => {
                warn!("sea-level overlay fetch failed, showing no polygons: {err}");
                FeatureCollection::empty()
            }
        };
        self.state.overlay_features = overlay.len();
        map.set_geojson_source(&self.overlay_source, overlay.to_geojson_value());
    }

    fn restyle(&self, map: &mut dyn MapSurface) {
        let style = self.state.style;
        let paint = apply_paint(map, &compose_paint(style.color_scheme, &self.state.layers));
        let filter = apply_filter(map, &compose_filter(style.sea_level, &self.state.layers));
        log_applied("paint", paint);
        log_applied("filter", filter);
    }
}

fn log_applied(what: &'static str, applied: Applied) {
    if applied.skipped > 0 {
        debug!(
            what,
            applied = applied.applied,
            skipped = applied.skipped,
            "some layers not on map yet"
        );
    }
}
