use catalog::DatasetDescriptor;
use layers::LayerId;

/// Everything the map session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A LiDAR dataset search finished.
    SearchCompleted(Vec<DatasetDescriptor>),
    /// A dataset finished loading; these are its rendered point layers.
    LoadCompleted(Vec<LayerId>),
    /// Raw value of the color-scheme selector.
    ColorSchemeSelected(String),
    /// Raw value of the sea-level slider, meters.
    SeaLevelChanged(f64),
    BasemapToggled,
    /// Outcome of the one-shot sea-level-rise overlay fetch.
    OverlayFetched(Result<String, String>),
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::SearchCompleted(_) => "search_completed",
            SessionEvent::LoadCompleted(_) => "load_completed",
            SessionEvent::ColorSchemeSelected(_) => "color_scheme_selected",
            SessionEvent::SeaLevelChanged(_) => "sea_level_changed",
            SessionEvent::BasemapToggled => "basemap_toggled",
            SessionEvent::OverlayFetched(_) => "overlay_fetched",
        }
    }
}
