//! NOAA sea-level-rise polygons, narrowed to Florida.
//!
//! The national file is large and the app only covers Florida, so features
//! are filtered on their state attribute before they reach the map.

use tracing::{info, warn};

use crate::feature_collection::{Feature, FeatureCollection};

/// State attribute keys, checked in order. The first non-empty one wins.
const STATE_KEYS: [&str; 2] = ["state", "STATE"];
const FLORIDA: &str = "FL";

/// True iff the feature's state attribute, uppercased, contains `FL`.
/// Missing or non-string state values never match.
pub fn is_florida_feature(feature: &Feature) -> bool {
    STATE_KEYS
        .iter()
        .filter_map(|key| feature.property_str(key))
        .find(|state| !state.is_empty())
        .is_some_and(|state| state.to_uppercase().contains(FLORIDA))
}

pub fn florida_only(collection: FeatureCollection) -> FeatureCollection {
    collection
        .features
        .into_iter()
        .filter(is_florida_feature)
        .collect()
}

/// Parses a fetched overlay payload and keeps Florida features.
///
/// Any parse failure is logged and yields an empty collection: a missing
/// overlay must not take the rest of the map down with it.
pub fn florida_overlay_from_str(payload: &str) -> FeatureCollection {
    match FeatureCollection::from_geojson_str(payload) {
        Ok(all) => {
            let total = all.len();
            let kept = florida_only(all);
            info!(total, kept = kept.len(), "sea-level overlay filtered to Florida");
            kept
        }
        Err(err) => {
            warn!("sea-level overlay unusable, showing no polygons: {err}");
            FeatureCollection::empty()
        }
    }
}
