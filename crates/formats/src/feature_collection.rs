use serde_json::{Map, Value};
use thiserror::Error;

/// A GeoJSON feature. Geometry is kept as raw GeoJSON; nothing here
/// inspects coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<Value>,
    pub properties: Map<String, Value>,
    pub geometry: Value,
}

impl Feature {
    pub fn new(properties: Map<String, Value>, geometry: Value) -> Self {
        Self {
            id: None,
            properties,
            geometry,
        }
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, GeoJsonError> {
        let Value::Object(mut root) = value else {
            return Err(GeoJsonError::NotAFeatureCollection);
        };
        if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(GeoJsonError::NotAFeatureCollection);
        }
        let Some(Value::Array(raw_features)) = root.remove("features") else {
            return Err(GeoJsonError::NotAFeatureCollection);
        };

        let mut features = Vec::with_capacity(raw_features.len());
        for (index, raw) in raw_features.into_iter().enumerate() {
            features.push(parse_feature(raw).map_err(|reason| GeoJsonError::InvalidFeature {
                index,
                reason: reason.to_string(),
            })?);
        }
        Ok(Self { features })
    }

    pub fn to_geojson_value(&self) -> Value {
        let features = self
            .features
            .iter()
            .map(|feat| {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::from("Feature"));
                if let Some(id) = &feat.id {
                    obj.insert("id".to_string(), id.clone());
                }
                obj.insert(
                    "properties".to_string(),
                    Value::Object(feat.properties.clone()),
                );
                obj.insert("geometry".to_string(), feat.geometry.clone());
                Value::Object(obj)
            })
            .collect();

        let mut root = Map::new();
        root.insert("type".to_string(), Value::from("FeatureCollection"));
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

fn parse_feature(raw: Value) -> Result<Feature, &'static str> {
    let Value::Object(mut obj) = raw else {
        return Err("feature must be an object");
    };
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(_) => return Err("unexpected feature type"),
        None => return Err("feature missing type"),
    }

    let id = match obj.remove("id") {
        Some(v @ (Value::String(_) | Value::Number(_))) => Some(v),
        _ => None,
    };

    // `"properties": null` is valid GeoJSON.
    let properties = match obj.remove("properties") {
        Some(Value::Object(props)) => props,
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Err("properties must be an object or null"),
    };

    let geometry = match obj.remove("geometry") {
        Some(g @ Value::Null) => g,
        Some(g) if g.get("type").and_then(Value::as_str).is_some() => g,
        Some(_) => return Err("geometry must be an object with a type"),
        None => return Err("feature missing geometry"),
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::{FeatureCollection, GeoJsonError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_and_reemits_features() {
        let input = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": 7,
                    "properties": { "state": "FL", "slr_ft": 3 },
                    "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] }
                },
                { "type": "Feature", "properties": null, "geometry": null }
            ]
        });
        let fc = FeatureCollection::from_geojson_value(input.clone()).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].property_str("state"), Some("FL"));
        assert!(fc.features[1].properties.is_empty());

        let out = fc.to_geojson_value();
        assert_eq!(out["features"][0], input["features"][0]);
        assert_eq!(out["features"][1]["properties"], json!({}));
    }

    #[test]
    fn rejects_non_collections() {
        assert!(matches!(
            FeatureCollection::from_geojson_str(r#"{"type": "Feature"}"#),
            Err(GeoJsonError::NotAFeatureCollection)
        ));
        assert!(matches!(
            FeatureCollection::from_geojson_str("<html>502</html>"),
            Err(GeoJsonError::Json(_))
        ));
    }

    #[test]
    fn reports_bad_feature_index() {
        let err = FeatureCollection::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {}}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid feature at index 1: feature missing geometry"
        );
    }
}
