//! Minimal GeoJSON model: just enough to pull named stations out of a line file.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::Coordinates;

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Station parsed from a `Point` feature.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StationFeature {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

impl FeatureCollection {
    /// Named `Point` features in file order. Track geometry is skipped.
    pub(crate) fn stations(&self) -> Vec<StationFeature> {
        self.features
            .iter()
            .filter_map(|feature| {
                let geometry = feature.geometry.as_ref()?;
                if geometry.kind != "Point" {
                    return None;
                }
                let name = feature
                    .properties
                    .as_ref()?
                    .get("name")?
                    .as_str()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())?;
                Some(StationFeature {
                    name: name.to_string(),
                    coordinates: point_coordinates(&geometry.coordinates),
                })
            })
            .collect()
    }
}

fn point_coordinates(value: &Value) -> Option<Coordinates> {
    match value.as_array()?.as_slice() {
        [lon, lat, ..] => Some(Coordinates {
            lon: lon.as_f64()?,
            lat: lat.as_f64()?,
        }),
        _ => None,
    }
}
