//! SSR place names from a GeoJSON export.

use std::path::Path;

use peak_model::{Origin, PeakRecord, Point, Tags, keys};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// `GRUPPE` value of names for elevation features.
pub const ELEVATION_GROUP: &str = "høyder";
const GROUP_PROPERTY: &str = "GRUPPE";
const TYPE_PROPERTY: &str = "TYPE";
/// Uppercase property kept as is.
const KEPT_UPPERCASE: &str = "N50";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

impl Geometry {
    fn point(&self) -> Option<Point> {
        if self.kind != "Point" {
            return None;
        }
        let coordinates = self.coordinates.as_array()?;
        let lon = coordinates.first()?.as_f64()?;
        let lat = coordinates.get(1)?.as_f64()?;
        Point::new(lon, lat).ok()
    }
}

pub fn load_ssr(path: &Path) -> Result<Vec<PeakRecord>> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_ssr(&contents).map_err(|source| IngestError::GeoJson {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = records.len(), "loaded SSR peak names");
    Ok(records)
}

/// Parses a feature collection and keeps the elevation names as records.
pub fn parse_ssr(geojson: &str) -> serde_json::Result<Vec<PeakRecord>> {
    let collection: FeatureCollection = serde_json::from_str(geojson)?;
    let mut records = Vec::new();
    for feature in &collection.features {
        let in_group = feature
            .properties
            .get(GROUP_PROPERTY)
            .and_then(Value::as_str)
            == Some(ELEVATION_GROUP);
        if !in_group {
            continue;
        }
        let Some(location) = feature.geometry.as_ref().and_then(Geometry::point) else {
            debug!(properties = ?feature.properties, "skipping SSR feature without point");
            continue;
        };
        records.push(PeakRecord::new(
            Origin::AuthorityNames,
            location,
            ssr_tags(&feature.properties),
        ));
    }
    Ok(records)
}

/// Keeps OSM-style properties, `N50`, and `TYPE` renamed to `SSR_TYPE`.
fn ssr_tags(properties: &Map<String, Value>) -> Tags {
    let mut tags = Tags::new();
    for (key, value) in properties {
        let Some(value) = property_text(value) else {
            continue;
        };
        if key == KEPT_UPPERCASE || *key != key.to_uppercase() {
            tags.insert(key.as_str(), value);
        } else if key == TYPE_PROPERTY {
            tags.insert(keys::SSR_TYPE, value);
        }
    }
    tags
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
