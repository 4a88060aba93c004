use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{ensure, Context, Result};
use geo::{LineString, MultiPolygon};
use serde_json::{json, Map, Value};

fn ring_to_json(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

/// Convert a MultiPolygon to a GeoJSON geometry object.
/// Each polygon is written as its exterior ring followed by its holes.
pub(crate) fn multipolygon_to_json(mp: &MultiPolygon<f64>) -> Value {
    let polygons = mp.0.iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(ring_to_json)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

/// Build a FeatureCollection from geometries and their per-feature properties.
pub(crate) fn feature_collection(geoms: &[MultiPolygon<f64>], properties: Vec<Map<String, Value>>) -> Result<Value> {
    ensure!(geoms.len() == properties.len(),
        "geometry count {} does not match property count {}", geoms.len(), properties.len());

    let features = geoms.iter().zip(properties)
        .map(|(mp, props)| json!({
            "type": "Feature",
            "geometry": multipolygon_to_json(mp),
            "properties": props,
        }))
        .collect::<Vec<_>>();

    Ok(json!({ "type": "FeatureCollection", "features": features }))
}

/// Write a FeatureCollection to a `.geojson` file at `path`.
pub(crate) fn write_to_geojson_file(path: &Path, geoms: &[MultiPolygon<f64>], properties: Vec<Map<String, Value>>) -> Result<()> {
    let collection = feature_collection(geoms, properties)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create GeoJSON file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &collection)
        .with_context(|| format!("Failed to write GeoJSON file: {}", path.display()))
}
