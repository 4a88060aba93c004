use std::{collections::{BTreeMap, HashMap}, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Serialize;
use shapefile::{self as shp, dbase::{FieldValue, Record}, Reader, Shape};

use crate::geom::Crs;

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_from_shapefile(path: &Path) -> Result<(Vec<Shape>, Vec<Record>)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut shapes = Vec::new();
    let mut records = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        shapes.push(shape);
        records.push(record);
    }
    Ok((shapes, records))
}

/// Read the CRS of a shapefile from its `.prj` sidecar.
pub(crate) fn read_prj(path: &Path) -> Result<Crs> {
    let prj = path.with_extension("prj");
    let wkt = fs::read_to_string(&prj)
        .with_context(|| format!("Missing CRS: could not read {}", prj.display()))?;

    Crs::from_wkt(wkt.trim())
        .ok_or_else(|| anyhow!("Unrecognized CRS in {}: {}", prj.display(), wkt.trim()))
}

/// Convert shapefile rings to geo::MultiPolygon<f64>.
/// Shapefile stores each outer ring followed by its holes.
fn rings_to_geo<P>(rings: &[shp::PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let mut coords = ring.points().iter().map(&xy).collect::<Vec<_>>();
        ensure_closed(&mut coords);
        let ls = LineString(coords);

        match ring {
            shp::PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ls);
            }
            shp::PolygonRing::Inner(_) => current_holes.push(ls),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

/// Convert a polygon-type shapefile Shape into a geo::MultiPolygon<f64>.
/// Null shapes become empty MultiPolygons.
pub(crate) fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(p) => Ok(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Ok(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Ok(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::NullShape => Ok(MultiPolygon(vec![])),
        other => bail!("expected a polygon shape, found {:?}", other.shapetype()),
    }
}

/// Get the trimmed value of a character field from a Record.
pub(crate) fn get_character_field(record: &Record, field: &str) -> Result<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Ok(s.trim().to_string()),
        Some(FieldValue::Character(None)) => Ok(String::new()),
        Some(other) => bail!("field {field} is not a character field ({other:?})"),
        None => bail!("missing attribute field: {field}"),
    }
}

/// Overview of a shapefile's contents.
#[derive(Debug, Clone, Serialize)]
pub struct ShapefileInfo {
    pub records: usize,
    pub geometry_mix: BTreeMap<String, usize>,
    pub fields: Vec<String>,
    pub crs: Option<Crs>,
}

/// Summarize record count, geometry types, attribute columns and CRS of a shapefile.
pub fn inspect_shapefile(path: &Path) -> Result<ShapefileInfo> {
    let (shapes, records) = read_from_shapefile(path)?;

    let mut geometry_mix: BTreeMap<String, usize> = BTreeMap::new();
    for shape in &shapes {
        let kind = match shape {
            Shape::Point(_) | Shape::PointM(_) | Shape::PointZ(_) => "Point",
            Shape::Polygon(_) | Shape::PolygonM(_) | Shape::PolygonZ(_) => "Polygon",
            Shape::Polyline(_) | Shape::PolylineM(_) | Shape::PolylineZ(_) => "Polyline",
            Shape::NullShape => "Null",
            _ => "Other",
        };
        *geometry_mix.entry(kind.to_string()).or_default() += 1;
    }

    let mut fields = records.first()
        .map(|record| HashMap::<String, FieldValue>::from(record.clone()).into_keys().collect::<Vec<_>>())
        .unwrap_or_default();
    fields.sort();

    Ok(ShapefileInfo {
        records: shapes.len(),
        geometry_mix,
        fields,
        crs: read_prj(path).ok(),
    })
}
