use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

use crate::common::{ensure_dir_exists, write_to_geojson_file, write_to_json_file};
use super::coverage::Coverage;

/// Files written by [`Coverage::write_outputs`], relative to the output directory.
pub const OUTPUT_FILES: [&str; 4] = ["summary.json", "boundary.geojson", "dissolved.geojson", "intersection.geojson"];

fn properties(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl Coverage {
    /// Write the summary and the boundary, dissolved and intersection layers to `dir`.
    /// Existing outputs are only replaced when `force` is set.
    pub fn write_outputs(&self, dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
        ensure_dir_exists(dir)?;

        let paths = OUTPUT_FILES.map(|name| dir.join(name));
        if !force {
            if let Some(existing) = paths.iter().find(|path| path.exists()) {
                bail!("[write] {} already exists (use --force to overwrite)", existing.display());
            }
        }
        let [summary, boundary, dissolved, intersection] = &paths;

        write_to_json_file(summary, &self.summary())
            .context("[write] summary")?;

        write_to_geojson_file(boundary,
            std::slice::from_ref(self.boundary()),
            vec![properties(json!({ "name": self.name(), "area_km2": self.boundary_km2() }))],
        ).context("[write] boundary layer")?;

        let cluster_props = self.clusters().iter()
            .zip(self.cluster_km2())
            .map(|((id, members), area_km2)| properties(json!({
                "index": id,
                "members": members,
                "area_km2": area_km2,
            })))
            .collect();
        write_to_geojson_file(dissolved, self.dissolved().shapes(), cluster_props)
            .context("[write] dissolved layer")?;

        let piece_props = self.intersection_sources().iter()
            .zip(self.intersection_piece_km2())
            .enumerate()
            .map(|(index, (cluster, area_km2))| properties(json!({
                "index": index,
                "cluster": cluster,
                "area_km2": area_km2,
            })))
            .collect();
        write_to_geojson_file(intersection, self.intersection().shapes(), piece_props)
            .context("[write] intersection layer")?;

        Ok(paths.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::{coverage::CoverageSummary, geom::{AreaProjection, Crs, Geometries}};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]])
    }

    fn coverage() -> Coverage {
        let boundary = Geometries::new(vec![rect(0.0, 0.0, 1000.0, 1000.0)], Crs::WEB_MERCATOR);
        let parcels = Geometries::new(vec![
            rect(-200.0, 0.0, 300.0, 500.0),
            rect(200.0, 0.0, 600.0, 500.0),
            rect(5000.0, 5000.0, 5100.0, 5100.0),
        ], Crs::WEB_MERCATOR);
        Coverage::compute("Teste", &boundary, &parcels, AreaProjection::WebMercator, 0).unwrap()
    }

    #[test]
    fn outputs_are_written_and_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("report");
        let written = coverage().write_outputs(&out, false).unwrap();
        assert_eq!(written.len(), 4);

        let summary: CoverageSummary = serde_json::from_slice(&fs::read(out.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary.cluster_count, 2);
        assert!((summary.intersection_km2 - 0.3).abs() < 1e-9);

        let dissolved: Value = serde_json::from_slice(&fs::read(out.join("dissolved.geojson")).unwrap()).unwrap();
        assert_eq!(dissolved["features"].as_array().unwrap().len(), 2);
        assert_eq!(dissolved["features"][0]["properties"]["members"], json!([0, 1]));

        let intersection: Value = serde_json::from_slice(&fs::read(out.join("intersection.geojson")).unwrap()).unwrap();
        assert_eq!(intersection["features"].as_array().unwrap().len(), 1);
        assert_eq!(intersection["features"][0]["properties"]["cluster"], 0);
    }

    #[test]
    fn existing_outputs_need_force() {
        let tmp = tempfile::tempdir().unwrap();
        let coverage = coverage();
        coverage.write_outputs(tmp.path(), false).unwrap();

        let err = coverage.write_outputs(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"), "{err:#}");
        coverage.write_outputs(tmp.path(), true).unwrap();
    }
}
