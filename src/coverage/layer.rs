use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use shapefile::dbase::Record;

use crate::{common::*, geom::Geometries};

/// Path and content digest of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    pub path: PathBuf,
    pub sha256: String,
}

/// A polygon layer loaded from a shapefile, with one attribute record per shape.
#[derive(Debug)]
pub(crate) struct Layer {
    pub(crate) source: InputDigest,
    pub(crate) geoms: Geometries,
    pub(crate) records: Vec<Record>,
}

impl Layer {
    /// Load a polygon layer from a `.shp` file or a `.zip` holding exactly one.
    pub(crate) fn from_shapefile(path: &Path) -> Result<Self> {
        require_file_exists(path).context("[load] input layer")?;
        let sha256 = sha256_file(path)?;

        let is_zip = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        let (geoms, records) = if is_zip {
            let tmp = tempfile::tempdir().context("[load] creating extraction directory")?;
            extract_zip(path, tmp.path())?;
            let shp = find_shapefile(tmp.path())
                .with_context(|| format!("[load] looking for a shapefile in {}", path.display()))?;
            Self::read_shapes(&shp)?
        } else {
            Self::read_shapes(path)?
        };

        Ok(Self { source: InputDigest { path: path.to_path_buf(), sha256 }, geoms, records })
    }

    fn read_shapes(path: &Path) -> Result<(Geometries, Vec<Record>)> {
        let crs = read_prj(path).with_context(|| format!("[load] reading CRS of {}", path.display()))?;
        let (shapes, records) = read_from_shapefile(path)
            .with_context(|| format!("[load] reading {}", path.display()))?;

        let shapes = shapes.into_iter().enumerate()
            .map(|(i, shape)| shape_to_multipolygon(shape)
                .with_context(|| format!("[load] record {i} of {}", path.display())))
            .collect::<Result<Vec<_>>>()?;

        Ok((Geometries::new(shapes, crs), records))
    }

    /// Union of every shape whose `field` equals `name` (trimmed, case-insensitive).
    pub(crate) fn select(&self, field: &str, name: &str) -> Result<Geometries> {
        let wanted = name.trim().to_lowercase();

        let mut selected: Vec<MultiPolygon<f64>> = Vec::new();
        for (i, record) in self.records.iter().enumerate() {
            let value = get_character_field(record, field)
                .with_context(|| format!("[load] record {i} of {}", self.source.path.display()))?;
            if value.to_lowercase() == wanted {
                let shape = &self.geoms.shapes()[i];
                ensure!(!shape.0.is_empty(),
                    "[load] record {i} ({field} = {value:?}) of {} has no geometry", self.source.path.display());
                selected.push(shape.clone());
            }
        }

        if selected.is_empty() {
            bail!("[load] no feature with {field} = {name:?} in {}", self.source.path.display());
        }
        Ok(Geometries::new(selected, self.geoms.crs()))
    }

    /// Error unless the layer holds at least one shape.
    pub(crate) fn require_nonempty(&self) -> Result<()> {
        ensure!(!self.geoms.is_empty(), "[load] layer {} has no features", self.source.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;
    use shapefile::dbase::FieldValue;

    use super::*;
    use crate::geom::Crs;

    fn layer(names: &[&str]) -> Layer {
        let shapes = names.iter().enumerate()
            .map(|(i, _)| {
                let x = i as f64;
                MultiPolygon(vec![polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]])
            })
            .collect();
        let records = names.iter()
            .map(|name| {
                let mut record = Record::default();
                record.insert("NM_MUN".to_string(), FieldValue::Character(Some(name.to_string())));
                record
            })
            .collect();

        Layer {
            source: InputDigest { path: PathBuf::from("municipios.shp"), sha256: String::new() },
            geoms: Geometries::new(shapes, Crs::SIRGAS2000),
            records,
        }
    }

    #[test]
    fn selection_matches_case_insensitively() {
        let layer = layer(&["Jardinópolis", "Ribeirão Preto", "Sertãozinho"]);
        let selected = layer.select("NM_MUN", "ribeirão preto ").unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.crs(), Crs::SIRGAS2000);
    }

    #[test]
    fn repeated_names_are_all_selected() {
        let layer = layer(&["Ilhabela", "Santos", "Ilhabela"]);
        let selected = layer.select("NM_MUN", "Ilhabela").unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn missing_name_or_field_is_an_error() {
        let layer = layer(&["Santos"]);
        let err = layer.select("NM_MUN", "Campinas").unwrap_err();
        assert!(err.to_string().contains("no feature with NM_MUN"), "{err:#}");
        assert!(layer.select("NAME", "Santos").is_err());
    }

    #[test]
    fn null_shapes_only_matter_when_selected() {
        let mut layer = layer(&["Santos", "Guarujá"]);
        let mut shapes = layer.geoms.shapes().to_vec();
        shapes[1] = MultiPolygon(vec![]);
        layer.geoms = Geometries::new(shapes, Crs::SIRGAS2000);

        assert_eq!(layer.select("NM_MUN", "Santos").unwrap().len(), 1);
        let err = layer.select("NM_MUN", "Guarujá").unwrap_err();
        assert!(err.to_string().contains("has no geometry"), "{err:#}");
    }

    #[test]
    fn empty_layer_is_rejected() {
        assert!(layer(&[]).require_nonempty().is_err());
        layer(&["Santos"]).require_nonempty().unwrap();
    }
}
