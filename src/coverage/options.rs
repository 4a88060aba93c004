use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{common::read_from_json_file, geom::AreaProjection};

/// Attribute holding the municipality name in IBGE municipal boundary layers.
pub const DEFAULT_NAME_FIELD: &str = "NM_MUN";

/// Inputs and settings of one coverage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    /// Municipal boundary layer (`.shp` or `.zip`).
    pub boundary: PathBuf,
    /// Parcel registry layer (`.shp` or `.zip`).
    pub parcels: PathBuf,
    /// Name of the municipality to select from the boundary layer.
    pub municipality: String,
    /// Character attribute matched against `municipality`.
    pub name_field: String,
    pub projection: AreaProjection,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            boundary: PathBuf::new(),
            parcels: PathBuf::new(),
            municipality: String::new(),
            name_field: DEFAULT_NAME_FIELD.to_string(),
            projection: AreaProjection::default(),
        }
    }
}

impl ReportOptions {
    /// Load options from a JSON config file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        read_from_json_file(path).with_context(|| format!("[config] loading {}", path.display()))
    }

    /// Check that every required setting is present.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.boundary.as_os_str().is_empty(), "[config] missing boundary layer path");
        ensure!(!self.parcels.as_os_str().is_empty(), "[config] missing parcel layer path");
        ensure!(!self.municipality.trim().is_empty(), "[config] missing municipality name");
        ensure!(!self.name_field.trim().is_empty(), "[config] missing name field");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn defaults_need_paths_and_name() {
        let options = ReportOptions::default();
        assert_eq!(options.name_field, "NM_MUN");
        assert_eq!(options.projection, AreaProjection::WebMercator);
        assert!(options.validate().is_err());
    }

    #[test]
    fn json_config_fills_in_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.json");
        fs::write(&path, r#"{
            "boundary": "SP_Municipios_2022.shp",
            "parcels": "AREA_IMOVEL.zip",
            "municipality": "Ribeirão Preto",
            "projection": "utm"
        }"#).unwrap();

        let options = ReportOptions::from_json_file(&path).unwrap();
        assert_eq!(options.parcels, PathBuf::from("AREA_IMOVEL.zip"));
        assert_eq!(options.name_field, DEFAULT_NAME_FIELD);
        assert_eq!(options.projection, AreaProjection::Utm);
        options.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.json");
        fs::write(&path, r#"{ "municipio": "Santos" }"#).unwrap();

        let err = ReportOptions::from_json_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("[config]"));
    }
}
