use std::{fmt, sync::OnceLock};

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coordinate reference system, identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(u32);

impl Crs {
    pub const WGS84: Crs = Crs(4326);
    pub const SIRGAS2000: Crs = Crs(4674);
    pub const NAD83: Crs = Crs(4269);
    pub const WEB_MERCATOR: Crs = Crs(3857);

    #[inline] pub fn from_epsg(code: u32) -> Self { Self(code) }

    #[inline] pub fn epsg(&self) -> u32 { self.0 }

    /// True for lon/lat systems (coordinates in degrees).
    #[inline]
    pub fn is_geographic(&self) -> bool {
        matches!(self.0, 4326 | 4674 | 4269)
    }

    /// Ellipsoid name understood by PROJ.4 strings, for geographic systems.
    pub(crate) fn ellipsoid(&self) -> Result<&'static str> {
        match self.0 {
            4326 => Ok("WGS84"),
            4674 | 4269 => Ok("GRS80"),
            code => bail!("[crs] EPSG:{code} is not a supported geographic CRS"),
        }
    }

    /// Detect the CRS from the WKT of a `.prj` sidecar file.
    /// Prefers the outermost EPSG authority code, then falls back to known datum names.
    pub fn from_wkt(wkt: &str) -> Option<Self> {
        static AUTHORITY: OnceLock<Regex> = OnceLock::new();
        let authority = AUTHORITY.get_or_init(|| {
            Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid authority regex")
        });

        // The CRS-level authority is the last one in WKT1.
        if let Some(code) = authority.captures_iter(wkt)
            .last()
            .and_then(|cap| cap[1].parse::<u32>().ok()) {
            return Some(Self(code))
        }

        let upper = wkt.to_ascii_uppercase();
        if upper.starts_with("PROJCS") {
            return upper.contains("PSEUDO-MERCATOR").then_some(Self::WEB_MERCATOR)
        }
        if upper.contains("SIRGAS") && upper.contains("2000") { return Some(Self::SIRGAS2000) }
        if upper.contains("NORTH_AMERICAN_1983") || upper.contains("NAD83") { return Some(Self::NAD83) }
        if upper.contains("WGS_1984") || upper.contains("WGS 84") || upper.contains("WGS84") { return Some(Self::WGS84) }

        None
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "EPSG:{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIRGAS_ESRI: &str = r#"GEOGCS["GCS_SIRGAS_2000",DATUM["D_SIRGAS_2000",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    const WGS84_OGC: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

    #[test]
    fn authority_code_wins() {
        assert_eq!(Crs::from_wkt(WGS84_OGC), Some(Crs::WGS84));
    }

    #[test]
    fn esri_wkt_falls_back_to_datum_name() {
        assert_eq!(Crs::from_wkt(SIRGAS_ESRI), Some(Crs::SIRGAS2000));
        assert_eq!(Crs::from_wkt(r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983"]]"#), Some(Crs::NAD83));
    }

    #[test]
    fn unknown_projected_wkt_is_rejected() {
        assert_eq!(Crs::from_wkt(r#"PROJCS["SIRGAS_2000_UTM_Zone_23S",GEOGCS["GCS_SIRGAS_2000"]]"#), None);
        assert_eq!(Crs::from_wkt(r#"PROJCS["WGS_84_Pseudo-Mercator",GEOGCS["GCS_WGS_1984"]]"#), Some(Crs::WEB_MERCATOR));
        assert_eq!(Crs::from_wkt(""), None);
    }

    #[test]
    fn geographic_systems_have_ellipsoids() {
        assert!(Crs::SIRGAS2000.is_geographic());
        assert_eq!(Crs::SIRGAS2000.ellipsoid().unwrap(), "GRS80");
        assert!(!Crs::WEB_MERCATOR.is_geographic());
        assert!(Crs::WEB_MERCATOR.ellipsoid().is_err());
    }
}
