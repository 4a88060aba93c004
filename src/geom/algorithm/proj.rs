use std::fmt;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use serde::{Deserialize, Serialize};

use crate::geom::{Crs, Geometries};

/// Planar projection used for area figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaProjection {
    /// Spherical Web Mercator (EPSG:3857). Areas grow with sec²(latitude).
    #[default]
    WebMercator,
    /// Transverse Mercator UTM zone picked from the reference center, on the source ellipsoid.
    Utm,
}

impl fmt::Display for AreaProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaProjection::WebMercator => write!(f, "web-mercator"),
            AreaProjection::Utm => write!(f, "utm"),
        }
    }
}

/// Build PROJ.4 string for the target UTM zone containing `center` (lon/lat degrees).
fn utm_proj4(center: Coord<f64>, ellipsoid: &str) -> String {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let south = if center.y >= 0.0 { "" } else { " +south" };
    format!("+proj=utm +zone={zone}{south} +ellps={ellipsoid} +units=m +no_defs +type=crs")
}

/// Pseudo-Mercator treats lon/lat as spherical coordinates, so both ends share the sphere.
const WEB_MERCATOR_SPHERE: &str = "+proj=longlat +a=6378137 +b=6378137 +no_defs +type=crs";
const WEB_MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs";

/// Build a PROJ.4 definition, attaching the string to any error.
fn build_proj(proj_string: &str) -> Result<Proj4> {
    Proj4::from_proj_string(proj_string)
        .with_context(|| anyhow!("[area] failed to build PROJ.4: {proj_string}"))
}

/// Reprojects shapes from a source CRS into planar meters.
pub(crate) struct Projector {
    transform: Option<(Proj4, Proj4)>, // None when the source is already in the target system
    target: AreaProjection,
}

impl Projector {
    /// Build a projector from `crs` into `target`. `center` (source coordinates)
    /// selects the UTM zone and is ignored for Web Mercator.
    pub(crate) fn new(crs: Crs, target: AreaProjection, center: Coord<f64>) -> Result<Self> {
        let transform = match target {
            AreaProjection::WebMercator if crs == Crs::WEB_MERCATOR => None,
            AreaProjection::WebMercator if crs.is_geographic() => {
                Some((build_proj(WEB_MERCATOR_SPHERE)?, build_proj(WEB_MERCATOR)?))
            }
            AreaProjection::Utm if crs.is_geographic() => {
                let ellipsoid = crs.ellipsoid()?;
                let source = format!("+proj=longlat +ellps={ellipsoid} +no_defs +type=crs");
                Some((build_proj(&source)?, build_proj(&utm_proj4(center, ellipsoid))?))
            }
            _ => bail!("[area] cannot project {crs} to {target}: unsupported source CRS"),
        };

        Ok(Self { transform, target })
    }

    /// Get the target projection.
    #[inline] pub(crate) fn target(&self) -> AreaProjection { self.target }

    /// Project one shape. Geographic inputs are degrees; outputs are meters.
    pub(crate) fn project(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        let Some((from, to)) = &self.transform else { return Ok(shape.clone()) };

        shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(from, to, &mut point)?;
            Ok::<_, proj4rs::errors::Error>(Coord { x: point.0, y: point.1 })
        })
        .with_context(|| anyhow!("[area] CRS transform to {} failed", self.target))
    }
}

impl Geometries {
    /// Build a projector for this collection, centered on its bounds.
    pub(crate) fn projector(&self, target: AreaProjection) -> Result<Projector> {
        let center = self.bounds().map(|b| b.center()).unwrap_or(Coord { x: 0.0, y: 0.0 });
        Projector::new(self.crs(), target, center)
    }

    /// Reproject all shapes into planar meters.
    pub fn reproject(&self, target: AreaProjection) -> Result<Vec<MultiPolygon<f64>>> {
        let projector = self.projector(target)?;
        self.shapes().iter().enumerate()
            .map(|(i, shape)| projector.project(shape).with_context(|| format!("[area] reprojecting shape {i}")))
            .collect()
    }
}
