use anyhow::{Context, Result};
use geo::{Area, BooleanOps, BoundingRect, MultiPolygon};
use rstar::AABB;

use crate::geom::{algorithm::proj::Projector, AreaProjection, BoundingBox, Geometries};

/// Square meters per square kilometer.
const M2_PER_KM2: f64 = 1e6;

impl Projector {
    /// Planar area of one shape in km², holes subtracted.
    pub(crate) fn area_km2(&self, shape: &MultiPolygon<f64>) -> Result<f64> {
        Ok(self.project(shape)?.unsigned_area() / M2_PER_KM2)
    }
}

impl Geometries {
    /// Planar area of every shape in km², in collection order.
    pub(crate) fn areas_km2(&self, projector: &Projector) -> Result<Vec<f64>> {
        self.shapes().iter().enumerate()
            .map(|(i, shape)| projector.area_km2(shape)
                .with_context(|| format!("[area] computing area of shape {i}")))
            .collect()
    }

    /// Planar area of every shape in km² under `projection`.
    pub fn area_km2(&self, projection: AreaProjection) -> Result<Vec<f64>> {
        self.areas_km2(&self.projector(projection)?)
    }

    /// Sum of the planar areas of all shapes in km².
    pub fn total_area_km2(&self, projection: AreaProjection) -> Result<f64> {
        Ok(self.area_km2(projection)?.iter().sum())
    }

    /// Intersect every shape with `boundary`, keeping the non-empty pieces.
    /// Returns the source index of each kept piece alongside the pieces.
    pub fn clip(&self, boundary: &MultiPolygon<f64>) -> (Vec<usize>, Geometries) {
        let Some(rect) = boundary.bounding_rect() else {
            return (Vec::new(), Geometries::new(Vec::new(), self.crs()))
        };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut sources = self.query(&envelope).map(BoundingBox::idx).collect::<Vec<_>>();
        sources.sort_unstable();

        let (sources, pieces): (Vec<_>, Vec<_>) = sources.into_iter()
            .map(|i| (i, self.shapes()[i].intersection(boundary)))
            .filter(|(_, piece)| !piece.0.is_empty() && piece.unsigned_area() > 0.0)
            .unzip();

        (sources, Geometries::new(pieces, self.crs()))
    }
}
