use anyhow::{bail, ensure, Result};
use geo::{Area, BooleanOps, MultiPolygon};

use crate::{geom::Geometries, graph::Clusters, types::ParcelId};

impl Geometries {
    /// Merge the shapes of each cluster into one MultiPolygon, indexed by cluster id.
    /// Singleton clusters keep their shape unchanged; holes created by a union are kept.
    pub fn dissolve(&self, clusters: &Clusters) -> Result<Geometries> {
        ensure!(clusters.parcel_count() == self.len(),
            "[dissolve] {} cluster labels for {} shapes", clusters.parcel_count(), self.len());

        let shapes = clusters.iter()
            .map(|(cluster, members)| {
                let merged = self.union_of(members);

                // A union can only lose area if the inputs were malformed.
                if merged.0.is_empty() && members.iter().any(|&p| self.shapes()[p.index()].unsigned_area() > 0.0) {
                    bail!("[dissolve] union of {cluster} is empty (members: {})",
                        members.iter().map(|p| p.0.to_string()).collect::<Vec<_>>().join(", "));
                }

                Ok(merged)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Geometries::new(shapes, self.crs()))
    }

    /// Union of the given members; a single member is returned as is.
    fn union_of(&self, members: &[ParcelId]) -> MultiPolygon<f64> {
        match members {
            [] => MultiPolygon(vec![]),
            [only] => self.shapes()[only.index()].clone(),
            [first, rest @ ..] => rest.iter()
                .fold(self.shapes()[first.index()].clone(), |acc, p| acc.union(&self.shapes()[p.index()])),
        }
    }
}
