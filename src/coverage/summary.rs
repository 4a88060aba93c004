use serde::{Deserialize, Serialize};

use crate::{
    geom::{AreaProjection, Crs},
    types::{ClusterId, ParcelId},
};
use super::{coverage::Coverage, layer::InputDigest};

/// Figures for one dissolved cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: ClusterId,
    pub members: Vec<ParcelId>,
    pub area_km2: f64,
}

/// Machine-readable report of a coverage run. Areas are km² at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub municipality: String,
    pub crs: Crs,
    pub projection: AreaProjection,
    pub inputs: Vec<InputDigest>,

    pub boundary_km2: f64,
    pub parcel_count: usize,
    pub overlap_pairs: usize,
    pub nested_parcels: usize,
    pub cluster_count: usize,
    pub merged_clusters: usize,

    /// Sum of raw parcel areas (overlaps counted more than once).
    pub registered_km2: f64,
    /// Area of the dissolved parcels.
    pub dissolved_km2: f64,
    pub intersection_km2: f64,
    pub coverage_ratio: f64,

    /// Merged clusters only; singletons are implied by the parcel layer.
    pub clusters: Vec<ClusterSummary>,
}

impl Coverage {
    /// Summarize the run.
    pub fn summary(&self) -> CoverageSummary {
        let clusters = self.clusters().iter()
            .zip(self.cluster_km2())
            .filter(|((_, members), _)| members.len() > 1)
            .map(|((id, members), &area_km2)| ClusterSummary { id, members: members.to_vec(), area_km2 })
            .collect();

        CoverageSummary {
            municipality: self.name().to_string(),
            crs: self.crs(),
            projection: self.projection(),
            inputs: self.inputs().to_vec(),
            boundary_km2: self.boundary_km2(),
            parcel_count: self.parcel_count(),
            overlap_pairs: self.overlaps().len(),
            nested_parcels: self.nested().len(),
            cluster_count: self.clusters().len(),
            merged_clusters: self.clusters().merged_count(),
            registered_km2: self.registered_km2(),
            dissolved_km2: self.dissolved_km2(),
            intersection_km2: self.intersection_km2(),
            coverage_ratio: self.coverage_ratio(),
            clusters,
        }
    }
}
