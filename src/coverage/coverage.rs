use anyhow::{bail, ensure, Context, Result};
use geo::MultiPolygon;

use crate::{
    geom::{AreaProjection, Crs, Geometries},
    graph::Clusters,
    types::{ClusterId, ParcelId},
};
use super::{layer::{InputDigest, Layer}, options::ReportOptions};

/// Overlap-resolved parcel coverage of a reference boundary.
#[derive(Debug)]
pub struct Coverage {
    name: String,
    inputs: Vec<InputDigest>,
    crs: Crs,
    projection: AreaProjection,

    boundary: MultiPolygon<f64>,
    boundary_km2: f64,

    parcel_count: usize,
    overlaps: Vec<(ParcelId, ParcelId)>,
    nested: Vec<ParcelId>,
    registered_km2: f64,

    clusters: Clusters,
    dissolved: Geometries,   // indexed by ClusterId
    cluster_km2: Vec<f64>,   // indexed by ClusterId

    intersection: Geometries,
    intersection_sources: Vec<ClusterId>,
    intersection_km2: Vec<f64>,
}

impl Coverage {
    /// Resolve parcel overlaps and measure the result against `boundary`.
    /// `boundary` may hold several pieces; they are unioned first.
    pub fn compute(name: &str, boundary: &Geometries, parcels: &Geometries, projection: AreaProjection, verbose: u8) -> Result<Self> {
        ensure!(!boundary.is_empty(), "[coverage] boundary of {name:?} is empty");
        if boundary.crs() != parcels.crs() {
            bail!("[coverage] CRS mismatch: boundary is {} but parcels are {}", boundary.crs(), parcels.crs());
        }

        boundary.validate().context("[coverage] boundary layer")?;
        parcels.validate().context("[coverage] parcel layer")?;

        let projector = boundary.projector(projection)?;
        let boundary = boundary.union();
        let boundary_km2 = projector.area_km2(&boundary).context("[area] boundary")?;
        if verbose > 0 { eprintln!("[coverage] {name}: boundary {boundary_km2:.2} km² ({})", projector.target()); }

        let scan = parcels.scan_overlaps()?;
        let overlaps = scan.graph.pairs()
            .map(|(i, j)| (ParcelId::from(i), ParcelId::from(j)))
            .collect::<Vec<_>>();
        if verbose > 0 {
            eprintln!("[coverage] {} parcels, {} overlapping pairs, {} nested", parcels.len(), overlaps.len(), scan.nested.len());
        }

        let clusters = scan.graph.components();
        let dissolved = parcels.dissolve(&clusters)?;
        if verbose > 0 { eprintln!("[coverage] {} clusters ({} merged)", clusters.len(), clusters.merged_count()); }

        let registered_km2: f64 = parcels.areas_km2(&projector)?.iter().sum();
        let cluster_km2 = dissolved.areas_km2(&projector)?;
        if verbose > 1 {
            for ((cluster, members), km2) in clusters.iter().zip(&cluster_km2) {
                if members.len() > 1 { eprintln!("[coverage] {cluster}: {} parcels, {km2:.4} km²", members.len()); }
            }
        }

        let (sources, intersection) = dissolved.clip(&boundary);
        let intersection_km2 = intersection.areas_km2(&projector)?;
        if verbose > 0 {
            eprintln!("[coverage] {} clusters intersect the boundary", intersection.len());
        }

        Ok(Self {
            name: name.to_string(),
            inputs: Vec::new(),
            crs: parcels.crs(),
            projection,
            boundary,
            boundary_km2,
            parcel_count: parcels.len(),
            overlaps,
            nested: scan.nested,
            registered_km2,
            clusters,
            dissolved,
            cluster_km2,
            intersection,
            intersection_sources: sources.into_iter().map(ClusterId::from).collect(),
            intersection_km2,
        })
    }

    /// Load both layers named by `options` and compute their coverage.
    pub fn from_options(options: &ReportOptions, verbose: u8) -> Result<Self> {
        options.validate()?;

        if verbose > 0 { eprintln!("[load] boundary <- {}", options.boundary.display()); }
        let municipalities = Layer::from_shapefile(&options.boundary)?;
        let boundary = municipalities.select(&options.name_field, &options.municipality)?;

        if verbose > 0 { eprintln!("[load] parcels <- {}", options.parcels.display()); }
        let parcels = Layer::from_shapefile(&options.parcels)?;
        parcels.require_nonempty()?;

        let mut coverage = Self::compute(&options.municipality, &boundary, &parcels.geoms, options.projection, verbose)?;
        coverage.inputs = vec![municipalities.source, parcels.source];
        Ok(coverage)
    }

    #[inline] pub fn name(&self) -> &str { &self.name }
    #[inline] pub fn crs(&self) -> Crs { self.crs }
    #[inline] pub fn projection(&self) -> AreaProjection { self.projection }
    #[inline] pub fn boundary(&self) -> &MultiPolygon<f64> { &self.boundary }
    #[inline] pub fn clusters(&self) -> &Clusters { &self.clusters }
    #[inline] pub fn dissolved(&self) -> &Geometries { &self.dissolved }
    #[inline] pub fn intersection(&self) -> &Geometries { &self.intersection }
    #[inline] pub fn nested(&self) -> &[ParcelId] { &self.nested }
    #[inline] pub fn parcel_count(&self) -> usize { self.parcel_count }
    #[inline] pub fn inputs(&self) -> &[InputDigest] { &self.inputs }

    /// Partially overlapping parcel pairs, lower index first.
    #[inline] pub fn overlaps(&self) -> &[(ParcelId, ParcelId)] { &self.overlaps }

    /// Cluster that each intersection piece was clipped from.
    #[inline] pub fn intersection_sources(&self) -> &[ClusterId] { &self.intersection_sources }

    /// Area of the reference boundary.
    #[inline] pub fn boundary_km2(&self) -> f64 { self.boundary_km2 }

    /// Sum of raw parcel areas; overlapping ground is counted once per parcel.
    #[inline] pub fn registered_km2(&self) -> f64 { self.registered_km2 }

    /// Area of each dissolved cluster, indexed by cluster id.
    #[inline] pub fn cluster_km2(&self) -> &[f64] { &self.cluster_km2 }

    /// Area of each intersection piece.
    #[inline] pub fn intersection_piece_km2(&self) -> &[f64] { &self.intersection_km2 }

    /// Unique registered area.
    pub fn dissolved_km2(&self) -> f64 { self.cluster_km2.iter().sum() }

    /// Unique registered area inside the boundary.
    pub fn intersection_km2(&self) -> f64 { self.intersection_km2.iter().sum() }

    /// Share of the boundary covered by registered parcels.
    pub fn coverage_ratio(&self) -> f64 {
        if self.boundary_km2 > 0.0 { self.intersection_km2() / self.boundary_km2 } else { 0.0 }
    }
}
