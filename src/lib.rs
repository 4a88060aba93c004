#![doc = "carcover public API"]
mod common;
mod coverage;
mod geom;
mod graph;
mod types;

#[doc(inline)]
pub use coverage::{ClusterSummary, Coverage, CoverageSummary, InputDigest, ReportOptions, DEFAULT_NAME_FIELD, OUTPUT_FILES};

#[doc(inline)]
pub use geom::{AreaProjection, Crs, Geometries};

#[doc(inline)]
pub use graph::{Clusters, Graph};

#[doc(inline)]
pub use types::{ClusterId, ParcelId};

#[doc(inline)]
pub use common::{inspect_shapefile, ShapefileInfo};
