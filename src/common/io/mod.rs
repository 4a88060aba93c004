mod geojson;
mod json;
mod shp;

pub(crate) use geojson::*;
pub(crate) use json::*;
pub(crate) use shp::*;
pub use shp::{inspect_shapefile, ShapefileInfo};
