mod algorithm;
mod bbox;
mod crs;
mod geom;
mod validate;

use bbox::BoundingBox;
pub use algorithm::AreaProjection;
pub use crs::Crs;
pub use geom::Geometries;
