mod area;
mod dissolve;
mod overlap;
pub(crate) mod proj;

pub use proj::AreaProjection;
