mod components;
mod graph;

pub use components::Clusters;
pub use graph::Graph;
