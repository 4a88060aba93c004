mod coverage;
mod layer;
mod options;
mod summary;
mod write;

pub use coverage::Coverage;
pub use layer::InputDigest;
pub use options::{ReportOptions, DEFAULT_NAME_FIELD};
pub use summary::{ClusterSummary, CoverageSummary};
pub use write::OUTPUT_FILES;
