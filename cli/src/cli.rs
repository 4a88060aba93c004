use std::path::PathBuf;

use carcover::AreaProjection;

/// CAR coverage CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "carcover", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Dissolve overlapping parcels and measure their coverage of a municipality
    Report(ReportArgs),

    /// Print record count, geometry mix, attribute columns and CRS of a shapefile
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// JSON config file; flags below override its fields
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Municipal boundary layer (.shp or .zip)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub boundary: Option<PathBuf>,

    /// Parcel registry layer (.shp or .zip), e.g. AREA_IMOVEL
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub parcels: Option<PathBuf>,

    /// Municipality name to select from the boundary layer
    #[arg(short, long)]
    pub municipality: Option<String>,

    /// Attribute holding the municipality name, defaults to NM_MUN
    #[arg(long)]
    pub name_field: Option<String>,

    /// Planar projection for areas, defaults to web-mercator
    #[arg(short, long, value_enum)]
    pub projection: Option<ProjectionArg>,

    /// Output directory, defaults to "./report"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Shapefile to inspect
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub shapefile: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ProjectionArg {
    WebMercator,
    Utm,
}

impl From<ProjectionArg> for AreaProjection {
    fn from(arg: ProjectionArg) -> Self {
        match arg {
            ProjectionArg::WebMercator => AreaProjection::WebMercator,
            ProjectionArg::Utm => AreaProjection::Utm,
        }
    }
}
