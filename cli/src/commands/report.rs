use anyhow::Result;
use carcover::{Coverage, ReportOptions};

/// Merge the config file (if any) with command-line overrides.
fn resolve_options(args: &crate::cli::ReportArgs) -> Result<ReportOptions> {
    let mut options = match &args.config {
        Some(path) => ReportOptions::from_json_file(path)?,
        None => ReportOptions::default(),
    };

    if let Some(boundary) = &args.boundary { options.boundary = boundary.clone() }
    if let Some(parcels) = &args.parcels { options.parcels = parcels.clone() }
    if let Some(municipality) = &args.municipality { options.municipality = municipality.clone() }
    if let Some(name_field) = &args.name_field { options.name_field = name_field.clone() }
    if let Some(projection) = args.projection { options.projection = projection.into() }

    options.validate()?;
    Ok(options)
}

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ReportArgs) -> Result<()> {
    let options = resolve_options(args)?;
    let out_dir = &args.output.clone().unwrap_or("./report".into());

    let coverage = Coverage::from_options(&options, cli.verbose)?;
    let written = coverage.write_outputs(out_dir, args.force)?;
    if cli.verbose > 0 {
        for path in &written { eprintln!("[report] wrote {}", path.display()) }
    }

    println!("Municipality: {} ({}, areas in {})", coverage.name(), coverage.crs(), coverage.projection());
    println!("Boundary area: {:.2} km²", coverage.boundary_km2());
    println!("Parcels: {} ({} overlapping pairs, {} nested)", coverage.parcel_count(), coverage.overlaps().len(), coverage.nested().len());
    println!("Registered area (raw): {:.2} km²", coverage.registered_km2());
    println!("Registered area (dissolved): {:.2} km²", coverage.dissolved_km2());
    println!("Registered area inside boundary: {:.2} km²", coverage.intersection_km2());
    println!("Coverage: {:.2}%", coverage.coverage_ratio() * 100.0);

    Ok(())
}
