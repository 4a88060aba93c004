use anyhow::Result;
use carcover::inspect_shapefile;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let info = inspect_shapefile(&args.shapefile)?;

    println!("Number of records: {}", info.records);
    println!("Geometry mix:");
    for (kind, count) in &info.geometry_mix {
        println!("  - {kind}: {count}");
    }
    println!("Attribute columns:");
    for field in &info.fields {
        println!("  - {field}");
    }
    match info.crs {
        Some(crs) => println!("CRS: {crs}"),
        None => println!("CRS: unknown (missing or unrecognized .prj)"),
    }

    Ok(())
}
