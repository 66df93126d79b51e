//! Catalog listing command.

use console::style;

use crate::config::Settings;

use super::super::helpers::truncate;

/// Print the loaded properties and known locations.
pub async fn cmd_catalog(settings: &Settings) -> anyhow::Result<()> {
    let catalog = settings.load_catalog()?;

    if catalog.properties().is_empty() {
        println!("{} No properties configured.", style("!").yellow());
    } else {
        println!("\n{}", style("Properties").bold());
        println!("{}", "-".repeat(60));
        println!("{:<32} {:>12} {:>12}", "Name", "Latitude", "Longitude");
        println!("{}", "-".repeat(60));

        for property in catalog.properties() {
            println!(
                "{:<32} {:>12.4} {:>12.4}",
                truncate(&property.name, 31),
                property.lat,
                property.lon
            );
        }
    }

    println!("\n{}", style("Known locations").bold());
    println!("{}", "-".repeat(60));
    if catalog.locations().is_empty() {
        println!("  (none, queries are geocoded as typed)");
    } else {
        println!("  {}", catalog.locations().join(", "));
    }

    Ok(())
}
