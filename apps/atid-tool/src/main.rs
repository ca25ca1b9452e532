//! Command-line diagnostics for the astronomical target resolver.
//!
//! Provides commands for:
//! - Listing the database drivers found on this host
//! - Name lookups against the local catalog or the remote service
//! - Cone and box searches

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use atid_core::coords::{parse_dec_dms, parse_ra_hms};
use atid_core::{AstronomicalTarget, DriverRegistry, Settings, SkyCoord};
use atid_resolver::{ForceMode, TargetResolver};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::new(),
    };
    let registry = Arc::new(DriverRegistry::initialise());
    tracing::debug!("{} database driver(s) available", registry.len());

    match &cli.command {
        Commands::Drivers => print_drivers(&registry, cli.json),
        Commands::Name {
            name,
            local,
            remote,
        } => {
            let mode = match (*local, *remote) {
                (true, _) => ForceMode::ForceLocal,
                (_, true) => ForceMode::ForceRemote,
                _ => ForceMode::None,
            };
            let mut resolver = open_resolver(settings, registry, &cli.slot)?;
            let target = resolver.query_by_name(name, mode)?;
            print_targets(target.as_slice(), cli.json)
        }
        Commands::Cone { ra, dec, radius } => {
            let center = coordinate(ra, dec)?;
            let mut resolver = open_resolver(settings, registry, &cli.slot)?;
            print_targets(&resolver.query_cone(center, *radius), cli.json)
        }
        Commands::Box {
            ra1,
            dec1,
            ra2,
            dec2,
        } => {
            let first = coordinate(ra1, dec1)?;
            let second = coordinate(ra2, dec2)?;
            let mut resolver = open_resolver(settings, registry, &cli.slot)?;
            print_targets(&resolver.query_box(first, second), cli.json)
        }
    }
}

fn open_resolver(
    settings: Settings,
    registry: Arc<DriverRegistry>,
    slot: &str,
) -> Result<TargetResolver> {
    TargetResolver::open_slot(Arc::new(settings), registry, slot)
        .context("failed to set up resolver")
}

/// Accepts decimal degrees or sexagesimal text.
fn coordinate(ra: &str, dec: &str) -> Result<SkyCoord> {
    let ra_deg = match ra.trim().parse::<f64>() {
        Ok(deg) => deg,
        Err(_) => parse_ra_hms(ra).with_context(|| format!("invalid right ascension '{ra}'"))?,
    };
    let dec_deg = match dec.trim().parse::<f64>() {
        Ok(deg) => deg,
        Err(_) => parse_dec_dms(dec).with_context(|| format!("invalid declination '{dec}'"))?,
    };
    anyhow::ensure!(
        (-90.0..=90.0).contains(&dec_deg),
        "declination {dec_deg} out of range"
    );
    Ok(SkyCoord::new(ra_deg, dec_deg))
}

fn print_drivers(registry: &DriverRegistry, json: bool) -> Result<()> {
    let descriptors = registry.descriptors();
    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }
    if descriptors.is_empty() {
        println!("No database drivers available");
    }
    for descriptor in descriptors {
        println!(
            "{:<12} {:<10} {}",
            descriptor.engine.to_string(),
            descriptor.handle,
            descriptor.label
        );
    }
    Ok(())
}

fn print_targets(targets: &[AstronomicalTarget], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(targets)?);
        return Ok(());
    }
    if targets.is_empty() {
        println!("No objects found");
    }
    for target in targets {
        println!("{}", target);
        let mut details = Vec::new();
        if let (Some(pm_ra), Some(pm_dec)) = (target.pm_ra, target.pm_dec) {
            details.push(format!("pm {pm_ra:.2} {pm_dec:.2} mas/yr"));
        }
        if let Some(parallax) = target.parallax {
            details.push(format!("plx {parallax:.2} mas"));
        }
        if let Some(rv) = target.radial_velocity {
            details.push(format!("rv {rv:.1} km/s"));
        }
        if let Some(kind) = &target.spectral_type {
            details.push(kind.clone());
        }
        if !details.is_empty() {
            println!("    {}", details.join(", "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_formats() {
        let decimal = coordinate("279.2347", "38.7837").unwrap();
        assert_eq!(decimal, SkyCoord::new(279.2347, 38.7837));

        let sexagesimal = coordinate("18 36 56.336", "+38 47 01.28").unwrap();
        assert!((sexagesimal.ra_deg - 279.2347).abs() < 1e-4);
        assert!((sexagesimal.dec_deg - 38.7837).abs() < 1e-4);

        assert!(coordinate("10", "-91").is_err());
        assert!(coordinate("twelve", "0").is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["atid-tool", "--json", "cone", "10", "-5.5", "1"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Cone { ref dec, .. } if dec == "-5.5"));

        let cli = Cli::try_parse_from(["atid-tool", "box", "10", "20", "5", "-00 30 00"]).unwrap();
        assert!(matches!(cli.command, Commands::Box { ref dec2, .. } if dec2 == "-00 30 00"));

        assert!(Cli::try_parse_from(["atid-tool", "name", "Vega", "--local", "--remote"]).is_err());
    }
}
