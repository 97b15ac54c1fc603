//! ---
//! ufs_section: "05-host-interfaces"
//! ufs_subsection: "binary"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Series export command for the dashboard host."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ufs_common::config::AppConfig;
use ufs_sim::{SeriesFile, SeriesGenerator};

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long, short, value_name = "FILE", help = "Destination (.json or .csv)")]
    output: PathBuf,
    #[arg(long, help = "Generator seed (defaults to the configured seed)")]
    seed: Option<u64>,
    #[arg(long, help = "Number of readings (defaults to the configured count)")]
    samples: Option<usize>,
    #[arg(long, help = "Bundle the seeded alert records (JSON only)")]
    with_alerts: bool,
}

pub fn run(args: ExportArgs, config: &AppConfig) -> Result<()> {
    let mut generator = SeriesGenerator::from_config(&config.simulation);
    if let Some(seed) = args.seed {
        generator = generator.seed(seed);
    }
    if let Some(samples) = args.samples {
        anyhow::ensure!(samples > 0, "--samples must be greater than zero");
        generator = generator.samples(samples);
    }
    let alerts = if args.with_alerts {
        generator.initial_alerts()
    } else {
        Vec::new()
    };
    let series = SeriesFile::new(generator.generate(), alerts);
    series
        .save(&args.output)
        .with_context(|| format!("failed to export series to {}", args.output.display()))?;
    println!(
        "Wrote {} readings to {}",
        series.readings.len(),
        args.output.display()
    );
    Ok(())
}
