//! ---
//! ufs_section: "05-host-interfaces"
//! ufs_subsection: "binary"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Binary entrypoint for the headless dashboard host."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use ufs_common::config::AppConfig;
use ufs_common::logging::init_tracing;
use ufs_common::VERSION;
use ufs_persistence::{LocalStore, ProfileStore};

mod export;
mod onboard;
mod run;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "UrbanFarm simulation dashboard host",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        global = true,
        help = "Override the local record holding the farmer profile"
    )]
    profile_store: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Echo debug logs to stderr and record them in the log file"
    )]
    verbose: bool,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Store the farmer profile required before playback")]
    Onboard(onboard::OnboardArgs),
    #[command(about = "Show the stored farmer profile")]
    Profile,
    #[command(about = "Forget the stored farmer profile")]
    Forget,
    #[command(about = "Play the 24-hour series and download the report")]
    Run(run::RunArgs),
    #[command(about = "Write the generated reading series to a JSON or CSV file")]
    ExportSeries(export::ExportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("UrbanFarm dashboard {VERSION}");
        return Ok(());
    }

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/dashboard.toml"));
    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(path) = cli.profile_store {
        config.profile.store_path = path;
    }
    let _logging = init_tracing("ufs-dashboard", &config.logging, cli.verbose)?;
    tracing::info!(
        config = %loaded
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string()),
        "configuration loaded"
    );

    let profiles = ProfileStore::new(LocalStore::new(&config.profile.store_path));
    let Some(command) = cli.command else {
        println!("{}", onboard::landing_message(&profiles));
        return Ok(());
    };
    match command {
        Commands::Onboard(args) => onboard::save(args, &profiles)?,
        Commands::Profile => onboard::show(&profiles),
        Commands::Forget => onboard::forget(&profiles)?,
        Commands::Run(args) => run::run(args, config, &profiles).await?,
        Commands::ExportSeries(args) => export::run(args, &config)?,
    }
    Ok(())
}
