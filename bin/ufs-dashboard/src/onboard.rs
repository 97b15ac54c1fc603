//! ---
//! ufs_section: "05-host-interfaces"
//! ufs_subsection: "binary"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Onboarding profile commands for the dashboard host."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::Args;
use ufs_persistence::{
    option_label, FarmerProfile, Landing, ProfileStore, CROP_OPTIONS, EXPERIENCE_OPTIONS,
    GOAL_OPTIONS, LAYOUT_OPTIONS,
};

pub const ONBOARDING_HINT: &str =
    "Run `ufs-dashboard onboard --name <NAME> --location <LOCATION>` to set up your farm.";

#[derive(Debug, Args)]
pub struct OnboardArgs {
    #[arg(long, help = "Your name (at least 2 characters)")]
    name: String,
    #[arg(long, help = "Farm location (at least 2 characters)")]
    location: String,
    #[arg(long, value_parser = PossibleValuesParser::new(CROP_OPTIONS.map(|(value, _)| value)))]
    crop_type: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(LAYOUT_OPTIONS.map(|(value, _)| value)))]
    farm_layout: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(EXPERIENCE_OPTIONS.map(|(value, _)| value)))]
    experience_level: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(GOAL_OPTIONS.map(|(value, _)| value)))]
    goal: Option<String>,
}

impl From<OnboardArgs> for FarmerProfile {
    fn from(args: OnboardArgs) -> Self {
        FarmerProfile {
            name: args.name.trim().to_string(),
            location: args.location.trim().to_string(),
            crop_type: args.crop_type,
            farm_layout: args.farm_layout,
            experience_level: args.experience_level,
            goal: args.goal,
        }
    }
}

pub fn save(args: OnboardArgs, profiles: &ProfileStore) -> Result<()> {
    let profile = FarmerProfile::from(args);
    profiles.save(&profile).with_context(|| {
        format!(
            "unable to save profile to {}",
            profiles.store().path().display()
        )
    })?;
    println!("Welcome, {}! Your farm profile has been saved.", profile.name);
    Ok(())
}

pub fn show(profiles: &ProfileStore) {
    match profiles.landing() {
        Landing::Dashboard(profile) => {
            println!("Name: {}", profile.name);
            println!("Location: {}", profile.location);
            let optional = [
                ("Crop", &profile.crop_type, &CROP_OPTIONS[..]),
                ("Layout", &profile.farm_layout, &LAYOUT_OPTIONS[..]),
                ("Experience", &profile.experience_level, &EXPERIENCE_OPTIONS[..]),
                ("Goal", &profile.goal, &GOAL_OPTIONS[..]),
            ];
            for (label, value, options) in optional {
                if let Some(value) = value {
                    println!("{label}: {}", option_label(options, value));
                }
            }
        }
        Landing::Onboarding { reason } => {
            println!("No farmer profile ({reason}). {ONBOARDING_HINT}");
        }
    }
}

pub fn forget(profiles: &ProfileStore) -> Result<()> {
    if profiles.clear()? {
        println!("Farmer profile removed.");
    } else {
        println!("No farmer profile stored.");
    }
    Ok(())
}

/// What the host shows when started without a command.
pub fn landing_message(profiles: &ProfileStore) -> String {
    match profiles.landing() {
        Landing::Dashboard(profile) => format!(
            "Welcome back, {} from {}. Use `ufs-dashboard run` to start the simulation.",
            profile.name, profile.location
        ),
        Landing::Onboarding { .. } => format!("Welcome to the UrbanFarm simulation. {ONBOARDING_HINT}"),
    }
}
