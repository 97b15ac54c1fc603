//! ---
//! ufs_section: "03-persistence-logging"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Local record storage and the onboarding profile."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Persistence for the single local record the dashboard keeps: the farmer's
//! onboarding profile.

use std::path::PathBuf;

/// Result alias used throughout the persistence crate.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Error type for the persistence subsystem.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Wrapper for IO errors encountered while reading/writing the record file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper for JSON serialization issues.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// The record file exists but does not hold a JSON object.
    #[error("local record {0} is not a JSON object")]
    NotAnObject(PathBuf),
    /// A profile failed field validation.
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] profile::ProfileError),
}

pub mod profile;
pub mod store;

pub use profile::{
    option_label, FarmerProfile, Landing, ProfileError, ProfileStore, CROP_OPTIONS,
    EXPERIENCE_OPTIONS, GOAL_OPTIONS, LAYOUT_OPTIONS, PROFILE_KEY,
};
pub use store::LocalStore;
