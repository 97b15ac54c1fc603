//! ---
//! ufs_section: "03-persistence-logging"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Local record storage and the onboarding profile."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::LocalStore;
use crate::Result;

/// Key under which the profile lives in the local record.
pub const PROFILE_KEY: &str = "farmingSimulationUser";

const MIN_FIELD_CHARS: usize = 2;

/// Field-level validation failures for a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Name shorter than two characters.
    #[error("Name must be at least 2 characters.")]
    NameTooShort,
    /// Location shorter than two characters.
    #[error("Location must be at least 2 characters.")]
    LocationTooShort,
}

/// Onboarding answers collected before the dashboard is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    /// Farmer's display name.
    pub name: String,
    /// Free-text farm location.
    pub location: String,
    /// Crop option value, e.g. `leafyGreens`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    /// Layout option value, e.g. `vertical`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub farm_layout: Option<String>,
    /// Experience option value, e.g. `beginner`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    /// Goal option value, e.g. `energyEfficiency`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Crop choices offered during onboarding as `(value, label)`.
pub const CROP_OPTIONS: [(&str, &str); 6] = [
    ("leafyGreens", "Leafy Greens (Lettuce, Spinach)"),
    ("herbs", "Herbs (Basil, Mint, Cilantro)"),
    ("tomatoes", "Tomatoes"),
    ("peppers", "Peppers"),
    ("strawberries", "Strawberries"),
    ("mixedVegetables", "Mixed Vegetables"),
];

/// Farm layout choices as `(value, label)`.
pub const LAYOUT_OPTIONS: [(&str, &str); 4] = [
    ("vertical", "Vertical Farm"),
    ("horizontal", "Horizontal Beds"),
    ("containerized", "Containerized System"),
    ("aquaponic", "Aquaponic System"),
];

/// Experience choices as `(value, label)`.
pub const EXPERIENCE_OPTIONS: [(&str, &str); 3] = [
    ("beginner", "Beginner"),
    ("intermediate", "Intermediate"),
    ("advanced", "Advanced"),
];

/// Goal choices as `(value, label)`.
pub const GOAL_OPTIONS: [(&str, &str); 5] = [
    ("maximumYield", "Maximum Yield"),
    ("minimumWater", "Minimum Water Usage"),
    ("energyEfficiency", "Energy Efficiency"),
    ("qualityProduce", "Quality Produce"),
    ("educationalDemo", "Educational/Demonstration"),
];

/// Human label for an option value, falling back to the value itself.
pub fn option_label<'a>(options: &[(&'static str, &'static str)], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|(candidate, _)| *candidate == value)
        .map_or(value, |(_, label)| *label)
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

impl FarmerProfile {
    /// Profile with the two required fields and no optional answers.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            crop_type: None,
            farm_layout: None,
            experience_level: None,
            goal: None,
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> std::result::Result<(), ProfileError> {
        if self.name.chars().count() < MIN_FIELD_CHARS {
            return Err(ProfileError::NameTooShort);
        }
        if self.location.chars().count() < MIN_FIELD_CHARS {
            return Err(ProfileError::LocationTooShort);
        }
        Ok(())
    }
}

/// Where the host should land on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    /// A valid profile exists; show the dashboard.
    Dashboard(FarmerProfile),
    /// Collect a profile first.
    Onboarding {
        /// Why no usable profile was found.
        reason: String,
    },
}

/// Reads and writes the onboarding profile in the local record.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    store: LocalStore,
}

impl ProfileStore {
    /// Wrap an existing local record.
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Underlying record.
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Stored profile, if any. Malformed or invalid records are errors.
    pub fn load(&self) -> Result<Option<FarmerProfile>> {
        let Some(profile) = self.store.get_json::<FarmerProfile>(PROFILE_KEY)? else {
            return Ok(None);
        };
        profile.validate()?;
        Ok(Some(profile))
    }

    /// Validate and persist `profile`, replacing any earlier one.
    pub fn save(&self, profile: &FarmerProfile) -> Result<()> {
        profile.validate()?;
        self.store.set_json(PROFILE_KEY, profile)?;
        info!(path = %self.store.path().display(), "profile saved");
        Ok(())
    }

    /// Forget the stored profile. Returns whether one was present.
    pub fn clear(&self) -> Result<bool> {
        self.store.remove(PROFILE_KEY)
    }

    /// Decide between dashboard and onboarding. Never fails: any problem
    /// with the stored record sends the user back to onboarding.
    pub fn landing(&self) -> Landing {
        match self.load() {
            Ok(Some(profile)) => Landing::Dashboard(profile),
            Ok(None) => Landing::Onboarding {
                reason: "no profile stored".to_string(),
            },
            Err(err) => {
                warn!(error = %err, "stored profile unusable");
                Landing::Onboarding {
                    reason: err.to_string(),
                }
            }
        }
    }
}
