//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Manually toggled actuators and the playback start precondition."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::notify::Notification;

/// Farm actuators the operator can switch by hand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Actuator {
    WaterPump,
    GrowLights,
    Ventilation,
    NutrientDispenser,
}

impl Actuator {
    /// Actuators that must be on before playback may start, in the order they
    /// are checked.
    pub const REQUIRED_FOR_START: [Actuator; 3] =
        [Actuator::WaterPump, Actuator::GrowLights, Actuator::Ventilation];

    pub fn display_name(self) -> &'static str {
        match self {
            Actuator::WaterPump => "Water Pump",
            Actuator::GrowLights => "Grow Lights",
            Actuator::Ventilation => "Ventilation",
            Actuator::NutrientDispenser => "Nutrient Dispenser",
        }
    }

    /// Message shown when playback is refused because this actuator is off.
    pub fn start_requirement(self) -> String {
        let subject = match self {
            Actuator::WaterPump => "Water pump",
            Actuator::GrowLights => "Grow lights",
            Actuator::Ventilation => "Ventilation system",
            Actuator::NutrientDispenser => "Nutrient dispenser",
        };
        format!("{subject} must be turned on before starting simulation")
    }

    fn activation_notice(self) -> Option<&'static str> {
        match self {
            Actuator::WaterPump => Some("Closed-loop water recycling system activated"),
            Actuator::GrowLights => Some("Energy-efficient LED lighting system activated"),
            Actuator::Ventilation => Some("Optimized climate control system activated"),
            Actuator::NutrientDispenser => None,
        }
    }

    pub fn all() -> impl Iterator<Item = Actuator> {
        Actuator::iter()
    }
}

/// On/off state of every actuator. All off at session start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActuatorStates {
    pub water_pump: bool,
    pub grow_lights: bool,
    pub ventilation: bool,
    pub nutrient_dispenser: bool,
}

impl ActuatorStates {
    pub fn get(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::WaterPump => self.water_pump,
            Actuator::GrowLights => self.grow_lights,
            Actuator::Ventilation => self.ventilation,
            Actuator::NutrientDispenser => self.nutrient_dispenser,
        }
    }

    fn slot_mut(&mut self, actuator: Actuator) -> &mut bool {
        match actuator {
            Actuator::WaterPump => &mut self.water_pump,
            Actuator::GrowLights => &mut self.grow_lights,
            Actuator::Ventilation => &mut self.ventilation,
            Actuator::NutrientDispenser => &mut self.nutrient_dispenser,
        }
    }
}

/// Holds actuator state and answers whether playback may start.
#[derive(Debug, Default)]
pub struct ActuatorGate {
    states: ActuatorStates,
    pending: Vec<Notification>,
}

impl ActuatorGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_states(states: ActuatorStates) -> Self {
        Self {
            states,
            pending: Vec::new(),
        }
    }

    /// Flip one actuator and return its new value.
    pub fn toggle(&mut self, actuator: Actuator) -> bool {
        let slot = self.states.slot_mut(actuator);
        *slot = !*slot;
        let on = *slot;
        let verb = if on { "activated" } else { "deactivated" };
        self.pending
            .push(Notification::info(format!("{} {verb}", actuator.display_name())));
        if on {
            if let Some(notice) = actuator.activation_notice() {
                self.pending.push(Notification::success(notice));
            }
        }
        debug!(actuator = actuator.as_ref(), on, "actuator toggled");
        on
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.states.get(actuator)
    }

    pub fn can_start(&self) -> bool {
        self.check_start().is_ok()
    }

    /// First required actuator that is still off, if any.
    pub fn check_start(&self) -> Result<(), Actuator> {
        match Actuator::REQUIRED_FOR_START
            .into_iter()
            .find(|actuator| !self.states.get(*actuator))
        {
            Some(missing) => Err(missing),
            None => Ok(()),
        }
    }

    pub fn states(&self) -> ActuatorStates {
        self.states
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
