// Warrior character controller
//
// This module contains everything that drives the warrior:
// - Tuning constants and combo tables
// - World sensing for walls and ledges
// - Combo resolution for combat inputs
// - The character state machine and its animation bridge

pub mod bridge;
pub mod combo;
pub mod controller;
pub mod input;
pub mod sensor;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use bridge::{AnimNode, AnimationBridge, LOCOMOTION_STATE_MACHINE};
pub use combo::{ComboChain, ComboInput, ComboResolver, ComboStep, ComboTable};
pub use controller::{Collaborators, WarriorController};
pub use input::ControllerInput;
pub use sensor::{RapierSensor, Sensor, SensorProbe, SensorSettings, WorldHit};
pub use state::{
    ActionFlags, CharacterState, Facing, LocomotionMode, PendingMove, PendingMoveKind,
};
pub use stats::{WarriorTuning, BASE_TUNING};

/// Configuration errors raised when building a controller
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error("Invalid tuning value for {field}: {value}")]
    InvalidTuning { field: &'static str, value: f32 },

    #[error("Crouched half height {crouched} must be below standing half height {standing}")]
    CrouchTallerThanStanding { crouched: f32, standing: f32 },

    #[error("Combo table has no chains")]
    EmptyComboTable,

    #[error("Combo chain '{0}' has no steps")]
    EmptyComboChain(String),

    #[error("Combo chain '{chain}' step {step} has invalid window {window}")]
    InvalidComboWindow {
        chain: String,
        step: usize,
        window: f32,
    },

    #[error("Combo chain '{chain}' step {step} has an empty node name")]
    EmptyNodeName { chain: String, step: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_error_display() {
        let err = ControllerError::EmptyComboChain("light_string".to_string());
        assert_eq!(err.to_string(), "Combo chain 'light_string' has no steps");

        let err = ControllerError::InvalidTuning {
            field: "dash_speed",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "Invalid tuning value for dash_speed: -1");
    }
}
