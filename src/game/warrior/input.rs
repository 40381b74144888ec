// Discrete input events delivered by the host

/// Input events the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerInput {
    /// Horizontal axis in -1..1; zero means the stick/keys were released
    MoveAxis(f32),
    JumpPressed,
    UpPressed,
    DownPressed,
    DownReleased,
    LightAttackPressed,
    HeavyAttackPressed,
    ChargeAttackPressed,
    ChargeAttackReleased,
    DashPressed,
    /// Host signal that the dash animation finished
    StopDashing,
}

impl ControllerInput {
    /// Whether this input feeds the combat systems rather than locomotion
    pub fn is_combat(&self) -> bool {
        matches!(
            self,
            Self::LightAttackPressed
                | Self::HeavyAttackPressed
                | Self::ChargeAttackPressed
                | Self::ChargeAttackReleased
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_inputs() {
        assert!(ControllerInput::LightAttackPressed.is_combat());
        assert!(ControllerInput::ChargeAttackReleased.is_combat());
        assert!(!ControllerInput::DashPressed.is_combat());
        assert!(!ControllerInput::MoveAxis(1.0).is_combat());
    }
}
