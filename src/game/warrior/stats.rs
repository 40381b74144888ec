// Warrior tuning - constants fixed at construction

use glam::Vec2;

use super::ControllerError;

/// Tunable parameters for the warrior controller
#[derive(Debug, Clone, PartialEq)]
pub struct WarriorTuning {
    // Gravity
    /// Gravity scale while moving freely
    pub default_gravity_scale: f32,
    /// Reduced gravity scale while wall-sliding
    pub wall_slide_gravity_scale: f32,

    // Dash
    /// Forward impulse of a dash (units/second of velocity change)
    pub dash_speed: f32,
    /// Seconds before a dash ends on its own
    pub dash_duration: f32,

    // Wall interactions
    /// Launch velocity of a wall jump: x away from the wall, y up
    pub wall_jump_velocity: Vec2,
    /// Seconds after a wall jump during which walls cannot be re-attached
    pub wall_jump_lockout: f32,
    /// Extra radius of the wall contact sweep
    pub wall_slide_tolerance: f32,

    // Slide
    /// Seconds a crouch-slide lasts
    pub slide_duration: f32,

    // Sprite
    /// Sprite offset while standing
    pub default_sprite_offset: Vec2,
    /// Sprite height while crouched; x stays at the default offset
    pub crouched_sprite_height: f32,

    // Capsule
    pub standing_half_height: f32,
    pub crouched_half_height: f32,
    pub capsule_radius: f32,
    /// Length of the overhead wall trace that keeps the character crouched
    pub overhead_check_distance: f32,

    // Latent moves
    /// Climb-up target offset as multiples of (capsule radius, capsule half height)
    pub ledge_climb_offset: Vec2,
    /// Seconds to snap onto a grabbed ledge
    pub ledge_grab_move_time: f32,
    /// Seconds to climb from a hang onto the ledge
    pub ledge_climb_move_time: f32,
    /// Seconds to drop from a floor edge into a hang
    pub ledge_climb_down_move_time: f32,
}

/// The standard warrior tuning
pub const BASE_TUNING: WarriorTuning = WarriorTuning {
    default_gravity_scale: 1.75,
    wall_slide_gravity_scale: 0.15,

    dash_speed: 14.0,
    dash_duration: 0.35,

    wall_jump_velocity: Vec2::new(6.0, 8.0),
    wall_jump_lockout: 0.15,
    wall_slide_tolerance: 0.1,

    slide_duration: 0.5,

    default_sprite_offset: Vec2::new(0.0, -0.15),
    crouched_sprite_height: -0.6,

    standing_half_height: 1.0,
    crouched_half_height: 0.5,
    capsule_radius: 0.4,
    overhead_check_distance: 1.0,

    ledge_climb_offset: Vec2::new(1.5, 2.5),
    ledge_grab_move_time: 0.1,
    ledge_climb_move_time: 0.2,
    ledge_climb_down_move_time: 0.05,
};

impl Default for WarriorTuning {
    fn default() -> Self {
        BASE_TUNING
    }
}

impl WarriorTuning {
    /// Sprite offset while crouched
    pub fn crouched_sprite_offset(&self) -> Vec2 {
        Vec2::new(self.default_sprite_offset.x, self.crouched_sprite_height)
    }

    /// Check every tunable for sane values
    pub fn validate(&self) -> Result<(), ControllerError> {
        let non_negative = [
            ("default_gravity_scale", self.default_gravity_scale),
            ("wall_slide_gravity_scale", self.wall_slide_gravity_scale),
            ("dash_speed", self.dash_speed),
            ("wall_jump_lockout", self.wall_jump_lockout),
            ("wall_slide_tolerance", self.wall_slide_tolerance),
            ("overhead_check_distance", self.overhead_check_distance),
        ];
        let positive = [
            ("dash_duration", self.dash_duration),
            ("slide_duration", self.slide_duration),
            ("standing_half_height", self.standing_half_height),
            ("crouched_half_height", self.crouched_half_height),
            ("capsule_radius", self.capsule_radius),
            ("ledge_grab_move_time", self.ledge_grab_move_time),
            ("ledge_climb_move_time", self.ledge_climb_move_time),
            ("ledge_climb_down_move_time", self.ledge_climb_down_move_time),
        ];
        let finite = [
            ("wall_jump_velocity.x", self.wall_jump_velocity.x),
            ("wall_jump_velocity.y", self.wall_jump_velocity.y),
            ("default_sprite_offset.x", self.default_sprite_offset.x),
            ("default_sprite_offset.y", self.default_sprite_offset.y),
            ("crouched_sprite_height", self.crouched_sprite_height),
            ("ledge_climb_offset.x", self.ledge_climb_offset.x),
            ("ledge_climb_offset.y", self.ledge_climb_offset.y),
        ];

        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ControllerError::InvalidTuning { field, value });
            }
        }
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ControllerError::InvalidTuning { field, value });
            }
        }
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ControllerError::InvalidTuning { field, value });
            }
        }

        if self.crouched_half_height > self.standing_half_height {
            return Err(ControllerError::CrouchTallerThanStanding {
                crouched: self.crouched_half_height,
                standing: self.standing_half_height,
            });
        }

        Ok(())
    }
}
