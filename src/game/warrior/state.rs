// Warrior state: locomotion mode, orthogonal action flags and latent moves

use glam::Vec2;

use crate::core::math::{deadline_reached, lerp_vec2};

/// Direction the character is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Unit forward vector
    pub fn forward(self) -> Vec2 {
        Vec2::new(self.sign(), 0.0)
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }

    /// Facing for a signed axis value; zero has no direction
    pub fn from_axis(value: f32) -> Option<Self> {
        if value > 0.0 {
            Some(Facing::Right)
        } else if value < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    /// Face toward a surface whose normal has the given x component.
    /// A zero component gives no direction.
    pub fn toward_surface(normal_x: f32) -> Option<Self> {
        Self::from_axis(-normal_x)
    }
}

/// Mutually exclusive locomotion modes
///
/// `Grounded` and `Airborne` mirror the movement system. The remaining modes
/// are entered by the controller and own the gravity scale while active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocomotionMode {
    #[default]
    Grounded,
    Airborne,
    /// Sliding down a wall with reduced gravity
    WallSliding,
    /// Hanging from a ledge. `let_go` is set once down input releases the
    /// grip; gravity is back to default but wall contact still counts.
    LedgeHanging { let_go: bool },
    /// Timed crouch-slide
    Sliding { elapsed: f32 },
    /// Timed dash
    Dashing { elapsed: f32 },
}

impl LocomotionMode {
    /// Free modes follow the movement system's ground state
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Grounded | Self::Airborne)
    }

    /// Modes that hold the character against a wall
    pub fn is_on_wall(&self) -> bool {
        matches!(self, Self::WallSliding | Self::LedgeHanging { .. })
    }

    /// Modes that replace the default gravity scale
    pub fn overrides_gravity(&self) -> bool {
        matches!(
            self,
            Self::WallSliding | Self::LedgeHanging { let_go: false }
        )
    }

    /// Mode name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grounded => "grounded",
            Self::Airborne => "airborne",
            Self::WallSliding => "wall_sliding",
            Self::LedgeHanging { .. } => "ledge_hanging",
            Self::Sliding { .. } => "sliding",
            Self::Dashing { .. } => "dashing",
        }
    }
}

/// Flags that compose with any locomotion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFlags {
    pub attacking: bool,
    pub charging: bool,
    pub crouched: bool,
    pub has_move_input: bool,
    pub has_crouch_input: bool,
    /// Run node already requested for the current stretch of move input
    pub run_anim_triggered: bool,
}

/// Why a latent move is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingMoveKind {
    /// Snap onto a grabbed ledge
    LedgeGrab,
    /// Climb from a hang onto the ledge
    ClimbUp,
    /// Drop from a floor edge toward a hang
    ClimbDown,
}

/// Interpolated move toward a target location spanning several frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMove {
    pub kind: PendingMoveKind,
    pub start: Vec2,
    pub target: Vec2,
    pub duration: f32,
    pub elapsed: f32,
}

impl PendingMove {
    pub fn new(kind: PendingMoveKind, start: Vec2, target: Vec2, duration: f32) -> Self {
        Self {
            kind,
            start,
            target,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` and return the interpolated location
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        self.elapsed += dt;
        if self.is_finished() {
            self.target
        } else {
            lerp_vec2(self.start, self.target, self.elapsed / self.duration)
        }
    }

    pub fn is_finished(&self) -> bool {
        deadline_reached(self.elapsed, self.duration)
    }
}

/// Complete mutable state of one character
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterState {
    pub mode: LocomotionMode,
    pub flags: ActionFlags,
    pub facing: Facing,
    pub sprite_offset: Vec2,
    pub pending_move: Option<PendingMove>,
    /// Seconds left before walls can be re-attached after a wall jump
    pub wall_lockout: f32,
}

impl CharacterState {
    pub fn is_attacking(&self) -> bool {
        self.flags.attacking
    }

    pub fn is_charging(&self) -> bool {
        self.flags.charging
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.mode, LocomotionMode::Dashing { .. })
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.mode, LocomotionMode::Sliding { .. })
    }

    pub fn is_crouched(&self) -> bool {
        self.flags.crouched
    }

    pub fn is_wall_sliding(&self) -> bool {
        matches!(self.mode, LocomotionMode::WallSliding)
    }

    pub fn is_ledge_hanging(&self) -> bool {
        matches!(self.mode, LocomotionMode::LedgeHanging { .. })
    }

    pub fn has_move_input(&self) -> bool {
        self.flags.has_move_input
    }

    pub fn has_crouch_input(&self) -> bool {
        self.flags.has_crouch_input
    }

    pub fn run_anim_triggered(&self) -> bool {
        self.flags.run_anim_triggered
    }

    pub fn pending_move_kind(&self) -> Option<PendingMoveKind> {
        self.pending_move.map(|m| m.kind)
    }
}
