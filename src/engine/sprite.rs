// Sprite feedback interface and a simple squash/stretch rig

use glam::Vec2;
use log::trace;

use crate::core::math::approx_equal;

/// Cosmetic sprite cues the controller emits
pub trait SpriteFeedback {
    /// Stretch cue when a jump leaves the ground
    fn jump_squeeze(&mut self);
    /// Squash cue on a plain landing
    fn land_squash(&mut self);
    /// Move the sprite relative to the collision capsule
    fn set_sprite_offset(&mut self, offset: Vec2);
}

/// Scale applied by a jump squeeze (narrow and tall)
const SQUEEZE_SCALE: Vec2 = Vec2::new(0.8, 1.2);
/// Scale applied by a land squash (wide and short)
const SQUASH_SCALE: Vec2 = Vec2::new(1.25, 0.75);
/// How fast the scale relaxes back to 1 (per second)
const RELAX_RATE: f32 = 8.0;

/// Sprite transform that relaxes squash/stretch cues back to rest
#[derive(Debug, Clone)]
pub struct SpriteRig {
    offset: Vec2,
    scale: Vec2,
    squeezes: u32,
    squashes: u32,
}

impl Default for SpriteRig {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteRig {
    pub fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
            squeezes: 0,
            squashes: 0,
        }
    }

    /// Relax the scale toward rest (called every frame)
    pub fn update(&mut self, dt: f32) {
        let t = (RELAX_RATE * dt).min(1.0);
        self.scale += (Vec2::ONE - self.scale) * t;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_at_rest(&self) -> bool {
        approx_equal(self.scale.x, 1.0, 1e-3) && approx_equal(self.scale.y, 1.0, 1e-3)
    }

    /// Number of jump squeezes received
    pub fn squeezes(&self) -> u32 {
        self.squeezes
    }

    /// Number of land squashes received
    pub fn squashes(&self) -> u32 {
        self.squashes
    }
}

impl SpriteFeedback for SpriteRig {
    fn jump_squeeze(&mut self) {
        self.scale = SQUEEZE_SCALE;
        self.squeezes += 1;
    }

    fn land_squash(&mut self) {
        self.scale = SQUASH_SCALE;
        self.squashes += 1;
    }

    fn set_sprite_offset(&mut self, offset: Vec2) {
        trace!("Sprite offset {:?}", offset);
        self.offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cues_are_counted() {
        let mut rig = SpriteRig::new();
        rig.jump_squeeze();
        rig.land_squash();
        rig.land_squash();

        assert_eq!(rig.squeezes(), 1);
        assert_eq!(rig.squashes(), 2);
    }

    #[test]
    fn test_scale_relaxes_to_rest() {
        let mut rig = SpriteRig::new();
        rig.land_squash();
        assert!(!rig.is_at_rest());

        for _ in 0..120 {
            rig.update(1.0 / 60.0);
        }
        assert!(rig.is_at_rest());
    }

    #[test]
    fn test_offset() {
        let mut rig = SpriteRig::new();
        rig.set_sprite_offset(Vec2::new(0.0, -0.5));
        assert_eq!(rig.offset(), Vec2::new(0.0, -0.5));
    }
}
