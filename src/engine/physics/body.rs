use super::collision::{CollisionGroups, SurfaceTag};
use rapier2d::prelude::*;

pub use rapier2d::prelude::ColliderHandle;

/// Builder for the static bodies that anchor level geometry
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
}

impl BodyBuilder {
    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Isometry::identity(),
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real) -> Self {
        self.position = Isometry::translation(x, y);
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .can_sleep(true)
            .build()
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder2D {
    shape: SharedShape,
    collision_groups: CollisionGroups,
    friction: Real,
}

impl ColliderBuilder2D {
    /// Create a box-shaped collider
    pub fn box_shape(half_width: Real, half_height: Real) -> Self {
        Self {
            shape: SharedShape::cuboid(half_width, half_height),
            collision_groups: CollisionGroups::Default,
            friction: 0.5,
        }
    }

    /// Set the collision groups for filtering
    pub fn collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        rapier2d::prelude::ColliderBuilder::new(self.shape)
            .collision_groups(self.collision_groups.to_interaction_groups())
            .friction(self.friction)
            .build()
    }
}

/// Common level-geometry configurations
pub mod presets {
    use super::*;

    /// Create a fixed body centred at (x, y)
    pub fn block_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_fixed().position(x, y).build()
    }

    /// Create a box collider for a tagged block of level geometry
    pub fn block_collider(width: Real, height: Real, tag: SurfaceTag) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .collision_groups(tag.collision_group())
            .friction(0.3)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_builder_fixed() {
        let body = BodyBuilder::new_fixed().position(10.0, 20.0).build();

        assert_eq!(body.body_type(), RigidBodyType::Fixed);
        assert_eq!(body.translation().x, 10.0);
        assert_eq!(body.translation().y, 20.0);
    }

    #[test]
    fn test_collider_builder_box() {
        let collider = ColliderBuilder2D::box_shape(1.0, 2.0).friction(0.3).build();

        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.3);
    }

    #[test]
    fn test_block_preset_uses_tag_group() {
        let collider = presets::block_collider(2.0, 4.0, SurfaceTag::Wall);
        let expected = CollisionGroups::Wall.to_interaction_groups();

        assert_eq!(collider.collision_groups(), expected);
    }
}
