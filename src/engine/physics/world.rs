use glam::Vec2;
use log::warn;
use rapier2d::parry::query;
use rapier2d::parry::shape::Capsule;
use rapier2d::prelude::*;
use std::collections::HashMap;

use super::body::{presets, ColliderBuilder2D};
use super::collision::{CollisionGroups, SurfaceTag};

/// Result of a line trace against level geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub collider: ColliderHandle,
    /// World-space impact point
    pub point: Vec2,
    /// Distance travelled along the ray before the impact
    pub distance: f32,
    /// Gameplay tag of the hit collider, if it has one
    pub tag: Option<SurfaceTag>,
}

/// Result of an overlap test against level geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapHit {
    pub collider: ColliderHandle,
    /// Contact point on the hit collider
    pub point: Vec2,
    /// Surface normal of the hit collider, pointing toward the query shape.
    /// Zero when the contact could not be resolved.
    pub normal: Vec2,
    pub tag: Option<SurfaceTag>,
}

/// Static level world used for controller world queries
///
/// Only fixed geometry lives here; character motion is integrated by the
/// movement system and never inserted as a rigid body.
pub struct PhysicsWorld {
    /// Query pipeline for raycasts and shape overlaps
    query_pipeline: QueryPipeline,

    /// Fixed bodies the block colliders hang off
    rigid_body_set: RigidBodySet,

    collider_set: ColliderSet,

    /// Gameplay tags keyed by collider
    collider_tags: HashMap<ColliderHandle, SurfaceTag>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            collider_tags: HashMap::new(),
        }
    }

    /// Rebuild the query structures so newly added geometry is visible
    fn refresh_queries(&mut self) {
        self.query_pipeline
            .update(&self.rigid_body_set, &self.collider_set);
    }

    /// Add an axis-aligned block of level geometry centred at (x, y)
    ///
    /// Untagged blocks still block queries but never count as walls.
    pub fn add_block(
        &mut self,
        x: Real,
        y: Real,
        width: Real,
        height: Real,
        tag: Option<SurfaceTag>,
    ) -> ColliderHandle {
        let body_handle = self.rigid_body_set.insert(presets::block_body(x, y));
        let collider = match tag {
            Some(tag) => presets::block_collider(width, height, tag),
            None => ColliderBuilder2D::box_shape(width / 2.0, height / 2.0).build(),
        };
        let handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        if let Some(tag) = tag {
            self.collider_tags.insert(handle, tag);
        }

        self.refresh_queries();
        handle
    }

    /// Get the gameplay tag of a collider
    pub fn collider_tag(&self, handle: ColliderHandle) -> Option<SurfaceTag> {
        self.collider_tags.get(&handle).copied()
    }

    /// Number of colliders in the level
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    fn probe_filter() -> QueryFilter<'static> {
        QueryFilter::default().groups(CollisionGroups::Probe.to_interaction_groups())
    }

    /// Cast a ray and return the first hit
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: Real) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        let ray = Ray::new(point![origin.x, origin.y], vector![direction.x, direction.y]);
        let (collider, distance) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            Self::probe_filter(),
        )?;

        Some(RayHit {
            collider,
            point: origin + direction * distance,
            distance,
            tag: self.collider_tag(collider),
        })
    }

    /// Test a vertical capsule for overlap with level geometry
    ///
    /// `half_height` is the full half height of the capsule, hemispheres
    /// included.
    pub fn overlap_capsule(
        &self,
        center: Vec2,
        half_height: Real,
        radius: Real,
    ) -> Option<OverlapHit> {
        let probe = Capsule::new_y((half_height - radius).max(0.0), radius);
        let probe_pos = Isometry::translation(center.x, center.y);

        let collider = self.query_pipeline.intersection_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &probe_pos,
            &probe,
            Self::probe_filter(),
        )?;

        let (point, normal) = self
            .collider_set
            .get(collider)
            .and_then(|hit| {
                query::contact(&probe_pos, &probe, hit.position(), hit.shape(), 0.0)
                    .ok()
                    .flatten()
            })
            .map(|contact| {
                (
                    Vec2::new(contact.point2.x, contact.point2.y),
                    Vec2::new(contact.normal2.x, contact.normal2.y),
                )
            })
            .unwrap_or_else(|| {
                warn!("Overlap with {:?} produced no contact manifold", collider);
                (center, Vec2::ZERO)
            });

        Some(OverlapHit {
            collider,
            point,
            normal,
            tag: self.collider_tag(collider),
        })
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn level() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        // Floor spanning x in [-10, 10], top at y = 0
        world.add_block(0.0, -0.5, 20.0, 1.0, Some(SurfaceTag::Platform));
        // Wall with its left face at x = 3
        world.add_block(3.5, 2.0, 1.0, 4.0, Some(SurfaceTag::Wall));
        world
    }

    #[test]
    fn test_raycast_hits_floor() {
        let world = level();
        let hit = world
            .raycast(Vec2::new(0.0, 2.0), Vec2::new(0.0, -1.0), 5.0)
            .expect("floor should be hit");

        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-3);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-3);
        assert_eq!(hit.tag, Some(SurfaceTag::Platform));
    }

    #[test]
    fn test_raycast_miss() {
        let world = level();
        assert!(world
            .raycast(Vec2::new(0.0, 2.0), Vec2::new(0.0, 1.0), 5.0)
            .is_none());
    }

    #[test]
    fn test_raycast_zero_direction() {
        let world = level();
        assert!(world.raycast(Vec2::new(0.0, 2.0), Vec2::ZERO, 5.0).is_none());
    }

    #[test]
    fn test_overlap_reports_wall_normal() {
        let world = level();
        let hit = world
            .overlap_capsule(Vec2::new(2.7, 2.0), 1.0, 0.4)
            .expect("capsule touches the wall");

        assert_eq!(hit.tag, Some(SurfaceTag::Wall));
        assert!(hit.normal.x < 0.0, "wall face points back toward -x");
    }

    #[test]
    fn test_untagged_block_has_no_tag() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_block(0.0, 0.0, 1.0, 1.0, None);

        assert_eq!(world.collider_tag(handle), None);
        let hit = world
            .raycast(Vec2::new(-2.0, 0.0), Vec2::X, 5.0)
            .expect("untagged geometry still blocks");
        assert_eq!(hit.tag, None);
    }
}
