// World sensing: walls, ledges and snap targets for latent moves
//
// All queries are read-only. A query that hits nothing is `None`/false, never
// an error.

use glam::Vec2;
use log::trace;

use crate::engine::physics::{PhysicsWorld, SurfaceTag};

use super::state::Facing;

/// Character pose a sensor query is made from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProbe {
    /// Capsule centre
    pub location: Vec2,
    pub facing: Facing,
    /// Capsule half height, hemispheres included
    pub half_height: f32,
    pub radius: f32,
}

impl SensorProbe {
    fn feet(&self) -> Vec2 {
        self.location - Vec2::new(0.0, self.half_height)
    }
}

/// A blocking hit reported by a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldHit {
    pub point: Vec2,
    /// Surface normal of whatever was hit; zero when degenerate
    pub normal: Vec2,
    /// `None` for untagged geometry
    pub tag: Option<SurfaceTag>,
}

impl WorldHit {
    pub fn is_wall(&self) -> bool {
        self.tag == Some(SurfaceTag::Wall)
    }
}

/// World queries the controller consumes
pub trait Sensor {
    /// Capsule sweep around the character, `tolerance` wider than its radius.
    /// Returns the first blocking hit, tagged or not.
    fn wall_contact(&self, probe: &SensorProbe, tolerance: f32) -> Option<WorldHit>;

    /// True when a wall directly ahead rises past the sight line (no ledge
    /// gap above it)
    fn wall_blocks_sight_line(&self, probe: &SensorProbe) -> bool;

    /// True when the character stands at a climbable edge it can drop down from
    fn ahead_ledge_check(&self, probe: &SensorProbe) -> bool;

    /// Where to hang from the ledge ahead
    fn ledge_grab_location(&self, probe: &SensorProbe) -> Option<Vec2>;

    /// Where to hang after dropping over the edge ahead
    fn ledge_climb_down_location(&self, probe: &SensorProbe) -> Option<Vec2>;

    /// True when a wall sits within `distance` above the character
    fn wall_above(&self, probe: &SensorProbe, distance: f32) -> bool;
}

/// Geometry of the rapier-backed probes
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings {
    /// Sight line height as a fraction of the half height above the centre
    pub sight_line_height: f32,
    /// How far past the capsule the sight line and ledge probes reach
    pub reach: f32,
    /// How far above the head the ledge-top probe starts
    pub ledge_probe_height: f32,
    /// Drop below the feet that counts as a ledge to climb down
    pub drop_depth: f32,
    /// Gap kept between the sight line and a grabbed ledge top
    pub hang_clearance: f32,
}

/// Default probe geometry
pub const BASE_SENSOR: SensorSettings = SensorSettings {
    sight_line_height: 0.8,
    reach: 0.25,
    ledge_probe_height: 0.5,
    drop_depth: 1.5,
    hang_clearance: 0.05,
};

impl Default for SensorSettings {
    fn default() -> Self {
        BASE_SENSOR
    }
}

/// Sensor backed by `PhysicsWorld` queries
pub struct RapierSensor<'w> {
    world: &'w PhysicsWorld,
    settings: SensorSettings,
}

impl<'w> RapierSensor<'w> {
    pub fn new(world: &'w PhysicsWorld) -> Self {
        Self::with_settings(world, SensorSettings::default())
    }

    pub fn with_settings(world: &'w PhysicsWorld, settings: SensorSettings) -> Self {
        Self { world, settings }
    }

    fn sight_line_origin(&self, probe: &SensorProbe) -> Vec2 {
        probe.location + Vec2::new(0.0, probe.half_height * self.settings.sight_line_height)
    }

    /// Centre height that puts the sight line just above a ledge top
    fn hang_height(&self, probe: &SensorProbe, ledge_top: f32) -> f32 {
        ledge_top - probe.half_height * self.settings.sight_line_height
            + self.settings.hang_clearance
    }

    /// Top of the wall ahead of the character, if any
    fn ledge_top_ahead(&self, probe: &SensorProbe) -> Option<f32> {
        let ahead = probe.facing.sign() * (probe.radius + self.settings.reach);
        let origin = probe.location
            + Vec2::new(ahead, probe.half_height + self.settings.ledge_probe_height);
        let depth = self.settings.ledge_probe_height + probe.half_height * 2.0;

        self.world
            .raycast(origin, Vec2::NEG_Y, depth)
            .filter(|hit| hit.tag == Some(SurfaceTag::Wall))
            .map(|hit| hit.point.y)
    }

    /// Point just ahead of the feet past which a drop is searched for
    fn edge_probe_origin(&self, probe: &SensorProbe) -> Vec2 {
        let ahead = probe.facing.sign() * (probe.radius * 2.0 + self.settings.reach);
        probe.feet() + Vec2::new(ahead, self.settings.hang_clearance)
    }
}

impl Sensor for RapierSensor<'_> {
    fn wall_contact(&self, probe: &SensorProbe, tolerance: f32) -> Option<WorldHit> {
        let hit = self.world.overlap_capsule(
            probe.location,
            probe.half_height,
            probe.radius + tolerance,
        )?;

        trace!("Wall contact {:?} tag {:?}", hit.collider, hit.tag);
        Some(WorldHit {
            point: hit.point,
            normal: hit.normal,
            tag: hit.tag,
        })
    }

    fn wall_blocks_sight_line(&self, probe: &SensorProbe) -> bool {
        let length = probe.radius + self.settings.reach;
        self.world
            .raycast(self.sight_line_origin(probe), probe.facing.forward(), length)
            .is_some_and(|hit| hit.tag == Some(SurfaceTag::Wall))
    }

    fn ahead_ledge_check(&self, probe: &SensorProbe) -> bool {
        let clearance = self.settings.hang_clearance;

        // Must be standing on climbable geometry
        let standing_on_wall = self
            .world
            .raycast(probe.feet() + Vec2::new(0.0, clearance), Vec2::NEG_Y, clearance * 2.0)
            .is_some_and(|hit| hit.tag == Some(SurfaceTag::Wall));
        if !standing_on_wall {
            return false;
        }

        // And nothing to stand on just ahead
        self.world
            .raycast(
                self.edge_probe_origin(probe),
                Vec2::NEG_Y,
                self.settings.drop_depth,
            )
            .is_none()
    }

    fn ledge_grab_location(&self, probe: &SensorProbe) -> Option<Vec2> {
        let top = self.ledge_top_ahead(probe)?;
        Some(Vec2::new(probe.location.x, self.hang_height(probe, top)))
    }

    fn ledge_climb_down_location(&self, probe: &SensorProbe) -> Option<Vec2> {
        // Trace back from past the edge to find the face of the block we stand on
        let drop = Vec2::new(0.0, self.settings.hang_clearance * 2.0);
        let origin = self.edge_probe_origin(probe) - drop;
        let back = -probe.facing.forward();
        let length = probe.radius * 2.0 + self.settings.reach;

        let face = self
            .world
            .raycast(origin, back, length)
            .filter(|hit| hit.tag == Some(SurfaceTag::Wall))?;

        let x = face.point.x + probe.facing.sign() * probe.radius;
        Some(Vec2::new(x, self.hang_height(probe, probe.feet().y)))
    }

    fn wall_above(&self, probe: &SensorProbe, distance: f32) -> bool {
        self.world
            .raycast(probe.location, Vec2::Y, distance)
            .is_some_and(|hit| hit.tag == Some(SurfaceTag::Wall))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Floor with a 2-unit high wall block; its left face at x = 2, top at y = 2
    fn ledge_level() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_block(0.0, -0.5, 20.0, 1.0, Some(SurfaceTag::Platform));
        world.add_block(3.0, 1.0, 2.0, 2.0, Some(SurfaceTag::Wall));
        world
    }

    fn probe_at(location: Vec2, facing: Facing) -> SensorProbe {
        SensorProbe {
            location,
            facing,
            half_height: 1.0,
            radius: 0.4,
        }
    }

    #[test]
    fn test_wall_contact_flags_wall() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        let hit = sensor
            .wall_contact(&probe_at(Vec2::new(1.55, 1.5), Facing::Right), 0.1)
            .expect("touching the wall");
        assert!(hit.is_wall());
    }

    #[test]
    fn test_no_contact_in_open_air() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        assert!(sensor
            .wall_contact(&probe_at(Vec2::new(-3.0, 4.0), Facing::Right), 0.1)
            .is_none());
    }

    #[test]
    fn test_sight_line_blocked_low_on_wall() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        // Sight line at y = 0.8 + 0.3 hits the wall face
        assert!(sensor.wall_blocks_sight_line(&probe_at(Vec2::new(1.55, 0.3), Facing::Right)));
        // Facing away sees nothing
        assert!(!sensor.wall_blocks_sight_line(&probe_at(Vec2::new(1.55, 0.3), Facing::Left)));
    }

    #[test]
    fn test_sight_line_open_above_ledge() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        // Sight line at y = 2.3 passes over the top at y = 2
        let probe = probe_at(Vec2::new(1.55, 1.5), Facing::Right);
        assert!(!sensor.wall_blocks_sight_line(&probe));

        let grab = sensor.ledge_grab_location(&probe).expect("ledge ahead");
        assert_relative_eq!(grab.x, 1.55);
        assert_relative_eq!(grab.y, 2.0 - 0.8 + 0.05, epsilon = 1e-3);
    }

    #[test]
    fn test_wall_above() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        // Standing under nothing
        assert!(!sensor.wall_above(&probe_at(Vec2::new(-3.0, 1.0), Facing::Right), 1.0));

        let mut world = ledge_level();
        world.add_block(-3.0, 1.9, 2.0, 0.5, Some(SurfaceTag::Wall));
        let sensor = RapierSensor::new(&world);
        assert!(sensor.wall_above(&probe_at(Vec2::new(-3.0, 1.0), Facing::Right), 1.0));
    }

    #[test]
    fn test_ahead_ledge_on_top_of_wall_block() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        // Standing on the block top (y = 2) near its left edge, facing the drop
        let probe = probe_at(Vec2::new(2.3, 3.0), Facing::Left);
        assert!(sensor.ahead_ledge_check(&probe));

        let target = sensor
            .ledge_climb_down_location(&probe)
            .expect("edge face found");
        assert_relative_eq!(target.x, 2.0 - 0.4, epsilon = 1e-3);
        assert_relative_eq!(target.y, 2.0 - 0.8 + 0.05, epsilon = 1e-3);
    }

    #[test]
    fn test_no_ahead_ledge_on_plain_floor() {
        let world = ledge_level();
        let sensor = RapierSensor::new(&world);

        // Floor is not climbable
        assert!(!sensor.ahead_ledge_check(&probe_at(Vec2::new(-3.0, 1.0), Facing::Left)));
        // Block top facing into more block
        assert!(!sensor.ahead_ledge_check(&probe_at(Vec2::new(2.3, 3.0), Facing::Right)));
    }
}
