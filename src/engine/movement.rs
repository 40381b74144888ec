// Movement system interface and a reference kinematic integrator
//
// The controller never integrates motion itself. It issues requests through
// `MovementSystem` and reacts to the `MovementEvent`s the integrator reports
// after each step (jumped, landed, walked off a ledge).

use glam::Vec2;
use log::trace;

use crate::core::math::move_toward;
use crate::engine::physics::PhysicsWorld;

/// Movement primitives the controller drives
pub trait MovementSystem {
    /// Queue movement input along `direction`, scaled by `scale` (-1..1)
    fn add_movement_input(&mut self, direction: Vec2, scale: f32);
    /// Apply an impulse. With `velocity_change` the impulse is added
    /// straight to the velocity, ignoring mass.
    fn add_impulse(&mut self, impulse: Vec2, velocity_change: bool);
    /// Replace the current velocity and put the character in the air
    fn launch(&mut self, velocity: Vec2);
    /// Request a jump; the integrator reports `MovementEvent::Jumped` when it happens
    fn jump(&mut self);
    /// Zero the velocity and drop any queued input
    fn stop_movement_immediately(&mut self);
    fn set_gravity_scale(&mut self, scale: f32);
    fn gravity_scale(&self) -> f32;
    fn set_can_walk_off_ledges(&mut self, can_walk_off: bool);
    fn can_walk_off_ledges(&self) -> bool;
    /// Resize the collision capsule, keeping the feet in place while grounded
    fn set_capsule_half_height(&mut self, half_height: f32);
    fn capsule_half_height(&self) -> f32;
    fn is_moving_on_ground(&self) -> bool;
    fn is_falling(&self) -> bool {
        !self.is_moving_on_ground()
    }
    fn location(&self) -> Vec2;
    fn set_location(&mut self, location: Vec2);
    fn velocity(&self) -> Vec2;
}

/// Callbacks the integrator raises for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementEvent {
    /// A requested jump left the ground
    Jumped,
    /// The character touched down after being airborne
    Landed,
    /// The character walked off the edge of its floor
    WalkedOffLedge,
}

/// Tunables for the reference integrator
#[derive(Debug, Clone)]
pub struct MovementParams {
    /// Maximum ground speed (units/second)
    pub max_walk_speed: f32,
    /// Maximum ground speed while the capsule is crouched
    pub max_walk_speed_crouched: f32,
    /// Air control multiplier (0.0 = no air control, 1.0 = full control)
    pub air_control: f32,
    /// Vertical speed given by a jump
    pub jump_velocity: f32,
    /// Gravity acceleration before scaling (negative is down)
    pub gravity: f32,
    /// Ground deceleration when there is no input
    pub braking_deceleration: f32,
    /// Standing capsule half height
    pub standing_half_height: f32,
    pub capsule_radius: f32,
    /// How far below the feet a floor still counts as "under" the character
    pub floor_snap_distance: f32,
}

/// Default integrator tuning
pub const BASE_MOVEMENT: MovementParams = MovementParams {
    max_walk_speed: 6.0,
    max_walk_speed_crouched: 6.0,
    air_control: 0.9,
    jump_velocity: 8.0,
    gravity: -9.81,
    braking_deceleration: 40.0,
    standing_half_height: 1.0,
    capsule_radius: 0.4,
    floor_snap_distance: 0.05,
};

impl Default for MovementParams {
    fn default() -> Self {
        BASE_MOVEMENT
    }
}

/// Small kinematic integrator backed by level queries
///
/// Good enough to drive the controller in the demo and integration tests; it
/// resolves floors, ceilings and walls with line traces against the level.
#[derive(Debug, Clone)]
pub struct CharacterMovement {
    params: MovementParams,
    location: Vec2,
    velocity: Vec2,
    gravity_scale: f32,
    can_walk_off_ledges: bool,
    grounded: bool,
    half_height: f32,
    pending_input: f32,
    pending_jump: bool,
}

impl CharacterMovement {
    /// Create an integrator with the character's feet resting at `location`
    /// minus the standing half height
    pub fn new(params: MovementParams, location: Vec2) -> Self {
        let half_height = params.standing_half_height;
        Self {
            params,
            location,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            can_walk_off_ledges: true,
            grounded: false,
            half_height,
            pending_input: 0.0,
            pending_jump: false,
        }
    }

    pub fn params(&self) -> &MovementParams {
        &self.params
    }

    fn is_crouched(&self) -> bool {
        self.half_height < self.params.standing_half_height
    }

    fn feet(&self) -> Vec2 {
        self.location - Vec2::new(0.0, self.half_height)
    }

    fn floor_under(&self, world: &PhysicsWorld, x: f32) -> Option<f32> {
        let probe_start = Vec2::new(x, self.feet().y + self.params.floor_snap_distance);
        world
            .raycast(
                probe_start,
                Vec2::NEG_Y,
                self.params.floor_snap_distance * 2.0,
            )
            .map(|hit| hit.point.y)
    }

    /// Advance the simulation by `dt` seconds and report what happened
    pub fn step(&mut self, dt: f32, world: &PhysicsWorld) -> Vec<MovementEvent> {
        let mut events = Vec::new();

        if self.grounded && self.floor_under(world, self.location.x).is_none() {
            // Floor vanished under us (capsule resize, removed geometry)
            self.grounded = false;
            events.push(MovementEvent::WalkedOffLedge);
        } else if !self.grounded && self.velocity.y <= 0.0 {
            if let Some(floor_y) = self.floor_under(world, self.location.x) {
                self.location.y = floor_y + self.half_height;
                self.velocity.y = 0.0;
                self.grounded = true;
                events.push(MovementEvent::Landed);
            }
        }

        // Horizontal control
        let input = self.pending_input.clamp(-1.0, 1.0);
        self.pending_input = 0.0;
        let max_speed = if self.is_crouched() {
            self.params.max_walk_speed_crouched
        } else {
            self.params.max_walk_speed
        };

        if input != 0.0 {
            let target = input * max_speed;
            if self.grounded {
                self.velocity.x = target;
            } else {
                let blend = self.params.air_control;
                self.velocity.x += (target - self.velocity.x) * blend;
            }
        } else if self.grounded {
            self.velocity.x = move_toward(
                self.velocity.x,
                0.0,
                self.params.braking_deceleration * dt,
            );
        }

        // Jump
        if self.pending_jump {
            self.pending_jump = false;
            if self.grounded {
                self.velocity.y = self.params.jump_velocity;
                self.grounded = false;
                events.push(MovementEvent::Jumped);
            }
        }

        if self.grounded {
            self.velocity.y = 0.0;
        } else {
            self.velocity.y += self.params.gravity * self.gravity_scale * dt;
        }

        self.integrate_horizontal(dt, world);

        if self.grounded {
            if self.floor_under(world, self.location.x).is_none() {
                if self.can_walk_off_ledges {
                    self.grounded = false;
                    events.push(MovementEvent::WalkedOffLedge);
                } else {
                    // Step back onto the floor we came from
                    self.location.x -= self.velocity.x * dt;
                    self.velocity.x = 0.0;
                }
            }
        } else if self.integrate_vertical(dt, world) {
            events.push(MovementEvent::Landed);
        }

        trace!(
            "Movement step at {:?} vel {:?} grounded {}",
            self.location,
            self.velocity,
            self.grounded
        );

        events
    }

    fn integrate_horizontal(&mut self, dt: f32, world: &PhysicsWorld) {
        let dx = self.velocity.x * dt;
        if dx == 0.0 {
            return;
        }

        let direction = Vec2::new(dx.signum(), 0.0);
        let reach = self.params.capsule_radius + dx.abs();
        let blocked = world
            .raycast(self.location, direction, reach)
            .map(|hit| hit.distance - self.params.capsule_radius);

        match blocked {
            Some(free) => {
                self.location.x += direction.x * free.max(0.0);
                self.velocity.x = 0.0;
            }
            None => self.location.x += dx,
        }
    }

    /// Returns true when the character landed during this step
    fn integrate_vertical(&mut self, dt: f32, world: &PhysicsWorld) -> bool {
        let dy = self.velocity.y * dt;
        if dy == 0.0 {
            return false;
        }

        let direction = Vec2::new(0.0, dy.signum());
        let reach = self.half_height + dy.abs();

        match world.raycast(self.location, direction, reach) {
            Some(hit) if dy < 0.0 => {
                self.location.y = hit.point.y + self.half_height;
                self.velocity.y = 0.0;
                self.grounded = true;
                true
            }
            Some(hit) => {
                self.location.y = hit.point.y - self.half_height;
                self.velocity.y = 0.0;
                false
            }
            None => {
                self.location.y += dy;
                false
            }
        }
    }
}

impl MovementSystem for CharacterMovement {
    fn add_movement_input(&mut self, direction: Vec2, scale: f32) {
        self.pending_input += direction.x * scale;
    }

    fn add_impulse(&mut self, impulse: Vec2, velocity_change: bool) {
        // Unit mass, so both modes reduce to a velocity change
        let _ = velocity_change;
        self.velocity += impulse;
    }

    fn launch(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.grounded = false;
    }

    fn jump(&mut self) {
        self.pending_jump = true;
    }

    fn stop_movement_immediately(&mut self) {
        self.velocity = Vec2::ZERO;
        self.pending_input = 0.0;
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_can_walk_off_ledges(&mut self, can_walk_off: bool) {
        self.can_walk_off_ledges = can_walk_off;
    }

    fn can_walk_off_ledges(&self) -> bool {
        self.can_walk_off_ledges
    }

    fn set_capsule_half_height(&mut self, half_height: f32) {
        if self.grounded {
            self.location.y += half_height - self.half_height;
        }
        self.half_height = half_height;
    }

    fn capsule_half_height(&self) -> f32 {
        self.half_height
    }

    fn is_moving_on_ground(&self) -> bool {
        self.grounded
    }

    fn location(&self) -> Vec2 {
        self.location
    }

    fn set_location(&mut self, location: Vec2) {
        self.location = location;
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::SurfaceTag;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn flat_level() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        // Floor spanning x in [-5, 5], top at y = 0
        world.add_block(0.0, -0.5, 10.0, 1.0, Some(SurfaceTag::Platform));
        world
    }

    fn settle(movement: &mut CharacterMovement, world: &PhysicsWorld) -> Vec<MovementEvent> {
        let mut events = Vec::new();
        for _ in 0..120 {
            events.extend(movement.step(DT, world));
        }
        events
    }

    #[test]
    fn test_falls_and_lands() {
        let world = flat_level();
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(0.0, 3.0));

        let events = settle(&mut movement, &world);

        assert!(movement.is_moving_on_ground());
        assert!(events.contains(&MovementEvent::Landed));
        assert_relative_eq!(movement.location().y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_jump_reports_event() {
        let world = flat_level();
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(0.0, 1.0));
        settle(&mut movement, &world);

        movement.jump();
        let events = movement.step(DT, &world);

        assert_eq!(events, vec![MovementEvent::Jumped]);
        assert!(movement.is_falling());
        assert!(movement.velocity().y > 0.0);
    }

    #[test]
    fn test_walks_off_ledge() {
        let world = flat_level();
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(4.5, 1.0));
        settle(&mut movement, &world);

        let mut events = Vec::new();
        for _ in 0..30 {
            movement.add_movement_input(Vec2::X, 1.0);
            events.extend(movement.step(DT, &world));
        }

        assert!(events.contains(&MovementEvent::WalkedOffLedge));
    }

    #[test]
    fn test_ledge_guard_keeps_character_on_floor() {
        let world = flat_level();
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(4.5, 1.0));
        settle(&mut movement, &world);
        movement.set_can_walk_off_ledges(false);

        for _ in 0..30 {
            movement.add_movement_input(Vec2::X, 1.0);
            let events = movement.step(DT, &world);
            assert!(!events.contains(&MovementEvent::WalkedOffLedge));
        }
        assert!(movement.is_moving_on_ground());
    }

    #[test]
    fn test_zero_gravity_holds_position() {
        let world = flat_level();
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(0.0, 3.0));
        movement.set_gravity_scale(0.0);

        for _ in 0..30 {
            movement.step(DT, &world);
        }

        assert_relative_eq!(movement.location().y, 3.0);
    }

    #[test]
    fn test_crouch_keeps_feet_planted() {
        let world = flat_level();
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(0.0, 1.0));
        settle(&mut movement, &world);

        movement.set_capsule_half_height(0.5);

        assert_relative_eq!(movement.location().y, 0.5, epsilon = 1e-3);
        assert!(movement.step(DT, &world).is_empty());
        assert!(movement.is_moving_on_ground());
    }

    #[test]
    fn test_wall_blocks_horizontal_motion() {
        let mut world = flat_level();
        // Wall face at x = 2
        world.add_block(2.5, 2.0, 1.0, 4.0, Some(SurfaceTag::Wall));
        let mut movement = CharacterMovement::new(MovementParams::default(), Vec2::new(0.0, 1.0));
        settle(&mut movement, &world);

        for _ in 0..120 {
            movement.add_movement_input(Vec2::X, 1.0);
            movement.step(DT, &world);
        }

        assert!(movement.location().x <= 2.0 - movement.params().capsule_radius + 1e-3);
    }
}
