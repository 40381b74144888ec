// Warrior character state machine
//
// Owns the character's state and reacts to input events, movement events and
// per-frame ticks. Collaborators are lent for the duration of each call.

use glam::Vec2;
use log::{debug, trace};

use crate::core::math::deadline_reached;
use crate::engine::animation::AnimationGraph;
use crate::engine::movement::{MovementEvent, MovementSystem};
use crate::engine::sprite::SpriteFeedback;

use super::bridge::{AnimNode, AnimationBridge};
use super::combo::{ComboInput, ComboResolver, ComboStep, ComboTable};
use super::input::ControllerInput;
use super::sensor::{Sensor, SensorProbe};
use super::state::{CharacterState, Facing, LocomotionMode, PendingMove, PendingMoveKind};
use super::stats::{WarriorTuning, BASE_TUNING};
use super::ControllerError;

/// Everything the controller drives or queries, borrowed per call
pub struct Collaborators<'a> {
    pub movement: &'a mut dyn MovementSystem,
    pub sensor: &'a dyn Sensor,
    pub animation: &'a mut dyn AnimationGraph,
    pub sprite: &'a mut dyn SpriteFeedback,
}

/// State machine for one warrior character
#[derive(Debug, Clone)]
pub struct WarriorController {
    tuning: WarriorTuning,
    state: CharacterState,
    combo: ComboResolver,
    bridge: AnimationBridge,
}

impl Default for WarriorController {
    fn default() -> Self {
        Self::standard()
    }
}

impl WarriorController {
    /// Create a controller after validating its tuning and combo table
    pub fn new(tuning: WarriorTuning, combo_table: ComboTable) -> Result<Self, ControllerError> {
        tuning.validate()?;
        combo_table.validate()?;
        Ok(Self::build(tuning, combo_table))
    }

    /// Controller with the standard tuning and combo table
    pub fn standard() -> Self {
        Self::build(BASE_TUNING, ComboTable::standard())
    }

    fn build(tuning: WarriorTuning, combo_table: ComboTable) -> Self {
        let state = CharacterState {
            sprite_offset: tuning.default_sprite_offset,
            ..CharacterState::default()
        };

        Self {
            tuning,
            state,
            combo: ComboResolver::new(combo_table),
            bridge: AnimationBridge::default(),
        }
    }

    /// Replace the animation bridge (custom state machine or node names)
    pub fn with_bridge(mut self, bridge: AnimationBridge) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn tuning(&self) -> &WarriorTuning {
        &self.tuning
    }

    pub fn combo(&self) -> &ComboResolver {
        &self.combo
    }

    pub fn bridge(&self) -> &AnimationBridge {
        &self.bridge
    }

    pub fn facing(&self) -> Facing {
        self.state.facing
    }

    pub fn mode(&self) -> LocomotionMode {
        self.state.mode
    }

    /// Put the collaborators into their initial configuration
    pub fn begin_play(&mut self, ctx: &mut Collaborators<'_>) {
        ctx.movement
            .set_gravity_scale(self.tuning.default_gravity_scale);
        ctx.movement
            .set_capsule_half_height(self.tuning.standing_half_height);
        ctx.movement.set_can_walk_off_ledges(true);
        self.set_sprite_offset(ctx, self.tuning.default_sprite_offset);

        self.state.mode = Self::free_mode(ctx);
        self.play(ctx, AnimNode::Idle);
        debug!("Warrior ready ({})", self.state.mode.name());
    }

    // ---- dispatch ----

    /// Route an input event to its handler
    pub fn handle_input(&mut self, input: ControllerInput, ctx: &mut Collaborators<'_>) {
        trace!("Input {:?}", input);
        match input {
            ControllerInput::MoveAxis(value) => self.on_move_axis(value, ctx),
            ControllerInput::JumpPressed => self.on_jump_input(ctx),
            ControllerInput::UpPressed => self.on_up_input(ctx),
            ControllerInput::DownPressed => self.on_down_pressed(ctx),
            ControllerInput::DownReleased => self.on_down_released(ctx),
            ControllerInput::LightAttackPressed => self.on_light_attack(ctx),
            ControllerInput::HeavyAttackPressed => self.on_heavy_attack(ctx),
            ControllerInput::ChargeAttackPressed => self.on_charge_attack(ctx),
            ControllerInput::ChargeAttackReleased => self.on_charge_attack_released(ctx),
            ControllerInput::DashPressed => self.on_dash(ctx),
            ControllerInput::StopDashing => self.stop_dashing(ctx),
        }
    }

    /// Route a movement callback to its handler
    pub fn handle_movement_event(&mut self, event: MovementEvent, ctx: &mut Collaborators<'_>) {
        match event {
            MovementEvent::Jumped => self.on_jumped(ctx),
            MovementEvent::Landed => self.on_landed(ctx),
            MovementEvent::WalkedOffLedge => self.on_walking_off_ledge(ctx),
        }
    }

    // ---- per-frame update ----

    /// Advance timers, latent moves and wall detection by `dt` seconds
    pub fn tick(&mut self, dt: f32, ctx: &mut Collaborators<'_>) {
        self.combo.tick(dt);
        if self.state.wall_lockout > 0.0 {
            self.state.wall_lockout = (self.state.wall_lockout - dt).max(0.0);
        }

        // Dash and slide run on their own clocks, latent moves included
        self.advance_dash(dt, ctx);
        self.advance_slide(dt, ctx);

        // A latent move owns the character's position for the frame
        if self.advance_pending_move(dt, ctx) {
            return;
        }

        if self.state.mode.is_free() {
            self.state.mode = Self::free_mode(ctx);
        }

        if self.state.is_sliding() {
            return;
        }

        let falling = ctx.movement.is_falling();
        let on_wall = self.state.mode.is_on_wall();
        if !falling && !on_wall {
            return;
        }
        if self.state.wall_lockout > 0.0 {
            return;
        }

        let touching_wall = self.wall_slide_check(ctx);

        if falling && touching_wall {
            let probe = self.probe(ctx);
            if ctx.sensor.wall_blocks_sight_line(&probe) {
                self.wall_slide(ctx);
            } else {
                self.ledge_grab(ctx);
            }
            return;
        }

        if on_wall && !touching_wall {
            self.release_wall(ctx);
        }
    }

    fn advance_pending_move(&mut self, dt: f32, ctx: &mut Collaborators<'_>) -> bool {
        let Some(mut pending) = self.state.pending_move else {
            return false;
        };

        let still_valid = match pending.kind {
            PendingMoveKind::LedgeGrab | PendingMoveKind::ClimbUp => self.state.is_ledge_hanging(),
            PendingMoveKind::ClimbDown => true,
        };
        if !still_valid {
            trace!("Dropping stale {:?} move", pending.kind);
            self.state.pending_move = None;
            return false;
        }

        let location = pending.advance(dt);
        ctx.movement.set_location(location);

        if !pending.is_finished() {
            self.state.pending_move = Some(pending);
            return true;
        }

        self.state.pending_move = None;
        debug!("{:?} move reached {:?}", pending.kind, pending.target);

        if pending.kind == PendingMoveKind::ClimbUp {
            let mode = Self::free_mode(ctx);
            self.set_mode(mode, ctx);
            ctx.movement
                .set_gravity_scale(self.tuning.default_gravity_scale);
        }

        true
    }

    fn advance_dash(&mut self, dt: f32, ctx: &mut Collaborators<'_>) {
        if let LocomotionMode::Dashing { elapsed } = self.state.mode {
            let elapsed = elapsed + dt;
            if deadline_reached(elapsed, self.tuning.dash_duration) {
                self.stop_dashing(ctx);
            } else {
                self.state.mode = LocomotionMode::Dashing { elapsed };
            }
        }
    }

    fn advance_slide(&mut self, dt: f32, ctx: &mut Collaborators<'_>) {
        let LocomotionMode::Sliding { elapsed } = self.state.mode else {
            return;
        };

        let elapsed = elapsed + dt;
        if deadline_reached(elapsed, self.tuning.slide_duration) {
            self.stop_sliding(ctx);
            return;
        }

        self.state.mode = LocomotionMode::Sliding { elapsed };
        if self.state.pending_move.is_none() {
            ctx.movement
                .add_movement_input(self.state.facing.forward(), 1.0);
        }
    }

    // ---- wall interactions ----

    /// Sweep for wall contact. Turns the character toward whatever it touches
    /// and reports whether that surface is a wall.
    fn wall_slide_check(&mut self, ctx: &mut Collaborators<'_>) -> bool {
        let probe = self.probe(ctx);
        let Some(hit) = ctx
            .sensor
            .wall_contact(&probe, self.tuning.wall_slide_tolerance)
        else {
            return false;
        };

        if let Some(facing) = Facing::toward_surface(hit.normal.x) {
            self.state.facing = facing;
        }

        if !hit.is_wall() {
            trace!("Contact at {:?} is not a wall", hit.point);
        }
        hit.is_wall()
    }

    fn wall_slide(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.is_wall_sliding() {
            return;
        }

        self.state.pending_move = None;
        self.set_mode(LocomotionMode::WallSliding, ctx);
        ctx.movement.stop_movement_immediately();
        ctx.movement
            .set_gravity_scale(self.tuning.wall_slide_gravity_scale);
        self.play(ctx, AnimNode::WallSlide);
    }

    fn ledge_grab(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.is_ledge_hanging() {
            return;
        }

        self.set_mode(LocomotionMode::LedgeHanging { let_go: false }, ctx);
        ctx.movement.set_gravity_scale(0.0);
        ctx.movement.stop_movement_immediately();
        self.play(ctx, AnimNode::LedgeGrab);

        let probe = self.probe(ctx);
        match ctx.sensor.ledge_grab_location(&probe) {
            Some(target) => {
                self.state.pending_move = Some(PendingMove::new(
                    PendingMoveKind::LedgeGrab,
                    probe.location,
                    target,
                    self.tuning.ledge_grab_move_time,
                ));
            }
            None => trace!("No hang location, holding position"),
        }
    }

    /// Contact lost while on a wall: fall away from it
    fn release_wall(&mut self, ctx: &mut Collaborators<'_>) {
        self.state.pending_move = None;
        let mode = Self::free_mode(ctx);
        self.set_mode(mode, ctx);
        ctx.movement
            .set_gravity_scale(self.tuning.default_gravity_scale);

        if ctx.movement.is_falling() {
            self.play(ctx, AnimNode::Fall);
        }
    }

    fn wall_jump(&mut self, ctx: &mut Collaborators<'_>) {
        self.play(ctx, AnimNode::JumpUp);
        self.state.pending_move = None;
        self.set_mode(LocomotionMode::Airborne, ctx);
        ctx.movement
            .set_gravity_scale(self.tuning.default_gravity_scale);

        let away = -self.state.facing.forward() * self.tuning.wall_jump_velocity.x;
        let up = Vec2::Y * self.tuning.wall_jump_velocity.y;
        ctx.movement.launch(away + up);

        self.state.facing = self.state.facing.flipped();
        self.state.wall_lockout = self.tuning.wall_jump_lockout;
        debug!("Wall jump, now facing {:?}", self.state.facing);
    }

    // ---- locomotion input ----

    /// Horizontal axis; zero stops the character
    pub fn on_move_axis(&mut self, value: f32, ctx: &mut Collaborators<'_>) {
        if value == 0.0 {
            self.stop_moving(ctx);
            return;
        }

        self.state.flags.has_move_input = true;

        if self.state.is_crouched() {
            if let Some(facing) = Facing::from_axis(value) {
                self.state.facing = facing;
            }
            return;
        }

        if self.state.is_attacking() || self.state.is_dashing() {
            return;
        }

        // Wall modes keep facing the wall
        if !self.state.mode.is_on_wall() {
            if let Some(facing) = Facing::from_axis(value) {
                self.state.facing = facing;
            }
        }
        ctx.movement.add_movement_input(Vec2::X, value);

        if !self.state.run_anim_triggered() && ctx.movement.is_moving_on_ground() {
            self.play(ctx, AnimNode::Run);
            self.state.flags.run_anim_triggered = true;
            self.clear_attack();
        }
    }

    pub fn stop_moving(&mut self, ctx: &mut Collaborators<'_>) {
        self.state.flags.has_move_input = false;
        self.state.flags.run_anim_triggered = false;

        if self.state.is_attacking()
            || !ctx.movement.is_moving_on_ground()
            || self.state.is_sliding()
            || self.state.is_crouched()
        {
            return;
        }

        self.play(ctx, AnimNode::Idle);
    }

    pub fn on_jump_input(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.mode.is_on_wall() {
            self.wall_jump(ctx);
            return;
        }

        if self.state.is_attacking()
            || !ctx.movement.is_moving_on_ground()
            || self.state.is_dashing()
            || self.state.is_sliding()
        {
            return;
        }

        if self.state.is_crouched() {
            self.slide(ctx);
            return;
        }

        ctx.movement.jump();
    }

    /// Climb onto the ledge being hung from
    pub fn on_up_input(&mut self, ctx: &mut Collaborators<'_>) {
        if !self.state.is_ledge_hanging()
            || self.state.pending_move_kind() == Some(PendingMoveKind::ClimbUp)
        {
            return;
        }

        let probe = self.probe(ctx);
        let offset = Vec2::new(
            probe.radius * self.tuning.ledge_climb_offset.x * self.state.facing.sign(),
            probe.half_height * self.tuning.ledge_climb_offset.y,
        );

        self.state.pending_move = Some(PendingMove::new(
            PendingMoveKind::ClimbUp,
            probe.location,
            probe.location + offset,
            self.tuning.ledge_climb_move_time,
        ));
        self.play(ctx, AnimNode::JumpUp);
        debug!("Climbing up to {:?}", probe.location + offset);
    }

    pub fn on_down_pressed(&mut self, ctx: &mut Collaborators<'_>) {
        self.state.flags.has_crouch_input = true;

        let probe = self.probe(ctx);
        if ctx.sensor.ahead_ledge_check(&probe) {
            if let Some(target) = ctx.sensor.ledge_climb_down_location(&probe) {
                self.state.pending_move = Some(PendingMove::new(
                    PendingMoveKind::ClimbDown,
                    probe.location,
                    target,
                    self.tuning.ledge_climb_down_move_time,
                ));
                self.state.facing = self.state.facing.flipped();
                self.play(ctx, AnimNode::Run);
                debug!("Climbing down to {:?}", target);
                return;
            }
        }

        if let LocomotionMode::LedgeHanging { let_go: false } = self.state.mode {
            self.state.pending_move = None;
            self.set_mode(LocomotionMode::LedgeHanging { let_go: true }, ctx);
            ctx.movement
                .set_gravity_scale(self.tuning.default_gravity_scale);
            return;
        }

        if self.state.is_ledge_hanging()
            || self.state.is_attacking()
            || self.state.is_sliding()
            || !ctx.movement.is_moving_on_ground()
            || self.wall_overhead(ctx)
        {
            return;
        }

        self.crouch(ctx, AnimNode::Crouch);
    }

    pub fn on_down_released(&mut self, ctx: &mut Collaborators<'_>) {
        self.state.flags.has_crouch_input = false;

        if !self.state.is_crouched()
            || self.state.is_sliding()
            || self.state.is_attacking()
            || self.wall_overhead(ctx)
        {
            return;
        }

        self.uncrouch(ctx);
        let node = if self.state.has_move_input() {
            AnimNode::Run
        } else {
            AnimNode::Idle
        };
        self.play(ctx, node);
    }

    fn slide(&mut self, ctx: &mut Collaborators<'_>) {
        self.set_mode(LocomotionMode::Sliding { elapsed: 0.0 }, ctx);
        self.play(ctx, AnimNode::Slide);
    }

    /// End a slide, staying low when crouch is held or the ceiling is too low
    pub fn stop_sliding(&mut self, ctx: &mut Collaborators<'_>) {
        let mode = Self::free_mode(ctx);
        self.set_mode(mode, ctx);

        if self.state.has_crouch_input() || self.wall_overhead(ctx) {
            if ctx.movement.is_falling() {
                return;
            }
            self.set_sprite_offset(ctx, self.tuning.crouched_sprite_offset());
            self.play(ctx, AnimNode::Crouching);
        } else {
            self.uncrouch(ctx);
            self.play(ctx, AnimNode::StopSliding);
        }
    }

    fn crouch(&mut self, ctx: &mut Collaborators<'_>, node: AnimNode) {
        self.state.flags.crouched = true;
        ctx.movement
            .set_capsule_half_height(self.tuning.crouched_half_height);
        self.set_sprite_offset(ctx, self.tuning.crouched_sprite_offset());
        self.play(ctx, node);
    }

    fn uncrouch(&mut self, ctx: &mut Collaborators<'_>) {
        self.state.flags.crouched = false;
        ctx.movement
            .set_capsule_half_height(self.tuning.standing_half_height);
        self.set_sprite_offset(ctx, self.tuning.default_sprite_offset);
    }

    // ---- combat input ----

    pub fn on_light_attack(&mut self, ctx: &mut Collaborators<'_>) {
        self.attack(ComboInput::LightAttack, ctx);
    }

    pub fn on_heavy_attack(&mut self, ctx: &mut Collaborators<'_>) {
        self.attack(ComboInput::HeavyAttack, ctx);
    }

    fn attack(&mut self, input: ComboInput, ctx: &mut Collaborators<'_>) {
        if self.state.is_crouched() {
            return;
        }

        self.state.flags.attacking = true;
        match self.combo.combo_check(input) {
            Some(step) => self.play_combo_step(&step, ctx),
            None => self.clear_attack(),
        }
    }

    pub fn on_charge_attack(&mut self, ctx: &mut Collaborators<'_>) {
        if !ctx.movement.is_moving_on_ground()
            || self.state.is_attacking()
            || self.state.is_crouched()
        {
            return;
        }

        self.play(ctx, AnimNode::ChargeAttack);
        self.state.flags.attacking = true;
        self.state.flags.charging = true;
    }

    pub fn on_charge_attack_released(&mut self, ctx: &mut Collaborators<'_>) {
        if !self.state.is_charging() {
            return;
        }

        self.play(ctx, AnimNode::ChargeAttackRelease);
        self.state.flags.charging = false;
    }

    pub fn on_dash(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.is_attacking()
            || self.state.is_dashing()
            || self.state.is_crouched()
            || !ctx.movement.is_moving_on_ground()
        {
            return;
        }

        self.set_mode(LocomotionMode::Dashing { elapsed: 0.0 }, ctx);
        ctx.movement.set_can_walk_off_ledges(false);

        // Pressed into the floor so the dash cannot pop off slopes
        let impulse = self.state.facing.forward() * self.tuning.dash_speed
            + Vec2::NEG_Y * self.tuning.default_gravity_scale;
        ctx.movement.add_impulse(impulse, true);

        if let Some(step) = self.combo.combo_check(ComboInput::Dash) {
            self.play_combo_step(&step, ctx);
        }
    }

    /// End a dash. Always re-enables walking off ledges.
    pub fn stop_dashing(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.is_dashing() {
            let mode = Self::free_mode(ctx);
            self.set_mode(mode, ctx);
        }
        ctx.movement.set_can_walk_off_ledges(true);
    }

    fn play_combo_step(&self, step: &ComboStep, ctx: &mut Collaborators<'_>) {
        if let Some(node) = &step.node {
            self.bridge
                .jump_to_node(ctx.animation, node, step.state_machine.as_deref());
        }
    }

    // ---- movement callbacks ----

    pub fn on_jumped(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.mode.is_free() {
            self.set_mode(LocomotionMode::Airborne, ctx);
        }
        self.play(ctx, AnimNode::JumpUp);
        ctx.sprite.jump_squeeze();
        self.clear_attack();
    }

    pub fn on_landed(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.pending_move_kind() != Some(PendingMoveKind::ClimbDown) {
            self.state.pending_move = None;
        }

        if self.state.mode.is_on_wall() || self.state.mode.is_free() {
            self.set_mode(LocomotionMode::Grounded, ctx);
            ctx.movement
                .set_gravity_scale(self.tuning.default_gravity_scale);
        }

        if self.state.has_crouch_input() {
            self.crouch(ctx, AnimNode::Crouching);
        } else if self.state.has_move_input() {
            self.play(ctx, AnimNode::Run);
            self.clear_attack();
        } else {
            ctx.sprite.land_squash();
            self.play(ctx, AnimNode::Land);
            self.clear_attack();
        }
    }

    pub fn on_walking_off_ledge(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.mode == LocomotionMode::Grounded {
            self.set_mode(LocomotionMode::Airborne, ctx);
        }
        self.play(ctx, AnimNode::Fall);
    }

    // ---- animation callbacks ----

    /// The animation graph re-entered its locomotion state machine
    pub fn on_enter_locomotion(&mut self, ctx: &mut Collaborators<'_>) {
        if self.state.is_dashing() {
            self.play(ctx, AnimNode::StopDashing);
        } else {
            self.reset_action(ctx);
        }
    }

    /// Clear the current action and return to the matching locomotion pose
    pub fn reset_action(&mut self, ctx: &mut Collaborators<'_>) {
        self.clear_attack();
        if self.state.is_dashing() {
            self.stop_dashing(ctx);
        }

        let node = if self.state.has_move_input() {
            AnimNode::Run
        } else {
            AnimNode::Idle
        };
        self.play(ctx, node);
    }

    // ---- helpers ----

    fn clear_attack(&mut self) {
        self.state.flags.attacking = false;
        self.state.flags.charging = false;
    }

    fn free_mode(ctx: &Collaborators<'_>) -> LocomotionMode {
        if ctx.movement.is_moving_on_ground() {
            LocomotionMode::Grounded
        } else {
            LocomotionMode::Airborne
        }
    }

    /// Switch mode, restoring what the previous mode overrode
    fn set_mode(&mut self, mode: LocomotionMode, ctx: &mut Collaborators<'_>) {
        let previous = self.state.mode;
        self.state.mode = mode;

        if previous.overrides_gravity() && !mode.overrides_gravity() {
            ctx.movement
                .set_gravity_scale(self.tuning.default_gravity_scale);
        }
        if matches!(previous, LocomotionMode::Dashing { .. })
            && !matches!(mode, LocomotionMode::Dashing { .. })
        {
            ctx.movement.set_can_walk_off_ledges(true);
        }

        if previous.name() != mode.name() {
            debug!("Warrior {} -> {}", previous.name(), mode.name());
        }
    }

    fn probe(&self, ctx: &Collaborators<'_>) -> SensorProbe {
        SensorProbe {
            location: ctx.movement.location(),
            facing: self.state.facing,
            half_height: ctx.movement.capsule_half_height(),
            radius: self.tuning.capsule_radius,
        }
    }

    fn wall_overhead(&self, ctx: &Collaborators<'_>) -> bool {
        let probe = self.probe(ctx);
        ctx.sensor
            .wall_above(&probe, self.tuning.overhead_check_distance)
    }

    fn set_sprite_offset(&mut self, ctx: &mut Collaborators<'_>, offset: Vec2) {
        self.state.sprite_offset = offset;
        ctx.sprite.set_sprite_offset(offset);
    }

    fn play(&self, ctx: &mut Collaborators<'_>, node: AnimNode) {
        self.bridge.play(ctx.animation, node);
    }
}
