use anyhow::Result;
use glam::Vec2;
use log::{debug, info};

use warrior_controller::engine::animation::{AnimationClip, AnimationGraphPlayer};
use warrior_controller::engine::frame_clock::FrameClock;
use warrior_controller::engine::movement::{CharacterMovement, MovementParams, MovementSystem};
use warrior_controller::engine::physics::{PhysicsWorld, SurfaceTag};
use warrior_controller::engine::sprite::SpriteRig;
use warrior_controller::game::warrior::{
    AnimNode, Collaborators, ComboTable, ControllerInput, RapierSensor, WarriorController,
    BASE_TUNING, LOCOMOTION_STATE_MACHINE,
};

/// Simulated display rate; the controller still ticks at the fixed rate
const FRAME_TIME: f32 = 1.0 / 50.0;
const DEMO_FRAMES: u64 = 400;

/// Nodes that loop until something else is requested
const LOOPING_NODES: [AnimNode; 5] = [
    AnimNode::Idle,
    AnimNode::Run,
    AnimNode::Fall,
    AnimNode::WallSlide,
    AnimNode::Crouching,
];

/// Everything one warrior needs, owned by the host
struct Demo {
    world: PhysicsWorld,
    movement: CharacterMovement,
    controller: WarriorController,
    graph: AnimationGraphPlayer,
    sprite: SpriteRig,
}

impl Demo {
    fn new() -> Result<Self> {
        let mut world = PhysicsWorld::new();
        // Floor with its top at y = 0
        world.add_block(10.0, -0.5, 40.0, 1.0, Some(SurfaceTag::Platform));
        // Short block to grab and climb
        world.add_block(9.0, 1.0, 2.0, 2.0, Some(SurfaceTag::Wall));
        // Tall wall to slide down
        world.add_block(21.0, 5.0, 2.0, 10.0, Some(SurfaceTag::Wall));
        info!("Level built with {} colliders", world.collider_count());

        let combo_table = ComboTable::standard();
        let graph = build_graph(&combo_table);
        let controller = WarriorController::new(BASE_TUNING, combo_table)?;
        let movement = CharacterMovement::new(MovementParams::default(), Vec2::new(0.0, 1.0));

        let mut demo = Self {
            world,
            movement,
            controller,
            graph,
            sprite: SpriteRig::new(),
        };

        let sensor = RapierSensor::new(&demo.world);
        let mut ctx = Collaborators {
            movement: &mut demo.movement,
            sensor: &sensor,
            animation: &mut demo.graph,
            sprite: &mut demo.sprite,
        };
        demo.controller.begin_play(&mut ctx);

        Ok(demo)
    }

    /// One fixed update: inputs, movement, movement callbacks, controller tick
    fn fixed_update(&mut self, dt: f32, inputs: &[ControllerInput]) {
        let sensor = RapierSensor::new(&self.world);

        let mut ctx = Collaborators {
            movement: &mut self.movement,
            sensor: &sensor,
            animation: &mut self.graph,
            sprite: &mut self.sprite,
        };
        for input in inputs {
            self.controller.handle_input(*input, &mut ctx);
        }

        let events = self.movement.step(dt, &self.world);

        let mut ctx = Collaborators {
            movement: &mut self.movement,
            sensor: &sensor,
            animation: &mut self.graph,
            sprite: &mut self.sprite,
        };
        for event in events {
            debug!("Movement event {:?}", event);
            self.controller.handle_movement_event(event, &mut ctx);
        }
        self.controller.tick(dt, &mut ctx);

        self.graph.update(dt);
        self.sprite.update(dt);

        // One-shot clips hand control back to the locomotion graph
        if self.graph.take_finished() {
            let mut ctx = Collaborators {
                movement: &mut self.movement,
                sensor: &sensor,
                animation: &mut self.graph,
                sprite: &mut self.sprite,
            };
            self.controller.on_enter_locomotion(&mut ctx);
        }
    }

    fn report(&self, update: u64) {
        let state = self.controller.state();
        info!(
            "[{:>4}] pos ({:>6.2}, {:>5.2}) {:<13} facing {:?} anim {}",
            update,
            self.movement.location().x,
            self.movement.location().y,
            state.mode.name(),
            state.facing,
            self.graph.current_node()
        );
    }
}

/// Register every locomotion node and every combo node with a placeholder clip
fn build_graph(combo_table: &ComboTable) -> AnimationGraphPlayer {
    let mut graph = AnimationGraphPlayer::new();

    for node in AnimNode::ALL {
        let clip = if LOOPING_NODES.contains(&node) {
            AnimationClip::looping(6, 10.0)
        } else {
            AnimationClip::one_shot(4, 12.0)
        };
        graph.add_node(LOCOMOTION_STATE_MACHINE, node.default_name(), clip);
    }

    for chain in combo_table.chains() {
        for step in &chain.steps {
            if let Some(node) = &step.node {
                let state_machine = step
                    .state_machine
                    .as_deref()
                    .unwrap_or(LOCOMOTION_STATE_MACHINE);
                graph.add_node(state_machine, node, AnimationClip::one_shot(5, 15.0));
            }
        }
    }

    graph
}

/// Scripted inputs for a fixed update
fn scripted_inputs(update: u64) -> Vec<ControllerInput> {
    use ControllerInput::*;

    let mut inputs = Vec::new();

    // Held horizontal axis, sent every update like a stick
    match update {
        90..=199 | 330..=420 => inputs.push(MoveAxis(1.0)),
        200 | 421 => inputs.push(MoveAxis(0.0)),
        _ => {}
    }

    let pressed = match update {
        30 | 45 | 60 => Some(LightAttackPressed),
        75 => Some(HeavyAttackPressed),
        115 | 380 | 405 => Some(JumpPressed),
        150 => Some(UpPressed),
        220 => Some(DownPressed),
        235 => Some(JumpPressed),
        280 => Some(DownReleased),
        300 => Some(DashPressed),
        301 => Some(LightAttackPressed),
        440 => Some(ChargeAttackPressed),
        470 => Some(ChargeAttackReleased),
        _ => None,
    };
    inputs.extend(pressed);

    inputs
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting warrior controller demo...");

    let mut demo = Demo::new()?;
    let mut clock = FrameClock::new();
    let mut update: u64 = 0;

    for _ in 0..DEMO_FRAMES {
        let steps = clock.begin_frame(FRAME_TIME);
        for _ in 0..steps {
            let inputs = scripted_inputs(update);
            demo.fixed_update(clock.fixed_timestep(), &inputs);

            if update % 30 == 0 {
                demo.report(update);
            }
            update += 1;
        }
    }

    info!(
        "Demo finished: {} frames, {} updates, {} animation jumps, {} squashes, sprite at rest {}",
        clock.frame_count(),
        clock.update_count(),
        demo.graph.history().len(),
        demo.sprite.squashes(),
        demo.sprite.is_at_rest()
    );

    Ok(())
}
