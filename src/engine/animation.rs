// Animation graph interface and a reference clip player
//
// The controller only ever asks the animation system to jump straight to a
// named node inside a named state machine. Playback, blending and completion
// are owned by the implementation.

use log::{debug, warn};
use std::collections::HashMap;

/// External animation system, as seen by the controller
pub trait AnimationGraph {
    /// Immediately transition to `node` inside `state_machine`.
    /// Fire-and-forget: the caller never waits on playback.
    fn jump_to_node(&mut self, node: &str, state_machine: &str);
}

/// A single animation clip
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Number of frames in the animation
    pub frame_count: usize,
    /// Duration of each frame in seconds
    pub frame_duration: f32,
    /// Whether the animation loops
    pub looping: bool,
}

impl AnimationClip {
    /// Create a new animation clip
    pub fn new(frame_count: usize, fps: f32, looping: bool) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_duration: 1.0 / fps,
            looping,
        }
    }

    /// Create a looping animation
    pub fn looping(frame_count: usize, fps: f32) -> Self {
        Self::new(frame_count, fps, true)
    }

    /// Create a one-shot animation (plays once)
    pub fn one_shot(frame_count: usize, fps: f32) -> Self {
        Self::new(frame_count, fps, false)
    }

    /// Get the total duration of one animation cycle
    pub fn total_duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_duration
    }
}

/// Plays clips arranged as nodes of named state machines
#[derive(Debug, Default)]
pub struct AnimationGraphPlayer {
    /// state machine -> node -> clip
    state_machines: HashMap<String, HashMap<String, AnimationClip>>,
    current_state_machine: String,
    current_node: String,
    current_frame: usize,
    frame_timer: f32,
    playing: bool,
    /// Set when a one-shot clip reaches its last frame; cleared by `take_finished`
    finished: bool,
    /// Every node jump requested so far, oldest first
    history: Vec<(String, String)>,
}

impl AnimationGraphPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip as `node` inside `state_machine`
    pub fn add_node(&mut self, state_machine: &str, node: &str, clip: AnimationClip) {
        self.state_machines
            .entry(state_machine.to_string())
            .or_default()
            .insert(node.to_string(), clip);
    }

    /// Builder form of `add_node`
    pub fn with_node(mut self, state_machine: &str, node: &str, clip: AnimationClip) -> Self {
        self.add_node(state_machine, node, clip);
        self
    }

    pub fn has_node(&self, state_machine: &str, node: &str) -> bool {
        self.state_machines
            .get(state_machine)
            .is_some_and(|nodes| nodes.contains_key(node))
    }

    fn current_clip(&self) -> Option<&AnimationClip> {
        self.state_machines
            .get(&self.current_state_machine)
            .and_then(|nodes| nodes.get(&self.current_node))
    }

    /// Update the animation (called every frame)
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }

        let Some(clip) = self.current_clip().cloned() else {
            return;
        };

        self.frame_timer += dt;

        while self.frame_timer >= clip.frame_duration {
            self.frame_timer -= clip.frame_duration;
            self.current_frame += 1;

            if self.current_frame >= clip.frame_count {
                if clip.looping {
                    self.current_frame = 0;
                } else {
                    // Stay on last frame
                    self.current_frame = clip.frame_count - 1;
                    self.playing = false;
                    self.finished = true;
                    break;
                }
            }
        }
    }

    /// Returns true once after a one-shot node finishes playing
    pub fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    pub fn current_node(&self) -> &str {
        &self.current_node
    }

    pub fn current_state_machine(&self) -> &str {
        &self.current_state_machine
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// All node jumps requested so far as (state machine, node)
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }
}

impl AnimationGraph for AnimationGraphPlayer {
    fn jump_to_node(&mut self, node: &str, state_machine: &str) {
        self.history
            .push((state_machine.to_string(), node.to_string()));

        if !self.has_node(state_machine, node) {
            warn!(
                "Animation node '{}' not found in state machine '{}'",
                node, state_machine
            );
            return;
        }

        debug!("Animation jump to {}::{}", state_machine, node);
        self.current_state_machine = state_machine.to_string();
        self.current_node = node.to_string();
        self.current_frame = 0;
        self.frame_timer = 0.0;
        self.playing = true;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> AnimationGraphPlayer {
        AnimationGraphPlayer::new()
            .with_node("Locomotion", "Idle", AnimationClip::looping(3, 10.0))
            .with_node("Locomotion", "Land", AnimationClip::one_shot(3, 10.0))
    }

    #[test]
    fn test_animation_clip_creation() {
        let clip = AnimationClip::looping(4, 8.0);
        assert_eq!(clip.frame_count, 4);
        assert_eq!(clip.frame_duration, 0.125); // 1/8
        assert!(clip.looping);
    }

    #[test]
    fn test_animation_clip_duration() {
        let clip = AnimationClip::one_shot(4, 8.0);
        assert_eq!(clip.total_duration(), 0.5);
    }

    #[test]
    fn test_jump_to_node() {
        let mut player = player();
        player.jump_to_node("Idle", "Locomotion");

        assert_eq!(player.current_node(), "Idle");
        assert_eq!(player.current_state_machine(), "Locomotion");
        assert!(player.is_playing());
    }

    #[test]
    fn test_unknown_node_is_ignored_but_recorded() {
        let mut player = player();
        player.jump_to_node("Idle", "Locomotion");
        player.jump_to_node("Missing", "Locomotion");

        assert_eq!(player.current_node(), "Idle");
        assert_eq!(player.history().len(), 2);
    }

    #[test]
    fn test_looping_node() {
        let mut player = player();
        player.jump_to_node("Idle", "Locomotion");

        player.update(0.35); // 3.5 frames
        assert_eq!(player.current_frame(), 0); // Should loop back
        assert!(player.is_playing());
        assert!(!player.take_finished());
    }

    #[test]
    fn test_one_shot_reports_finish_once() {
        let mut player = player();
        player.jump_to_node("Land", "Locomotion");

        player.update(0.5);
        assert_eq!(player.current_frame(), 2); // Last frame
        assert!(!player.is_playing());
        assert!(player.take_finished());
        assert!(!player.take_finished());
    }

    #[test]
    fn test_jump_restarts_same_node() {
        let mut player = player();
        player.jump_to_node("Idle", "Locomotion");
        player.update(0.15);
        assert_eq!(player.current_frame(), 1);

        player.jump_to_node("Idle", "Locomotion");
        assert_eq!(player.current_frame(), 0);
    }
}
