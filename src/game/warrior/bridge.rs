// Maps semantic warrior animations onto animation-graph node jumps

use std::collections::HashMap;

use crate::engine::animation::AnimationGraph;

/// Default name of the locomotion state machine
pub const LOCOMOTION_STATE_MACHINE: &str = "Locomotion";

/// Semantic animation requests made by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimNode {
    Idle,
    Run,
    JumpUp,
    Fall,
    Land,
    /// Crouch entered from standing
    Crouch,
    /// Crouch held (after a slide or landing with down held)
    Crouching,
    Slide,
    StopSliding,
    WallSlide,
    LedgeGrab,
    ChargeAttack,
    ChargeAttackRelease,
    StopDashing,
}

impl AnimNode {
    pub const ALL: [AnimNode; 14] = [
        AnimNode::Idle,
        AnimNode::Run,
        AnimNode::JumpUp,
        AnimNode::Fall,
        AnimNode::Land,
        AnimNode::Crouch,
        AnimNode::Crouching,
        AnimNode::Slide,
        AnimNode::StopSliding,
        AnimNode::WallSlide,
        AnimNode::LedgeGrab,
        AnimNode::ChargeAttack,
        AnimNode::ChargeAttackRelease,
        AnimNode::StopDashing,
    ];

    /// Node name used when no override is configured
    pub fn default_name(self) -> &'static str {
        match self {
            AnimNode::Idle => "Idle",
            AnimNode::Run => "Run",
            AnimNode::JumpUp => "JumpUp",
            AnimNode::Fall => "Fall",
            AnimNode::Land => "Land",
            AnimNode::Crouch => "Crouch",
            AnimNode::Crouching => "Crouching",
            AnimNode::Slide => "Slide",
            AnimNode::StopSliding => "StopSliding",
            AnimNode::WallSlide => "WallSlide",
            AnimNode::LedgeGrab => "LedgeGrab",
            AnimNode::ChargeAttack => "ChargeAttack",
            AnimNode::ChargeAttackRelease => "ChargeAttackRelease",
            AnimNode::StopDashing => "StopDashing",
        }
    }
}

/// Resolves node names and forwards jump requests to the animation graph
#[derive(Debug, Clone)]
pub struct AnimationBridge {
    locomotion_state_machine: String,
    overrides: HashMap<AnimNode, String>,
}

impl Default for AnimationBridge {
    fn default() -> Self {
        Self::new(LOCOMOTION_STATE_MACHINE)
    }
}

impl AnimationBridge {
    pub fn new(locomotion_state_machine: &str) -> Self {
        Self {
            locomotion_state_machine: locomotion_state_machine.to_string(),
            overrides: HashMap::new(),
        }
    }

    /// Use a custom node name for a semantic animation
    pub fn with_node_name(mut self, node: AnimNode, name: &str) -> Self {
        self.overrides.insert(node, name.to_string());
        self
    }

    pub fn locomotion_state_machine(&self) -> &str {
        &self.locomotion_state_machine
    }

    pub fn node_name(&self, node: AnimNode) -> &str {
        self.overrides
            .get(&node)
            .map(String::as_str)
            .unwrap_or_else(|| node.default_name())
    }

    /// Jump to a named node; `None` targets the locomotion state machine
    pub fn jump_to_node(
        &self,
        graph: &mut dyn AnimationGraph,
        node: &str,
        state_machine: Option<&str>,
    ) {
        let state_machine = state_machine.unwrap_or(self.locomotion_state_machine.as_str());
        graph.jump_to_node(node, state_machine);
    }

    /// Jump to a semantic animation in the locomotion state machine
    pub fn play(&self, graph: &mut dyn AnimationGraph, node: AnimNode) {
        self.jump_to_node(graph, self.node_name(node), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingGraph {
        jumps: Vec<(String, String)>,
    }

    impl AnimationGraph for RecordingGraph {
        fn jump_to_node(&mut self, node: &str, state_machine: &str) {
            self.jumps.push((node.to_string(), state_machine.to_string()));
        }
    }

    #[test]
    fn test_defaults_to_locomotion() {
        let bridge = AnimationBridge::default();
        let mut graph = RecordingGraph::default();

        bridge.play(&mut graph, AnimNode::WallSlide);
        bridge.jump_to_node(&mut graph, "LightAttack1", None);

        assert_eq!(
            graph.jumps,
            vec![
                ("WallSlide".to_string(), "Locomotion".to_string()),
                ("LightAttack1".to_string(), "Locomotion".to_string()),
            ]
        );
    }

    #[test]
    fn test_explicit_state_machine() {
        let bridge = AnimationBridge::default();
        let mut graph = RecordingGraph::default();

        bridge.jump_to_node(&mut graph, "Uppercut", Some("Combat"));
        assert_eq!(graph.jumps[0], ("Uppercut".to_string(), "Combat".to_string()));
    }

    #[test]
    fn test_node_name_override() {
        let bridge = AnimationBridge::new("Warrior").with_node_name(AnimNode::Land, "HardLand");
        assert_eq!(bridge.node_name(AnimNode::Land), "HardLand");
        assert_eq!(bridge.node_name(AnimNode::Idle), "Idle");
        assert_eq!(bridge.locomotion_state_machine(), "Warrior");
    }

    #[test]
    fn test_default_names_unique() {
        let mut seen = std::collections::HashSet::new();
        for node in AnimNode::ALL {
            assert!(seen.insert(node.default_name()), "Duplicate node name");
        }
    }
}
