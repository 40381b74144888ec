// Engine-side collaborators: physics, movement, animation, sprite feedback

pub mod animation;
pub mod frame_clock;
pub mod movement;
pub mod physics;
pub mod sprite;
