// 2D warrior character controller
//
// The controller lives in `game::warrior`; `engine` holds the collaborators it
// drives (movement, animation graph, sprite feedback) and the rapier-backed
// level used to sense walls and ledges.

pub mod core;
pub mod engine;
pub mod game;
