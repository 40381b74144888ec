// Level geometry and world queries using rapier2d

pub mod body;
mod collision;
mod world;

pub use body::ColliderHandle;
pub use collision::{CollisionGroups, SurfaceTag};
pub use world::{OverlapHit, PhysicsWorld, RayHit};
