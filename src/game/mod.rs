// Game-side code built on the engine collaborators

pub mod warrior;
