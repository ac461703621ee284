//! Seams between the controller and the physics engine.

pub mod body;
pub mod query;
pub mod rapier;

#[cfg(test)]
pub mod testing;

pub use body::CharacterBody;
pub use query::{PhysicsQuery, RayHit};
