use bevy::math::{Affine3A, Vec3};
use bevy::prelude::Entity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub surface: Entity,
}

/// Read-only access to the collision world.
///
/// Implementations are expected to skip the character's own colliders.
pub trait PhysicsQuery {
    /// Nearest hit along `direction` within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// World transform of a surface, `None` once it no longer exists.
    fn surface_frame(&self, surface: Entity) -> Option<Affine3A>;

    /// First obstruction on the segment from `from` to `to`.
    fn linecast(&self, from: Vec3, to: Vec3) -> Option<RayHit> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        self.raycast(from, delta / length, length)
    }

    /// Velocity of `surface` at world `point`. Static surfaces report zero.
    fn point_velocity(&self, _surface: Entity, _point: Vec3) -> Vec3 {
        Vec3::ZERO
    }
}
