use bevy::prelude::*;

/// The character's rigid body as seen by the motion states.
///
/// Synced from rapier before the controller runs and written back after, so
/// the simulation never touches engine components directly.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CharacterBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub kinematic: bool,
    pub gravity_enabled: bool,
    translation: Vec3,
}

impl CharacterBody {
    pub fn new(position: Vec3, mass: f32) -> Self {
        CharacterBody {
            position,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            kinematic: false,
            gravity_enabled: true,
            translation: Vec3::ZERO,
        }
    }

    /// Queues a direct displacement. Only honoured while kinematic.
    pub fn move_by(&mut self, delta: Vec3) {
        self.translation += delta;
    }

    pub fn take_translation(&mut self) -> Vec3 {
        std::mem::take(&mut self.translation)
    }
}
