use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::input::InputSnapshot;
use crate::physics::{CharacterBody, PhysicsQuery};

use super::sensor::SurfaceInfo;

/// Everything a motion state may read or touch during one fixed tick.
pub struct MotionContext<'a> {
    pub input: &'a InputSnapshot,
    pub surface: &'a SurfaceInfo,
    pub contact_normal: Vec3,
    pub body: &'a mut CharacterBody,
    pub query: &'a dyn PhysicsQuery,
    pub config: &'a ControllerConfig,
    pub gravity: Vec3,
    /// Simulation clock in seconds.
    pub now: f64,
    pub dt: f32,
}

impl MotionContext<'_> {
    pub fn up(&self) -> Vec3 {
        (-self.gravity).try_normalize().unwrap_or(Vec3::Y)
    }
}

/// A movement mode of the character.
///
/// Instances live for the whole session so their private state, such as
/// cooldowns or the rope, survives switching away and back.
pub trait Motion: Send + Sync {
    /// Takes over from another mode moving at `old_velocity`.
    fn begin(&mut self, old_velocity: Vec3, ctx: &mut MotionContext);

    fn end(&mut self, body: &mut CharacterBody);

    fn process(&mut self, ctx: &mut MotionContext);

    /// World-space velocity this mode is producing.
    fn velocity(&self) -> Vec3;
}
