use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::math::{project_on_plane, rotation_between};
use crate::physics::PhysicsQuery;

/// What the downward probe found under the character this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    pub surface: Option<Entity>,
    pub point: Vec3,
    pub normal: Vec3,
    /// Gap between the feet and the surface, `INFINITY` without a surface.
    pub separation: f32,
    pub point_velocity: Vec3,
    /// Maps world up onto `normal`.
    pub rotation_to_surface: Quat,
    pub rotation_from_surface: Quat,
}

impl SurfaceInfo {
    pub fn none() -> Self {
        SurfaceInfo {
            surface: None,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            separation: f32::INFINITY,
            point_velocity: Vec3::ZERO,
            rotation_to_surface: Quat::IDENTITY,
            rotation_from_surface: Quat::IDENTITY,
        }
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Angle between `up` and the surface normal, zero without a surface.
    pub fn incline_degrees(&self, up: Vec3) -> f32 {
        if !self.has_surface() {
            return 0.0;
        }
        match (self.normal.try_normalize(), up.try_normalize()) {
            (Some(normal), Some(up)) => normal.angle_between(up).to_degrees(),
            _ => 0.0,
        }
    }

    /// Unit direction a free body would slide along the surface.
    pub fn downhill(&self, gravity: Vec3) -> Vec3 {
        project_on_plane(gravity, self.normal).normalize_or_zero()
    }
}

impl Default for SurfaceInfo {
    fn default() -> Self {
        SurfaceInfo::none()
    }
}

#[derive(Component, Debug, Default, Clone)]
pub struct SurfaceSensor {
    current: SurfaceInfo,
}

impl SurfaceSensor {
    pub fn current(&self) -> &SurfaceInfo {
        &self.current
    }

    /// Casts along `down` from `position` and stores the result.
    pub fn probe(
        &mut self,
        position: Vec3,
        down: Vec3,
        config: &ControllerConfig,
        query: &dyn PhysicsQuery,
    ) -> &SurfaceInfo {
        let up = -down;

        let info = match query.raycast(position, down, config.probe_distance()) {
            Some(hit) => {
                let rotation_to_surface = rotation_between(up, hit.normal);
                SurfaceInfo {
                    surface: Some(hit.surface),
                    point: hit.point,
                    normal: hit.normal.normalize_or_zero(),
                    separation: hit.distance - config.body.half_height,
                    point_velocity: query.point_velocity(hit.surface, hit.point),
                    rotation_to_surface,
                    rotation_from_surface: rotation_to_surface.inverse(),
                }
            }
            None => SurfaceInfo::none(),
        };

        self.current = info;
        &self.current
    }
}
