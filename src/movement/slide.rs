use bevy::prelude::*;

use crate::math::{project_on_plane, yaw_facing};
use crate::physics::CharacterBody;

use super::motion::{Motion, MotionContext};

/// Kinematic chute slide. The body is moved directly, so friction tuning
/// has no influence on the result.
#[derive(Debug, Default, Clone)]
pub struct Slide {
    planar: Vec3,
    to_surface: Quat,
}

impl Motion for Slide {
    fn begin(&mut self, old_velocity: Vec3, ctx: &mut MotionContext) {
        let surface = ctx.surface;
        let flat = surface.rotation_from_surface * project_on_plane(old_velocity, surface.normal);
        self.planar = project_on_plane(flat, ctx.up());
        self.to_surface = surface.rotation_to_surface;
        ctx.body.kinematic = true;
        ctx.body.gravity_enabled = false;
        ctx.body.linear_velocity = Vec3::ZERO;
    }

    fn end(&mut self, body: &mut CharacterBody) {
        body.kinematic = false;
        body.linear_velocity = self.velocity();
    }

    fn process(&mut self, ctx: &mut MotionContext) {
        let config = ctx.config;
        let surface = ctx.surface;
        let up = ctx.up();

        let downhill = surface.rotation_from_surface * surface.downhill(ctx.gravity);
        self.planar = self
            .planar
            .lerp(downhill * config.slide.speed, config.slide.blend);
        self.to_surface = surface.rotation_to_surface;

        let mut displacement = self.velocity() * ctx.dt;
        if surface.has_surface() {
            let height_error = config.sensor.float_height - surface.separation;
            displacement += up * height_error * config.slide.height_correction;
        }
        ctx.body.move_by(displacement);

        if let Some(facing) = yaw_facing(self.velocity()) {
            ctx.body.rotation = facing;
        }
    }

    fn velocity(&self) -> Vec3 {
        self.to_surface * self.planar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::input::InputSnapshot;
    use crate::math::rotation_between;
    use crate::movement::sensor::SurfaceInfo;
    use crate::physics::testing::BoxWorld;

    #[test]
    fn slides_down_and_hands_back_control() {
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        let to = rotation_between(Vec3::Y, normal);
        let slope = SurfaceInfo {
            surface: Some(Entity::from_raw(0)),
            normal,
            separation: 0.3,
            rotation_to_surface: to,
            rotation_from_surface: to.inverse(),
            ..SurfaceInfo::none()
        };
        let world = BoxWorld::new();
        let config = ControllerConfig::default();
        let input = InputSnapshot::default();
        let mut body = CharacterBody::new(Vec3::ZERO, 70.0);
        let mut slide = Slide::default();

        let mut ctx = MotionContext {
            input: &input,
            surface: &slope,
            contact_normal: Vec3::ZERO,
            body: &mut body,
            query: &world,
            config: &config,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            now: 0.0,
            dt: 0.02,
        };
        slide.begin(Vec3::new(0.0, -5.0, 0.0), &mut ctx);
        assert!(ctx.body.kinematic);
        for _ in 0..10 {
            slide.process(&mut ctx);
        }

        let moved = ctx.body.take_translation();
        assert!(moved.z > 0.0 && moved.y < 0.0);
        assert!(slide.velocity().dot(normal).abs() < 1e-3);

        slide.end(ctx.body);
        assert!(!body.kinematic);
        assert!(body.linear_velocity.z > 0.0);
    }
}
