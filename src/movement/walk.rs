use bevy::prelude::*;

use crate::input::PlayerAction;
use crate::math::{deflect_from_contact, project_on_plane, rotate_towards, yaw_facing};
use crate::physics::CharacterBody;

use super::motion::{Motion, MotionContext};

/// Grounded movement.
///
/// Velocity is kept in flattened surface space, where the surface normal is
/// world up, and only rotated onto the slope when handed to the body.
#[derive(Debug, Default, Clone)]
pub struct Walk {
    planar: Vec3,
    to_surface: Quat,
    carried: Vec3,
}

impl Motion for Walk {
    fn begin(&mut self, old_velocity: Vec3, ctx: &mut MotionContext) {
        let surface = ctx.surface;
        let flat = surface.rotation_from_surface * project_on_plane(old_velocity, surface.normal);
        self.planar = project_on_plane(flat, ctx.up());
        self.to_surface = surface.rotation_to_surface;
        self.carried = surface.point_velocity;
        ctx.body.kinematic = false;
        ctx.body.gravity_enabled = false;
    }

    fn end(&mut self, _body: &mut CharacterBody) {}

    fn process(&mut self, ctx: &mut MotionContext) {
        let config = ctx.config;
        let walk = &config.walk;
        let surface = ctx.surface;
        let up = ctx.up();

        let step = ctx.input.local_step();
        if surface.incline_degrees(up) < walk.max_incline_degrees {
            let speed = if ctx.input.held(PlayerAction::Sprint) {
                walk.run_speed
            } else {
                walk.walk_speed
            };
            let target = ctx.input.yaw_rotation() * step * speed;
            self.planar = self.planar.lerp(target, walk.blend);

            let world = surface.rotation_to_surface * self.planar;
            self.planar = surface.rotation_from_surface
                * deflect_from_contact(world, ctx.contact_normal);
        } else {
            let downhill = surface.rotation_from_surface * surface.downhill(ctx.gravity);
            self.planar = self
                .planar
                .lerp(downhill * walk.downhill_speed, walk.downhill_blend);
        }

        if step == Vec3::ZERO && self.planar.length() < walk.rest_speed {
            self.planar = Vec3::ZERO;
        }

        self.to_surface = surface.rotation_to_surface;
        self.carried = surface.point_velocity;

        let mut velocity = self.velocity();
        if surface.has_surface() {
            let height_error = config.sensor.float_height - surface.separation;
            velocity += up * height_error * walk.height_correction;
        }
        ctx.body.linear_velocity = velocity;

        let facing = yaw_facing(self.to_surface * self.planar)
            .unwrap_or_else(|| ctx.input.yaw_rotation());
        ctx.body.rotation = rotate_towards(
            ctx.body.rotation,
            facing,
            walk.turn_rate_degrees.to_radians() * ctx.dt,
        );
        ctx.body.angular_velocity = Vec3::ZERO;
    }

    fn velocity(&self) -> Vec3 {
        self.to_surface * self.planar + self.carried
    }
}
