use bevy::prelude::*;

use crate::input::PlayerAction;
use crate::physics::CharacterBody;

use super::freefall::{face_look_yaw, integrate_air};
use super::motion::{Motion, MotionContext};
use super::rope::{tension_acceleration, RopeSimulator};

/// Swinging on the rope. Airborne physics plus rope tension toward the last
/// wrap point.
#[derive(Debug, Default, Clone)]
pub struct Grapple {
    rope: RopeSimulator,
    velocity: Vec3,
}

impl Grapple {
    pub fn rope(&self) -> &RopeSimulator {
        &self.rope
    }

    pub fn rope_mut(&mut self) -> &mut RopeSimulator {
        &mut self.rope
    }

    fn winch(&mut self, ctx: &MotionContext) {
        let rope_config = &ctx.config.rope;
        let position = ctx.body.position;

        if ctx.input.held(PlayerAction::Retract) {
            // Wrapped segments are not reeled in, only the free end.
            let shortest = self.rope.wrapped_length() + rope_config.min_length;
            if self.rope.current_length() > shortest {
                self.rope
                    .winch(shortest, rope_config.retract_speed * ctx.dt);
                if let Some((direction, _)) = self.rope.anchor_offset(position) {
                    self.velocity += direction * rope_config.retract_pull * ctx.dt;
                }
            }
        } else if ctx.input.held(PlayerAction::Extend) {
            self.rope
                .winch(rope_config.max_length, ctx.gravity.length() * ctx.dt);
        }

        if ctx.input.just_released(PlayerAction::Retract)
            || ctx.input.just_released(PlayerAction::Extend)
        {
            self.rope.reanchor_to_taut(position);
        }
    }

    fn apply_tension(&mut self, ctx: &MotionContext) {
        let predicted = ctx.body.position + self.velocity * ctx.dt;
        let Some((direction, distance)) = self.rope.anchor_offset(predicted) else {
            return;
        };
        let length_left = self.rope.length_left();
        if distance <= length_left {
            return;
        }

        let acceleration =
            tension_acceleration(distance, length_left, ctx.body.mass, &ctx.config.rope);
        self.velocity += direction * acceleration * ctx.dt;

        // A taut rope never lets the character move further from the anchor.
        let radial = self.velocity.dot(direction);
        if radial < 0.0 {
            self.velocity -= direction * radial;
        }
    }
}

impl Motion for Grapple {
    fn begin(&mut self, old_velocity: Vec3, ctx: &mut MotionContext) {
        self.velocity = old_velocity;
        ctx.body.kinematic = false;
        ctx.body.gravity_enabled = false;
        ctx.body.linear_velocity = self.velocity;
    }

    fn end(&mut self, _body: &mut CharacterBody) {
        self.rope.release();
    }

    fn process(&mut self, ctx: &mut MotionContext) {
        if self.rope.is_grappled() && !self.rope.refresh_anchors(ctx.query) {
            warn!("grapple anchor lost, releasing rope");
            self.rope.release();
        }

        if self.rope.is_grappled() {
            self.rope
                .update_wrapping(ctx.body.position, ctx.query, &ctx.config.rope);
            self.winch(ctx);
            self.apply_tension(ctx);
        }

        self.velocity += ctx.gravity * ctx.dt;
        self.velocity = integrate_air(self.velocity, ctx);
        ctx.body.linear_velocity = self.velocity;
        let turn_rate = ctx.config.rope.turn_rate_degrees;
        face_look_yaw(ctx, turn_rate);

        let predicted = ctx.body.position + self.velocity * ctx.dt;
        self.rope.rebuild_line(predicted);
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}
