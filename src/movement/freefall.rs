use bevy::prelude::*;

use crate::input::PlayerAction;
use crate::math::{deflect_from_contact, move_towards_vec, quadratic_drag, rotate_towards};
use crate::physics::CharacterBody;

use super::motion::{Motion, MotionContext};
use super::timer::ScheduledTimer;

/// Airborne movement with manual gravity, drag and limited strafing.
#[derive(Debug, Default, Clone)]
pub struct Freefall {
    velocity: Vec3,
    dash_cooldown: ScheduledTimer,
}

impl Freefall {
    pub fn dash_ready(&self) -> bool {
        !self.dash_cooldown.is_armed()
    }

    fn try_dash(&mut self, ctx: &MotionContext) {
        // Re-enables the dash once the deadline has passed.
        self.dash_cooldown.fired(ctx.now);
        if !self.dash_ready() {
            return;
        }
        let Some(action) = PlayerAction::DIRECTIONS
            .into_iter()
            .find(|action| ctx.input.double_tapped(*action))
        else {
            return;
        };
        let direction = ctx.input.look_rotation() * action.local_direction();
        self.velocity += direction * ctx.config.air.dash_speed;
        self.dash_cooldown.schedule(ctx.now, ctx.config.air.dash_cooldown);
        debug!("air dash {:?}", action);
    }
}

impl Motion for Freefall {
    fn begin(&mut self, old_velocity: Vec3, ctx: &mut MotionContext) {
        self.velocity = old_velocity;
        ctx.body.kinematic = false;
        ctx.body.gravity_enabled = false;
        ctx.body.linear_velocity = self.velocity;
    }

    fn end(&mut self, _body: &mut CharacterBody) {}

    fn process(&mut self, ctx: &mut MotionContext) {
        self.try_dash(ctx);

        let config = ctx.config;
        let air = &config.air;
        let strafe = if ctx.input.held(PlayerAction::Sprint) {
            air.sprint_strafe_acceleration
        } else {
            air.strafe_acceleration
        };
        let step = ctx.input.yaw_rotation() * ctx.input.local_step() * strafe;
        self.velocity += (ctx.gravity + step) * ctx.dt;
        self.velocity = integrate_air(self.velocity, ctx);

        ctx.body.linear_velocity = self.velocity;
        face_look_yaw(ctx, air.turn_rate_degrees);
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

/// Contact deflection, quadratic drag and the speed clamp shared by the
/// airborne modes. Gravity is expected to be applied already.
pub(super) fn integrate_air(velocity: Vec3, ctx: &MotionContext) -> Vec3 {
    let velocity = deflect_from_contact(velocity, ctx.contact_normal);
    let drag = quadratic_drag(velocity, ctx.config.air.drag_coefficient, ctx.body.mass);
    (velocity - drag * ctx.dt).clamp_length_max(ctx.config.body.max_speed)
}

/// Turns the body toward the look yaw and bleeds off residual spin.
pub(super) fn face_look_yaw(ctx: &mut MotionContext, turn_rate_degrees: f32) {
    let target = ctx.input.yaw_rotation();
    ctx.body.rotation = rotate_towards(
        ctx.body.rotation,
        target,
        turn_rate_degrees.to_radians() * ctx.dt,
    );
    ctx.body.angular_velocity = move_towards_vec(
        ctx.body.angular_velocity,
        Vec3::ZERO,
        ctx.config.air.angular_damping,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::input::InputSnapshot;
    use crate::movement::sensor::SurfaceInfo;
    use crate::physics::testing::BoxWorld;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    fn run(freefall: &mut Freefall, input: &InputSnapshot, contact: Vec3, now: f64, body: &mut CharacterBody) {
        let world = BoxWorld::new();
        let config = ControllerConfig::default();
        let surface = SurfaceInfo::none();
        let mut ctx = MotionContext {
            input,
            surface: &surface,
            contact_normal: contact,
            body,
            query: &world,
            config: &config,
            gravity: GRAVITY,
            now,
            dt: 0.02,
        };
        freefall.process(&mut ctx);
    }

    #[test]
    fn one_tick_of_gravity() {
        let mut freefall = Freefall::default();
        let mut body = CharacterBody::new(Vec3::ZERO, 70.0);
        run(&mut freefall, &InputSnapshot::default(), Vec3::ZERO, 0.0, &mut body);

        let velocity = freefall.velocity();
        assert!((velocity.y - GRAVITY.y * 0.02).abs() < 1e-4);
        assert_eq!(body.linear_velocity, velocity);
    }

    #[test]
    fn wall_contact_blocks_inward_motion() {
        let mut freefall = Freefall::default();
        freefall.velocity = Vec3::new(-5.0, 0.0, 0.0);
        let mut body = CharacterBody::new(Vec3::ZERO, 70.0);
        run(&mut freefall, &InputSnapshot::default(), Vec3::X, 0.0, &mut body);
        assert!(freefall.velocity().x.abs() < 1e-4);
    }

    #[test]
    fn dash_respects_cooldown() {
        let mut freefall = Freefall::default();
        let mut body = CharacterBody::new(Vec3::ZERO, 70.0);
        let tap = InputSnapshot::default().with_double_tap(PlayerAction::Right);

        run(&mut freefall, &tap, Vec3::ZERO, 0.0, &mut body);
        assert!(freefall.velocity().x > 11.0);
        assert!(!freefall.dash_ready());

        let before = freefall.velocity().x;
        run(&mut freefall, &tap, Vec3::ZERO, 0.5, &mut body);
        assert!(freefall.velocity().x <= before);

        run(&mut freefall, &tap, Vec3::ZERO, 1.1, &mut body);
        assert!(freefall.velocity().x > before + 10.0);
    }

    #[test]
    fn speed_is_clamped() {
        let mut freefall = Freefall::default();
        freefall.velocity = Vec3::new(0.0, -1_000.0, 0.0);
        let mut body = CharacterBody::new(Vec3::ZERO, 70.0);
        run(&mut freefall, &InputSnapshot::default(), Vec3::ZERO, 0.0, &mut body);
        assert!(freefall.velocity().length() <= ControllerConfig::default().body.max_speed + 1e-3);
    }
}
