//! Grapple rope geometry.
//!
//! The rope is a polyline of wrap points running from the original anchor to
//! the point nearest the character. Points are stored in the local frame of the
//! surface they caught on so they ride along with moving geometry.

use bevy::prelude::*;

use crate::config::RopeConfig;
use crate::math::move_towards;
use crate::physics::{PhysicsQuery, RayHit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapPoint {
    pub surface: Entity,
    /// Position in the surface's local frame.
    pub local: Vec3,
    /// Last resolved world position.
    pub world: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RopeSimulator {
    points: Vec<WrapPoint>,
    current_length: f32,
    wrapped_length: f32,
    length_left: f32,
    line: Vec<Vec3>,
}

impl RopeSimulator {
    pub fn is_grappled(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn points(&self) -> &[WrapPoint] {
        &self.points
    }

    pub fn last_point(&self) -> Option<Vec3> {
        self.points.last().map(|point| point.world)
    }

    pub fn current_length(&self) -> f32 {
        self.current_length
    }

    pub fn wrapped_length(&self) -> f32 {
        self.wrapped_length
    }

    pub fn length_left(&self) -> f32 {
        self.length_left
    }

    /// Polyline for rendering, anchor first and character last.
    pub fn line(&self) -> &[Vec3] {
        &self.line
    }

    /// The surface a grapple fired from `origin` along `direction` would hit.
    pub fn probe_target(
        origin: Vec3,
        direction: Vec3,
        query: &dyn PhysicsQuery,
        config: &RopeConfig,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        query.raycast(origin, direction, config.max_length)
    }

    /// Shoots the rope. Any previous rope is discarded either way.
    pub fn try_fire(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        query: &dyn PhysicsQuery,
        config: &RopeConfig,
    ) -> bool {
        self.release();
        let Some(hit) = Self::probe_target(origin, direction, query, config) else {
            debug!("grapple missed");
            return false;
        };
        let Some(frame) = query.surface_frame(hit.surface) else {
            return false;
        };

        self.points.push(WrapPoint {
            surface: hit.surface,
            local: frame.inverse().transform_point3(hit.point),
            world: hit.point,
        });
        self.current_length = hit.distance;
        self.recalculate_length();
        self.rebuild_line(origin);
        info!("grapple attached at {:?}, length {:.2}", hit.point, hit.distance);
        true
    }

    pub fn release(&mut self) {
        self.points.clear();
        self.line.clear();
        self.current_length = 0.0;
        self.wrapped_length = 0.0;
        self.length_left = 0.0;
    }

    /// Re-resolves every wrap point against its surface. `false` means a
    /// surface has gone and the rope should be released.
    pub fn refresh_anchors(&mut self, query: &dyn PhysicsQuery) -> bool {
        for point in &mut self.points {
            match query.surface_frame(point.surface) {
                Some(frame) => point.world = frame.transform_point3(point.local),
                None => return false,
            }
        }
        self.recalculate_length();
        true
    }

    /// One wrap step followed by one unwrap step.
    pub fn update_wrapping(
        &mut self,
        position: Vec3,
        query: &dyn PhysicsQuery,
        config: &RopeConfig,
    ) {
        if self.try_wrap(position, query, config) {
            debug!("rope wrapped, {} points", self.points.len());
        }
        if self.try_unwrap(position, query, config) {
            debug!("rope unwrapped, {} points", self.points.len());
        }
        self.recalculate_length();
    }

    fn try_wrap(&mut self, position: Vec3, query: &dyn PhysicsQuery, config: &RopeConfig) -> bool {
        let Some(last) = self.points.last().copied() else {
            return false;
        };
        let Some(forward) = query.linecast(position, last.world) else {
            return false;
        };
        if forward.surface == last.surface
            || forward.point.distance(last.world) <= config.wrap_epsilon
        {
            return false;
        }

        // The far side of the obstruction, seen from the anchor.
        let towards_character = (position - last.world).normalize_or_zero();
        let reverse = query
            .linecast(last.world + towards_character * config.wrap_offset, position)
            .filter(|hit| hit.surface == forward.surface);
        let normal = match reverse {
            Some(reverse) => (forward.normal + reverse.normal).normalize_or_zero(),
            None => forward.normal,
        };

        let world = forward.point + normal * config.wrap_offset;
        if world.distance(last.world) <= config.wrap_epsilon {
            return false;
        }
        let Some(frame) = query.surface_frame(forward.surface) else {
            return false;
        };
        self.points.push(WrapPoint {
            surface: forward.surface,
            local: frame.inverse().transform_point3(world),
            world,
        });
        true
    }

    fn try_unwrap(&mut self, position: Vec3, query: &dyn PhysicsQuery, config: &RopeConfig) -> bool {
        let count = self.points.len();
        if count < 2 {
            return false;
        }
        let previous = self.points[count - 2].world;
        if !has_line_of_sight(position, previous, query, config.wrap_epsilon) {
            return false;
        }
        self.points.pop();
        true
    }

    pub fn recalculate_length(&mut self) {
        self.wrapped_length = self
            .points
            .windows(2)
            .map(|pair| pair[0].world.distance(pair[1].world))
            .sum();
        self.length_left = self.current_length - self.wrapped_length;
    }

    /// Unit direction and distance from `position` to the last wrap point.
    pub fn anchor_offset(&self, position: Vec3) -> Option<(Vec3, f32)> {
        let anchor = self.last_point()?;
        let delta = anchor - position;
        Some((delta.normalize_or_zero(), delta.length()))
    }

    /// Moves the paid-out length toward `target` by at most `max_delta`.
    pub fn winch(&mut self, target: f32, max_delta: f32) {
        self.current_length = move_towards(self.current_length, target, max_delta);
        self.recalculate_length();
    }

    /// Sets the paid-out length so the rope is exactly taut at `position`.
    pub fn reanchor_to_taut(&mut self, position: Vec3) {
        if let Some((_, distance)) = self.anchor_offset(position) {
            self.current_length = self.wrapped_length + distance;
            self.recalculate_length();
            debug!("rope length reset to {:.2}", self.current_length);
        }
    }

    pub fn rebuild_line(&mut self, character: Vec3) {
        self.line.clear();
        if self.points.is_empty() {
            return;
        }
        self.line.extend(self.points.iter().map(|point| point.world));
        self.line.push(character);
    }
}

/// Clear when nothing blocks the segment, or the only hit grazes `to`.
fn has_line_of_sight(from: Vec3, to: Vec3, query: &dyn PhysicsQuery, epsilon: f32) -> bool {
    match query.linecast(from, to) {
        None => true,
        Some(hit) => hit.point.distance(to) <= epsilon,
    }
}

/// Inward acceleration of a rope stretched to `distance` with `length_left`
/// of slack budget.
pub fn tension_acceleration(distance: f32, length_left: f32, mass: f32, config: &RopeConfig) -> f32 {
    if distance <= length_left || mass <= 0.0 {
        return 0.0;
    }
    let coefficient = config.tension_stiffness / length_left.max(config.min_length);
    (coefficient * (distance - length_left) / mass).clamp(0.0, config.max_tension_acceleration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::testing::BoxWorld;

    const EPS: f32 = 1e-3;

    fn assert_length_invariant(rope: &RopeSimulator) {
        assert!(
            (rope.current_length() - rope.wrapped_length() - rope.length_left()).abs() < 1e-4,
            "{rope:?}"
        );
    }

    #[test]
    fn fire_at_wall_fifty_units_ahead() {
        let mut world = BoxWorld::new();
        let wall = world.add_box(Vec3::new(0.0, 0.0, -51.0), Vec3::new(5.0, 5.0, 1.0));
        let config = RopeConfig::default();
        let mut rope = RopeSimulator::default();

        assert!(rope.try_fire(Vec3::ZERO, Vec3::NEG_Z, &world, &config));
        assert!(rope.is_grappled());
        assert_eq!(rope.points().len(), 1);
        assert_eq!(rope.points()[0].surface, wall);
        assert!((rope.last_point().unwrap().distance(Vec3::ZERO) - 50.0).abs() < EPS);
        assert!((rope.length_left() - 50.0).abs() < EPS);
        assert_eq!(rope.line().len(), 2);
    }

    #[test]
    fn miss_leaves_rope_released() {
        let mut world = BoxWorld::new();
        world.add_box(Vec3::new(0.0, 0.0, -51.0), Vec3::new(5.0, 5.0, 1.0));
        let config = RopeConfig::default();
        let mut rope = RopeSimulator::default();

        assert!(!rope.try_fire(Vec3::ZERO, Vec3::Z, &world, &config));
        assert!(!rope.is_grappled());
        assert!(!rope.try_fire(Vec3::ZERO, Vec3::ZERO, &world, &config));
    }

    #[test]
    fn targets_beyond_max_length_are_unreachable() {
        let mut world = BoxWorld::new();
        world.add_box(Vec3::new(0.0, 0.0, -251.0), Vec3::new(5.0, 5.0, 1.0));
        let config = RopeConfig::default();
        assert!(RopeSimulator::probe_target(Vec3::ZERO, Vec3::NEG_Z, &world, &config).is_none());
    }

    #[test]
    fn release_is_idempotent() {
        let mut world = BoxWorld::new();
        world.add_box(Vec3::new(0.0, 0.0, -51.0), Vec3::new(5.0, 5.0, 1.0));
        let config = RopeConfig::default();
        let mut rope = RopeSimulator::default();
        rope.try_fire(Vec3::ZERO, Vec3::NEG_Z, &world, &config);

        rope.release();
        let once = rope.clone();
        rope.release();
        assert_eq!(rope, once);
        assert_eq!(rope, RopeSimulator::default());
    }

    #[test]
    fn anchors_follow_moving_surfaces_and_detect_loss() {
        let mut world = BoxWorld::new();
        let wall = world.add_box(Vec3::new(0.0, 0.0, -51.0), Vec3::new(5.0, 5.0, 1.0));
        let config = RopeConfig::default();
        let mut rope = RopeSimulator::default();
        rope.try_fire(Vec3::ZERO, Vec3::NEG_Z, &world, &config);

        world.move_box(wall, Vec3::new(2.0, 0.0, -51.0));
        assert!(rope.refresh_anchors(&world));
        assert!((rope.last_point().unwrap() - Vec3::new(2.0, 0.0, -50.0)).length() < EPS);

        world.remove(wall);
        assert!(!rope.refresh_anchors(&world));
    }

    #[test]
    fn tension_grows_with_stretch_until_clamped() {
        let config = RopeConfig {
            tension_stiffness: 1_000.0,
            ..RopeConfig::default()
        };
        let length_left = 10.0;
        assert_eq!(tension_acceleration(9.0, length_left, 70.0, &config), 0.0);
        assert_eq!(tension_acceleration(10.0, length_left, 70.0, &config), 0.0);

        let mut last = 0.0;
        for excess in [0.5, 1.0, 2.0, 4.0, 8.0] {
            let accel = tension_acceleration(length_left + excess, length_left, 70.0, &config);
            assert!(accel > last, "excess {excess}: {accel} <= {last}");
            last = accel;
        }
        let clamped = tension_acceleration(length_left + 1_000.0, length_left, 70.0, &config);
        assert_eq!(clamped, config.max_tension_acceleration);
    }

    #[test]
    fn overextended_rope_uses_minimum_length_coefficient() {
        let config = RopeConfig {
            tension_stiffness: 70.0,
            ..RopeConfig::default()
        };
        let accel = tension_acceleration(1.0, -1.0, 70.0, &config);
        assert!((accel - 2.0).abs() < EPS);
    }

    fn corner_world() -> (BoxWorld, Entity, Entity) {
        let mut world = BoxWorld::new();
        let anchor = world.add_box(Vec3::new(0.0, 10.0, 0.0), Vec3::splat(0.5));
        let obstacle = world.add_box(Vec3::new(2.0, 5.0, 0.0), Vec3::ONE);
        (world, anchor, obstacle)
    }

    #[test]
    fn swinging_past_a_corner_wraps_then_unwraps() {
        let (world, anchor, obstacle) = corner_world();
        let config = RopeConfig::default();
        let mut rope = RopeSimulator::default();
        assert!(rope.try_fire(Vec3::ZERO, Vec3::Y, &world, &config));
        assert_eq!(rope.points()[0].surface, anchor);

        let outward: Vec<f32> = (0..=60).map(|i| i as f32 * 0.1).collect();
        let mut first_wrap = None;
        for &x in &outward {
            rope.update_wrapping(Vec3::new(x, 0.0, 0.0), &world, &config);
            assert_length_invariant(&rope);
            if first_wrap.is_none() && rope.points().len() == 2 {
                first_wrap = Some(x);
            }
            assert!(rope.points().len() <= 2);
        }
        assert_eq!(rope.points().len(), 2);
        assert_eq!(rope.points()[1].surface, obstacle);
        let first_wrap = first_wrap.unwrap();
        assert!((first_wrap - 1.8).abs() < EPS);
        assert!(rope.wrapped_length() > 0.0);

        for &x in outward.iter().rev() {
            rope.update_wrapping(Vec3::new(x, 0.0, 0.0), &world, &config);
            assert_length_invariant(&rope);
            if x > 1.75 {
                assert_eq!(rope.points().len(), 2, "unwrapped early at {x}");
            }
        }
        assert_eq!(rope.points().len(), 1);
        assert_eq!(rope.wrapped_length(), 0.0);
    }

    #[test]
    fn winch_and_reanchor_keep_lengths_consistent() {
        let mut world = BoxWorld::new();
        world.add_box(Vec3::new(0.0, 0.0, -51.0), Vec3::new(5.0, 5.0, 1.0));
        let config = RopeConfig::default();
        let mut rope = RopeSimulator::default();
        rope.try_fire(Vec3::ZERO, Vec3::NEG_Z, &world, &config);

        rope.winch(config.min_length, 5.0);
        assert!((rope.current_length() - 45.0).abs() < EPS);
        assert_length_invariant(&rope);

        rope.reanchor_to_taut(Vec3::new(0.0, 0.0, -20.0));
        assert!((rope.length_left() - 30.0).abs() < EPS);
        assert_length_invariant(&rope);
    }
}
