//! Axis-aligned box world for exercising the controller without rapier.

use bevy::math::{Affine3A, Vec3};
use bevy::prelude::Entity;

use super::query::{PhysicsQuery, RayHit};

struct TestBox {
    surface: Entity,
    center: Vec3,
    half_extents: Vec3,
    velocity: Vec3,
}

#[derive(Default)]
pub struct BoxWorld {
    boxes: Vec<TestBox>,
    next_id: u32,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> Entity {
        let surface = Entity::from_raw(self.next_id);
        self.next_id += 1;
        self.boxes.push(TestBox {
            surface,
            center,
            half_extents,
            velocity: Vec3::ZERO,
        });
        surface
    }

    pub fn set_velocity(&mut self, surface: Entity, velocity: Vec3) {
        if let Some(found) = self.boxes.iter_mut().find(|b| b.surface == surface) {
            found.velocity = velocity;
        }
    }

    pub fn move_box(&mut self, surface: Entity, center: Vec3) {
        if let Some(found) = self.boxes.iter_mut().find(|b| b.surface == surface) {
            found.center = center;
        }
    }

    pub fn remove(&mut self, surface: Entity) {
        self.boxes.retain(|b| b.surface != surface);
    }
}

fn ray_box(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if near > t_enter {
            t_enter = near;
            normal = Vec3::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(far);
    }

    if t_exit < 0.0 || t_enter > t_exit {
        return None;
    }
    if t_enter < 0.0 {
        return Some((0.0, -direction));
    }
    Some((t_enter, normal))
}

impl PhysicsQuery for BoxWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.boxes
            .iter()
            .filter_map(|b| {
                let (distance, normal) = ray_box(
                    origin,
                    direction,
                    b.center - b.half_extents,
                    b.center + b.half_extents,
                )?;
                (distance <= max_distance).then(|| RayHit {
                    point: origin + direction * distance,
                    normal,
                    distance,
                    surface: b.surface,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn surface_frame(&self, surface: Entity) -> Option<Affine3A> {
        self.boxes
            .iter()
            .find(|b| b.surface == surface)
            .map(|b| Affine3A::from_translation(b.center))
    }

    fn point_velocity(&self, surface: Entity, _point: Vec3) -> Vec3 {
        self.boxes
            .iter()
            .find(|b| b.surface == surface)
            .map_or(Vec3::ZERO, |b| b.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_reports_entry_face() {
        let mut world = BoxWorld::new();
        let wall = world.add_box(Vec3::new(0.0, 0.0, -11.0), Vec3::ONE);
        let hit = world.raycast(Vec3::ZERO, Vec3::NEG_Z, 100.0).unwrap();
        assert_eq!(hit.surface, wall);
        assert!((hit.distance - 10.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn ray_respects_max_distance_and_misses() {
        let mut world = BoxWorld::new();
        world.add_box(Vec3::new(0.0, 0.0, -11.0), Vec3::ONE);
        assert!(world.raycast(Vec3::ZERO, Vec3::NEG_Z, 5.0).is_none());
        assert!(world.raycast(Vec3::ZERO, Vec3::Z, 100.0).is_none());
        assert!(world.raycast(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z, 100.0).is_none());
    }

    #[test]
    fn nearest_box_wins() {
        let mut world = BoxWorld::new();
        world.add_box(Vec3::new(0.0, -20.0, 0.0), Vec3::ONE);
        let near = world.add_box(Vec3::new(0.0, -5.0, 0.0), Vec3::ONE);
        let hit = world.raycast(Vec3::ZERO, Vec3::NEG_Y, 100.0).unwrap();
        assert_eq!(hit.surface, near);
    }
}
