//! Vector helpers shared by the motion states.
//!
//! Anything that normalises treats a near-zero input as "no direction" and
//! yields zero instead of NaN.

use bevy::math::{Quat, Vec3};

/// Removes the component of `v` along `normal`. A zero normal leaves `v` as is.
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    v - n * v.dot(n)
}

/// Strips the part of `v` that pushes into a contact surface.
pub fn deflect_from_contact(v: Vec3, contact_normal: Vec3) -> Vec3 {
    if contact_normal.length_squared() > 0.0 && contact_normal.dot(v) < 0.0 {
        project_on_plane(v, contact_normal)
    } else {
        v
    }
}

/// Quadratic air drag deceleration for a body of `mass`.
pub fn quadratic_drag(velocity: Vec3, coefficient: f32, mass: f32) -> Vec3 {
    if mass <= 0.0 {
        return Vec3::ZERO;
    }
    velocity.normalize_or_zero() * (coefficient * velocity.length_squared() / 2.0) / mass
}

pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

pub fn move_towards_vec(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Turns `from` toward `to` by at most `max_radians`.
pub fn rotate_towards(from: Quat, to: Quat, max_radians: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_radians || angle <= f32::EPSILON {
        to
    } else {
        from.slerp(to, max_radians / angle)
    }
}

/// Rotation about world up that points -Z along the horizontal part of
/// `direction`. `None` when `direction` has no horizontal extent.
pub fn yaw_facing(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= 1e-8 {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Shortest rotation taking `from` onto `to`; identity if either is degenerate.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    match (from.try_normalize(), to.try_normalize()) {
        (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
        _ => Quat::IDENTITY,
    }
}
