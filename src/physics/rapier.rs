use bevy::{ecs::system::SystemParam, prelude::*};
use bevy_rapier3d::prelude::*;

use super::body::CharacterBody;
use super::query::{PhysicsQuery, RayHit};

#[derive(SystemParam)]
pub struct PhysicsQueries<'w, 's> {
    context: Res<'w, RapierContext>,
    frames: Query<'w, 's, &'static GlobalTransform>,
    velocities: Query<'w, 's, &'static Velocity>,
}

impl<'w, 's> PhysicsQueries<'w, 's> {
    /// A query view that ignores `character`'s own body.
    pub fn excluding(&self, character: Entity) -> RapierQuery<'_, 'w, 's> {
        RapierQuery {
            queries: self,
            exclude: character,
        }
    }
}

pub struct RapierQuery<'a, 'w, 's> {
    queries: &'a PhysicsQueries<'w, 's>,
    exclude: Entity,
}

impl PhysicsQuery for RapierQuery<'_, '_, '_> {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let filter = QueryFilter::new()
            .exclude_rigid_body(self.exclude)
            .exclude_sensors();
        self.queries
            .context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
            .map(|(surface, intersection)| RayHit {
                point: intersection.point,
                normal: intersection.normal,
                distance: intersection.toi,
                surface,
            })
    }

    fn surface_frame(&self, surface: Entity) -> Option<bevy::math::Affine3A> {
        self.queries.frames.get(surface).ok().map(|frame| frame.affine())
    }

    fn point_velocity(&self, surface: Entity, point: Vec3) -> Vec3 {
        match (
            self.queries.velocities.get(surface),
            self.queries.frames.get(surface),
        ) {
            (Ok(velocity), Ok(frame)) => {
                velocity.linvel + velocity.angvel.cross(point - frame.translation())
            }
            _ => Vec3::ZERO,
        }
    }
}

pub fn sync_body_from_rapier(
    mut query: Query<(&Transform, &Velocity, &mut CharacterBody)>,
) {
    for (transform, velocity, mut body) in &mut query {
        body.position = transform.translation;
        body.rotation = transform.rotation;
        body.linear_velocity = velocity.linvel;
        body.angular_velocity = velocity.angvel;
    }
}

pub fn apply_body_to_rapier(
    mut query: Query<(
        &mut CharacterBody,
        &mut Velocity,
        &mut GravityScale,
        &mut RigidBody,
        &mut Transform,
    )>,
) {
    for (mut body, mut velocity, mut gravity_scale, mut rigid_body, mut transform) in &mut query {
        let desired = if body.kinematic {
            RigidBody::KinematicPositionBased
        } else {
            RigidBody::Dynamic
        };
        if *rigid_body != desired {
            *rigid_body = desired;
        }

        gravity_scale.0 = if body.gravity_enabled { 1.0 } else { 0.0 };
        velocity.linvel = body.linear_velocity;
        velocity.angvel = body.angular_velocity;

        let translation = body.take_translation();
        if body.kinematic && translation != Vec3::ZERO {
            transform.translation += translation;
        }
        if transform.rotation != body.rotation {
            transform.rotation = body.rotation;
        }
    }
}
