use crate::{
    config::ControllerConfig,
    input::{InputBuffer, PlayerAction},
    movement::{CharacterStateMachine, ContactTracker, SurfaceSensor},
    physics::CharacterBody,
    types::*,
};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use leafwing_input_manager::prelude::*;

const SPAWN_POINT: Vec3 = Vec3::new(0.0, 3.0, 0.0);

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player)
            .add_systems(Update, log_state_changes);
    }
}

fn spawn_player(mut commands: Commands, config: Res<ControllerConfig>) {
    let body = &config.body;
    // Capsule half height excludes the hemispherical caps.
    let segment = (body.half_height - body.radius).max(0.0);

    commands.spawn((
        TransformBundle::from_transform(Transform::from_translation(SPAWN_POINT)),
        Player,
        RigidBody::Dynamic,
        Collider::capsule_y(segment, body.radius),
        ColliderMassProperties::Mass(body.mass),
        LockedAxes::ROTATION_LOCKED,
        Velocity::default(),
        GravityScale(0.0),
        Friction {
            coefficient: 0.0,
            combine_rule: CoefficientCombineRule::Min,
        },
        Ccd::enabled(),
        InputManagerBundle::<PlayerAction> {
            input_map: PlayerAction::default_input_map(),
            ..default()
        },
        InputBuffer::default(),
        (
            CharacterStateMachine::default(),
            SurfaceSensor::default(),
            ContactTracker::default(),
            CharacterBody::new(SPAWN_POINT, body.mass),
        ),
    ));
}

fn log_state_changes(mut events: EventReader<CharacterStateChanged>) {
    for event in events.read() {
        debug!("{:?} changed {:?} -> {:?}", event.entity, event.from, event.to);
    }
}
