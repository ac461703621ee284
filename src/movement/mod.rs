use crate::config::ControllerConfig;
use crate::input::InputBuffer;
use crate::physics::rapier::{apply_body_to_rapier, sync_body_from_rapier, PhysicsQueries};
use crate::physics::CharacterBody;
use crate::types::*;
use bevy::prelude::*;

pub mod contact;
pub mod freefall;
pub mod grapple;
pub mod machine;
pub mod motion;
pub mod rope;
pub mod sensor;
pub mod slide;
pub mod timer;
pub mod walk;

pub use contact::ContactTracker;
pub use machine::CharacterStateMachine;
pub use sensor::SurfaceSensor;

use motion::MotionContext;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CharacterStateChanged>()
            .add_systems(
                FixedUpdate,
                (sync_body_from_rapier, contact::track_contacts, probe_surface)
                    .chain()
                    .in_set(EngineSystemSet::Sense),
            )
            .add_systems(
                FixedUpdate,
                drive_character.in_set(EngineSystemSet::CalculateMomentum),
            )
            .add_systems(
                FixedUpdate,
                apply_body_to_rapier.in_set(EngineSystemSet::ApplyMomentum),
            );
    }
}

fn probe_surface(
    gravity: Res<Gravity>,
    config: Res<ControllerConfig>,
    queries: PhysicsQueries,
    mut query: Query<(Entity, &CharacterBody, &mut SurfaceSensor)>,
) {
    for (entity, body, mut sensor) in &mut query {
        let physics = queries.excluding(entity);
        sensor.probe(body.position, gravity.direction(), &config, &physics);
    }
}

fn drive_character(
    time: Res<Time>,
    gravity: Res<Gravity>,
    config: Res<ControllerConfig>,
    queries: PhysicsQueries,
    mut state_changes: EventWriter<CharacterStateChanged>,
    mut query: Query<(
        Entity,
        &mut InputBuffer,
        &SurfaceSensor,
        &ContactTracker,
        &mut CharacterBody,
        &mut CharacterStateMachine,
    )>,
) {
    for (entity, mut buffer, sensor, contacts, mut body, mut machine) in &mut query {
        let input = buffer.take_snapshot();
        let physics = queries.excluding(entity);
        let before = machine.state();

        let mut ctx = MotionContext {
            input: &input,
            surface: sensor.current(),
            contact_normal: contacts.normal(),
            body: &mut body,
            query: &physics,
            config: &config,
            gravity: gravity.force(),
            now: time.elapsed_seconds_f64(),
            dt: time.delta_seconds(),
        };
        if let Err(err) = machine.tick(&mut ctx) {
            error!("{entity:?}: {err}");
            debug_assert!(false, "{err}");
        }

        if machine.state() != before {
            state_changes.send(CharacterStateChanged {
                entity,
                from: machine.previous_state(),
                to: machine.state(),
            });
        }
    }
}
