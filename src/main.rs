use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_inspector_egui::quick::{ResourceInspectorPlugin, WorldInspectorPlugin};
use bevy_rapier3d::prelude::*;

mod camera;
mod config;
mod input;
mod math;
mod movement;
mod overlay;
mod physics;
mod player;
mod types;

use config::{ConfigError, ControllerConfig};
use types::*;

fn main() -> Result<(), ConfigError> {
    let config = ControllerConfig::default();
    config.validate()?;

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(RapierDebugRenderPlugin::default())
        .add_plugins(WorldInspectorPlugin::new())
        .add_plugins(ResourceInspectorPlugin::<ControllerConfig>::default())
        .add_plugins((
            input::InputPlugin,
            movement::MovementPlugin,
            player::PlayerPlugin,
            camera::CameraPlugin,
            overlay::OverlayPlugin,
        ))
        .register_type::<ControllerConfig>()
        .register_type::<config::BodyConfig>()
        .register_type::<config::SensorConfig>()
        .register_type::<config::WalkConfig>()
        .register_type::<config::AirConfig>()
        .register_type::<config::RopeConfig>()
        .register_type::<config::SlideConfig>()
        .register_type::<config::InputConfig>()
        .register_type::<Gravity>()
        .insert_resource(Time::<Fixed>::from_seconds(1.0 / 60.0))
        .insert_resource(Gravity::default())
        .insert_resource(config)
        .configure_sets(
            FixedUpdate,
            (
                EngineSystemSet::Sense,
                EngineSystemSet::CalculateMomentum,
                EngineSystemSet::ApplyMomentum,
            )
                .chain(),
        )
        .add_systems(Startup, (setup, grab_cursor))
        .add_systems(Update, sync_gravity)
        .run();

    Ok(())
}

fn sync_gravity(gravity: Res<Gravity>, mut rapier_config: ResMut<RapierConfiguration>) {
    if gravity.is_changed() {
        rapier_config.gravity = gravity.force();
    }
}

fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = windows.get_single_mut() {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    }
}

fn spawn_block(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    center: Vec3,
    half_extents: Vec3,
) {
    let size = half_extents * 2.0;
    commands.spawn((
        PbrBundle {
            material,
            mesh: meshes.add(shape::Box::new(size.x, size.y, size.z).into()),
            transform: Transform::from_translation(center),
            ..default()
        },
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        RigidBody::Fixed,
    ));
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground = materials.add(Color::WHITE.into());
    let stone = materials.add(Color::GRAY.into());
    let beam = materials.add(Color::ORANGE_RED.into());

    spawn_block(
        &mut commands,
        &mut meshes,
        ground,
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(100.0, 0.5, 100.0),
    );

    // Pillars to swing around.
    for (x, z) in [(-20.0, -30.0), (15.0, -45.0), (-5.0, -70.0), (25.0, -90.0)] {
        spawn_block(
            &mut commands,
            &mut meshes,
            stone.clone(),
            Vec3::new(x, 15.0, z),
            Vec3::new(2.0, 15.0, 2.0),
        );
    }

    // Overhead beams to hang from.
    for z in [-20.0, -55.0, -85.0] {
        spawn_block(
            &mut commands,
            &mut meshes,
            beam.clone(),
            Vec3::new(0.0, 35.0, z),
            Vec3::new(40.0, 1.0, 1.5),
        );
    }

    // A ramp too steep to walk up.
    commands.spawn((
        PbrBundle {
            material: stone,
            mesh: meshes.add(shape::Box::new(10.0, 1.0, 30.0).into()),
            transform: Transform::from_translation(Vec3::new(40.0, 5.0, 10.0))
                .with_rotation(Quat::from_rotation_x(40f32.to_radians())),
            ..default()
        },
        Collider::cuboid(5.0, 0.5, 15.0),
        RigidBody::Fixed,
    ));

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.4, 0.0)),
        ..default()
    });
}
