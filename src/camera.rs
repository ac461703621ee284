use crate::{input::InputBuffer, movement::CharacterStateMachine, types::Player};
use bevy::prelude::*;

#[derive(Component)]
pub struct MainCamera {
    /// Eye position relative to the body origin.
    offset: Vec3,
    easing: f32,
    base_fov: f32,
    /// Extra degrees of FOV per unit of speed.
    fov_per_speed: f32,
    max_fov: f32,
}

impl Default for MainCamera {
    fn default() -> Self {
        MainCamera {
            offset: Vec3::new(0.0, 0.6, 0.0),
            easing: 20.0,
            base_fov: 75.0,
            fov_per_speed: 0.5,
            max_fov: 110.0,
        }
    }
}

impl MainCamera {
    pub fn fov_for_speed(&self, speed: f32) -> f32 {
        (self.base_fov + speed * self.fov_per_speed).min(self.max_fov)
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera3dBundle::default(), MainCamera::default()));
}

fn position_camera(
    time: Res<Time>,
    player_query: Query<(&Transform, &InputBuffer), (With<Player>, Without<MainCamera>)>,
    mut camera_query: Query<(&mut Transform, &MainCamera)>,
) {
    let Ok((player, input)) = player_query.get_single() else {
        return;
    };
    for (mut transform, camera) in &mut camera_query {
        let desired = player.translation + camera.offset;
        transform.translation = transform
            .translation
            .lerp(desired, (time.delta_seconds() * camera.easing).min(1.0));
        transform.rotation = input.peek().look_rotation();
    }
}

fn widen_with_speed(
    time: Res<Time>,
    player_query: Query<&CharacterStateMachine, With<Player>>,
    mut camera_query: Query<(&mut Projection, &MainCamera)>,
) {
    let Ok(machine) = player_query.get_single() else {
        return;
    };
    let speed = machine.velocity().length();
    for (mut projection, camera) in &mut camera_query {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            let target = camera.fov_for_speed(speed).to_radians();
            let blend = (time.delta_seconds() * 4.0).min(1.0);
            perspective.fov += (target - perspective.fov) * blend;
        }
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, (position_camera, widen_with_speed));
    }
}
