use crate::{movement::CharacterStateMachine, types::Player};
use bevy::prelude::*;

const ROPE_COLOR: Color = Color::rgb(0.85, 0.75, 0.55);
const RETICLE_RADIUS: f32 = 0.25;
const WRAP_POINT_RADIUS: f32 = 0.1;

/// Debug drawing of the rope and the grapple reticle.
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (draw_rope, draw_reticle));
    }
}

fn draw_rope(mut gizmos: Gizmos, query: Query<&CharacterStateMachine, With<Player>>) {
    for machine in &query {
        let rope = machine.rope();
        let line = rope.line();
        if line.len() >= 2 {
            gizmos.linestrip(line.iter().copied(), ROPE_COLOR);
        }
        for point in rope.points() {
            gizmos.sphere(point.world, Quat::IDENTITY, WRAP_POINT_RADIUS, ROPE_COLOR);
        }
    }
}

fn draw_reticle(mut gizmos: Gizmos, query: Query<&CharacterStateMachine, With<Player>>) {
    for machine in &query {
        let reach = machine.reach();
        let color = if reach.reachable {
            Color::RED
        } else {
            Color::BLUE
        };
        gizmos.sphere(reach.point, Quat::IDENTITY, RETICLE_RADIUS, color);
    }
}
