use bevy::{input::mouse::MouseMotion, prelude::*};
use leafwing_input_manager::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::config::ControllerConfig;

#[derive(Actionlike, PartialEq, Eq, Clone, Copy, Hash, Debug, Reflect)]
pub enum PlayerAction {
    Forward,
    Back,
    Left,
    Right,
    Sprint,
    Grapple,
    Retract,
    Extend,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 8] = [
        PlayerAction::Forward,
        PlayerAction::Back,
        PlayerAction::Left,
        PlayerAction::Right,
        PlayerAction::Sprint,
        PlayerAction::Grapple,
        PlayerAction::Retract,
        PlayerAction::Extend,
    ];

    pub const DIRECTIONS: [PlayerAction; 4] = [
        PlayerAction::Forward,
        PlayerAction::Back,
        PlayerAction::Left,
        PlayerAction::Right,
    ];

    fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Unit direction in look space (-Z forward) for the movement actions.
    pub fn local_direction(self) -> Vec3 {
        match self {
            PlayerAction::Forward => Vec3::NEG_Z,
            PlayerAction::Back => Vec3::Z,
            PlayerAction::Left => Vec3::NEG_X,
            PlayerAction::Right => Vec3::X,
            _ => Vec3::ZERO,
        }
    }

    pub fn default_input_map() -> InputMap<PlayerAction> {
        let mut input_map = InputMap::new([
            (KeyCode::W, PlayerAction::Forward),
            (KeyCode::S, PlayerAction::Back),
            (KeyCode::A, PlayerAction::Left),
            (KeyCode::D, PlayerAction::Right),
            (KeyCode::ShiftLeft, PlayerAction::Sprint),
            (KeyCode::Space, PlayerAction::Grapple),
            (KeyCode::E, PlayerAction::Retract),
            (KeyCode::Q, PlayerAction::Extend),
        ]);
        input_map.insert(MouseButton::Left, PlayerAction::Grapple);
        input_map.insert(MouseButton::Right, PlayerAction::Retract);
        input_map
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ActionSet(u16);

impl ActionSet {
    fn contains(self, action: PlayerAction) -> bool {
        self.0 & action.bit() != 0
    }

    fn insert(&mut self, action: PlayerAction) {
        self.0 |= action.bit();
    }

    fn set(&mut self, action: PlayerAction, value: bool) {
        if value {
            self.insert(action);
        } else {
            self.0 &= !action.bit();
        }
    }
}

/// One fixed tick worth of player input. Edges are those seen since the
/// previous snapshot was taken.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    held: ActionSet,
    pressed: ActionSet,
    released: ActionSet,
    double_tapped: ActionSet,
    pub look_delta: Vec2,
    /// Radians about world up.
    pub yaw: f32,
    /// Radians about the local right axis, within [-pi/2, pi/2].
    pub pitch: f32,
}

impl InputSnapshot {
    pub fn held(&self, action: PlayerAction) -> bool {
        self.held.contains(action)
    }

    pub fn just_pressed(&self, action: PlayerAction) -> bool {
        self.pressed.contains(action)
    }

    pub fn just_released(&self, action: PlayerAction) -> bool {
        self.released.contains(action)
    }

    pub fn double_tapped(&self, action: PlayerAction) -> bool {
        self.double_tapped.contains(action)
    }

    /// x is right minus left, y is forward minus back.
    pub fn move_axis(&self) -> Vec2 {
        let axis = |positive: PlayerAction, negative: PlayerAction| {
            (self.held(positive) as i8 - self.held(negative) as i8) as f32
        };
        Vec2::new(
            axis(PlayerAction::Right, PlayerAction::Left),
            axis(PlayerAction::Forward, PlayerAction::Back),
        )
    }

    /// Normalized movement intent in look space (-Z forward), zero when idle.
    pub fn local_step(&self) -> Vec3 {
        let axis = self.move_axis();
        Vec3::new(axis.x, 0.0, -axis.y).normalize_or_zero()
    }

    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Yaw applied first, then pitch.
    pub fn look_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    pub fn look_direction(&self) -> Vec3 {
        self.look_rotation() * Vec3::NEG_Z
    }
}

#[cfg(test)]
impl InputSnapshot {
    pub fn with_held(mut self, action: PlayerAction) -> Self {
        self.held.insert(action);
        self
    }

    pub fn with_pressed(mut self, action: PlayerAction) -> Self {
        self.held.insert(action);
        self.pressed.insert(action);
        self
    }

    pub fn with_released(mut self, action: PlayerAction) -> Self {
        self.held.set(action, false);
        self.released.insert(action);
        self
    }

    pub fn with_double_tap(mut self, action: PlayerAction) -> Self {
        self.double_tapped.insert(action);
        self
    }

    pub fn with_look(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
        self
    }
}

/// Collects input on the variable-rate tick and hands it to the fixed tick.
///
/// Press and release edges are latched until [`InputBuffer::take_snapshot`]
/// runs, so a frame that produces no fixed tick cannot swallow an edge.
#[derive(Component, Debug, Default, Clone)]
pub struct InputBuffer {
    pending: InputSnapshot,
    last_press: [Option<f64>; 4],
}

impl InputBuffer {
    pub fn record_held(&mut self, action: PlayerAction, held: bool) {
        self.pending.held.set(action, held);
    }

    pub fn record_press(&mut self, action: PlayerAction, now: f64, double_tap_window: f32) {
        self.pending.pressed.insert(action);
        if let Some(slot) = PlayerAction::DIRECTIONS.iter().position(|a| *a == action) {
            if let Some(previous) = self.last_press[slot] {
                if now - previous <= double_tap_window as f64 {
                    self.pending.double_tapped.insert(action);
                    self.last_press[slot] = None;
                    return;
                }
            }
            self.last_press[slot] = Some(now);
        }
    }

    pub fn record_release(&mut self, action: PlayerAction) {
        self.pending.released.insert(action);
    }

    pub fn record_look(&mut self, delta: Vec2, sensitivity: f32) {
        self.pending.look_delta += delta;
        self.pending.yaw -= delta.x * sensitivity;
        self.pending.pitch = (self.pending.pitch - delta.y * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Current look state, including input not yet consumed by a fixed tick.
    pub fn peek(&self) -> &InputSnapshot {
        &self.pending
    }

    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let snapshot = self.pending;
        self.pending.pressed = ActionSet::default();
        self.pending.released = ActionSet::default();
        self.pending.double_tapped = ActionSet::default();
        self.pending.look_delta = Vec2::ZERO;
        snapshot
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<PlayerAction>::default())
            .add_systems(Update, collect_input);
    }
}

fn collect_input(
    time: Res<Time>,
    config: Res<ControllerConfig>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut query: Query<(&ActionState<PlayerAction>, &mut InputBuffer)>,
) {
    let look_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let now = time.elapsed_seconds_f64();

    for (action_state, mut buffer) in &mut query {
        for action in PlayerAction::ALL {
            buffer.record_held(action, action_state.pressed(action));
            if action_state.just_pressed(action) {
                buffer.record_press(action, now, config.input.double_tap_window);
            }
            if action_state.just_released(action) {
                buffer.record_release(action);
            }
        }
        buffer.record_look(look_delta, config.input.mouse_sensitivity);
    }
}
