use bevy::prelude::*;

#[derive(Resource, Reflect, Debug, Clone, Copy)]
#[reflect(Resource)]
pub struct Gravity {
    force: Vec3,
}

impl Gravity {
    pub fn new(force: Vec3) -> Self {
        Gravity { force }
    }

    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Unit vector along gravity. Falls back to world down for a zero force.
    pub fn direction(&self) -> Vec3 {
        self.force.try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::new(Vec3::new(0.0, -9.81, 0.0))
    }
}

#[derive(Component)]
pub struct Player;

/// Motion modes of the character. `Jumping` and `Flying` have no motion
/// registered and are never selected by the state machine.
#[derive(Reflect, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterState {
    #[default]
    None,
    Freefalling,
    Sliding,
    Walking,
    Jumping,
    Grappling,
    Flying,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineSystemSet {
    Sense,
    CalculateMomentum,
    ApplyMomentum,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterStateChanged {
    pub entity: Entity,
    pub from: CharacterState,
    pub to: CharacterState,
}
