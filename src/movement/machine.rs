use bevy::prelude::*;
use thiserror::Error;

use crate::input::PlayerAction;
use crate::types::CharacterState;

use super::freefall::Freefall;
use super::grapple::Grapple;
use super::motion::{Motion, MotionContext};
use super::rope::RopeSimulator;
use super::slide::Slide;
use super::timer::ScheduledTimer;
use super::walk::Walk;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MotionError {
    #[error("no motion registered for {0:?}")]
    MissingMotion(CharacterState),
}

/// One persistent instance per motion mode.
#[derive(Debug, Default, Clone)]
pub struct MotionTable {
    pub freefall: Freefall,
    pub walk: Walk,
    pub grapple: Grapple,
    pub slide: Slide,
}

impl MotionTable {
    pub fn get(&self, state: CharacterState) -> Option<&dyn Motion> {
        match state {
            CharacterState::Freefalling => Some(&self.freefall),
            CharacterState::Walking => Some(&self.walk),
            CharacterState::Grappling => Some(&self.grapple),
            CharacterState::Sliding => Some(&self.slide),
            CharacterState::None | CharacterState::Jumping | CharacterState::Flying => None,
        }
    }

    pub fn get_mut(&mut self, state: CharacterState) -> Option<&mut dyn Motion> {
        match state {
            CharacterState::Freefalling => Some(&mut self.freefall),
            CharacterState::Walking => Some(&mut self.walk),
            CharacterState::Grappling => Some(&mut self.grapple),
            CharacterState::Sliding => Some(&mut self.slide),
            CharacterState::None | CharacterState::Jumping | CharacterState::Flying => None,
        }
    }
}

/// Whether a grapple fired along the current look direction would attach.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Reachability {
    pub reachable: bool,
    /// The would-be anchor, or the end of the rope's range on a miss.
    pub point: Vec3,
}

#[derive(Component, Debug, Default, Clone)]
pub struct CharacterStateMachine {
    current: CharacterState,
    previous: CharacterState,
    motions: MotionTable,
    refire_cooldown: ScheduledTimer,
    reach: Reachability,
}

impl CharacterStateMachine {
    pub fn state(&self) -> CharacterState {
        self.current
    }

    pub fn previous_state(&self) -> CharacterState {
        self.previous
    }

    pub fn rope(&self) -> &RopeSimulator {
        self.motions.grapple.rope()
    }

    pub fn reach(&self) -> Reachability {
        self.reach
    }

    /// Velocity of the active motion, zero when none is active.
    pub fn velocity(&self) -> Vec3 {
        self.motions
            .get(self.current)
            .map_or(Vec3::ZERO, |motion| motion.velocity())
    }

    /// Ends the active motion and begins `target` with the outgoing velocity.
    pub fn transition_to(
        &mut self,
        target: CharacterState,
        ctx: &mut MotionContext,
    ) -> Result<(), MotionError> {
        if target == self.current {
            return Ok(());
        }
        if self.motions.get(target).is_none() {
            return Err(MotionError::MissingMotion(target));
        }

        let old_velocity = match self.motions.get_mut(self.current) {
            Some(outgoing) => {
                let velocity = outgoing.velocity();
                outgoing.end(ctx.body);
                velocity
            }
            None => ctx.body.linear_velocity,
        };
        self.motions
            .get_mut(target)
            .ok_or(MotionError::MissingMotion(target))?
            .begin(old_velocity, ctx);

        self.previous = self.current;
        self.current = target;
        info!("{:?} => {:?}", self.previous, self.current);
        Ok(())
    }

    /// Runs one fixed tick: picks the state, then processes it.
    pub fn tick(&mut self, ctx: &mut MotionContext) -> Result<(), MotionError> {
        self.refire_cooldown.fired(ctx.now);

        let target = self.select_state(ctx);
        self.transition_to(target, ctx)?;

        let current = self.current;
        self.motions
            .get_mut(current)
            .ok_or(MotionError::MissingMotion(current))?
            .process(ctx);

        self.update_reach(ctx);
        Ok(())
    }

    fn select_state(&mut self, ctx: &mut MotionContext) -> CharacterState {
        let grappling = self.current == CharacterState::Grappling;

        if !grappling
            && ctx.input.just_pressed(PlayerAction::Grapple)
            && !self.refire_cooldown.is_armed()
            && self.fire(ctx)
        {
            if ctx.input.held(PlayerAction::Grapple)
                || !ctx.input.just_released(PlayerAction::Grapple)
            {
                return CharacterState::Grappling;
            }
            // Pressed and let go between two fixed ticks.
            self.motions.grapple.rope_mut().release();
            self.refire_cooldown
                .schedule(ctx.now, ctx.config.rope.refire_cooldown);
            debug!("grapple tapped, released on the firing tick");
        }
        if !grappling {
            return self.ground_state(ctx);
        }

        if ctx.input.just_released(PlayerAction::Grapple) {
            self.motions.grapple.rope_mut().release();
            info!("grapple released");
        }
        if self.motions.grapple.rope().is_grappled() {
            CharacterState::Grappling
        } else {
            self.refire_cooldown
                .schedule(ctx.now, ctx.config.rope.refire_cooldown);
            self.ground_state(ctx)
        }
    }

    fn fire(&mut self, ctx: &MotionContext) -> bool {
        let origin = ctx.body.position;
        let direction = ctx.input.look_direction();
        self.motions
            .grapple
            .rope_mut()
            .try_fire(origin, direction, ctx.query, &ctx.config.rope)
    }

    fn ground_state(&self, ctx: &MotionContext) -> CharacterState {
        let surface = ctx.surface;
        if surface.separation >= ctx.config.sensor.ground_threshold {
            return CharacterState::Freefalling;
        }
        let too_steep = surface.incline_degrees(ctx.up()) > ctx.config.walk.max_incline_degrees;
        if ctx.config.slide.slide_on_steep && too_steep {
            CharacterState::Sliding
        } else {
            CharacterState::Walking
        }
    }

    fn update_reach(&mut self, ctx: &MotionContext) {
        let origin = ctx.body.position;
        let direction = ctx.input.look_direction();
        self.reach = match RopeSimulator::probe_target(origin, direction, ctx.query, &ctx.config.rope) {
            Some(hit) => Reachability {
                reachable: true,
                point: hit.point,
            },
            None => Reachability {
                reachable: false,
                point: origin + direction * ctx.config.rope.max_length,
            },
        };
    }
}
