//! Tuning constants for the character controller.
//!
//! Every number the motion states use lives here so it can be tweaked from the
//! inspector at runtime. Defaults form one consistent set tuned for a 70 kg
//! character at a 60 Hz fixed step.

use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("rope min length {min} must be below max length {max}")]
    RopeLengthRange { min: f32, max: f32 },
    #[error("ground threshold {threshold} must exceed float height {float_height}")]
    IncompatibleThreshold { threshold: f32, float_height: f32 },
}

#[derive(Resource, Reflect, Debug, Clone, Default)]
#[reflect(Resource)]
pub struct ControllerConfig {
    pub body: BodyConfig,
    pub sensor: SensorConfig,
    pub walk: WalkConfig,
    pub air: AirConfig,
    pub rope: RopeConfig,
    pub slide: SlideConfig,
    pub input: InputConfig,
}

#[derive(Reflect, Debug, Clone)]
pub struct BodyConfig {
    pub mass: f32,
    /// Distance from the body origin down to the feet.
    pub half_height: f32,
    pub radius: f32,
    /// Safety bound on speed, stops integration blow-ups on long frames.
    pub max_speed: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 70.0,
            half_height: 0.9,
            radius: 0.4,
            max_speed: 100.0,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct SensorConfig {
    /// Clearance kept between the feet and the ground while walking.
    pub float_height: f32,
    /// Probe reaches `float_height * probe_multiple` below the feet.
    pub probe_multiple: f32,
    /// Separation below which the character counts as grounded.
    pub ground_threshold: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            float_height: 0.3,
            probe_multiple: 4.0,
            ground_threshold: 0.5,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct WalkConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Fraction of the gap to the target velocity closed each tick.
    pub blend: f32,
    pub max_incline_degrees: f32,
    pub downhill_speed: f32,
    pub downhill_blend: f32,
    /// Vertical speed per metre of float-height error.
    pub height_correction: f32,
    pub turn_rate_degrees: f32,
    /// Planar speeds below this snap to rest.
    pub rest_speed: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 8.0,
            blend: 0.2,
            max_incline_degrees: 30.0,
            downhill_speed: 10.0,
            downhill_blend: 0.1,
            height_correction: 10.0,
            turn_rate_degrees: 600.0,
            rest_speed: 0.1,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct AirConfig {
    pub strafe_acceleration: f32,
    pub sprint_strafe_acceleration: f32,
    /// `k` in `k * |v|^2 / 2`.
    pub drag_coefficient: f32,
    pub turn_rate_degrees: f32,
    /// Angular speed removed per tick.
    pub angular_damping: f32,
    pub dash_speed: f32,
    pub dash_cooldown: f32,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            strafe_acceleration: 7.0,
            sprint_strafe_acceleration: 10.0,
            drag_coefficient: 0.5,
            turn_rate_degrees: 120.0,
            angular_damping: 0.05,
            dash_speed: 12.0,
            dash_cooldown: 1.0,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct RopeConfig {
    pub max_length: f32,
    pub min_length: f32,
    /// `K` in `K / length_left`.
    pub tension_stiffness: f32,
    pub max_tension_acceleration: f32,
    pub retract_speed: f32,
    /// Extra speed toward the anchor while retracting.
    pub retract_pull: f32,
    /// Minimum distance between a new wrap point and the previous one.
    pub wrap_epsilon: f32,
    /// How far wrap points are pushed off the surface they catch on.
    pub wrap_offset: f32,
    pub refire_cooldown: f32,
    pub turn_rate_degrees: f32,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            max_length: 200.0,
            min_length: 1.0,
            tension_stiffness: 3.0e7,
            max_tension_acceleration: 60.0,
            retract_speed: 30.0,
            retract_pull: 10.0,
            wrap_epsilon: 0.1,
            wrap_offset: 0.05,
            refire_cooldown: 0.2,
            turn_rate_degrees: 600.0,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct SlideConfig {
    pub speed: f32,
    pub blend: f32,
    /// Fraction of the float-height error removed per tick.
    pub height_correction: f32,
    /// Route slopes steeper than `walk.max_incline_degrees` to the slide
    /// state instead of the walk state's downhill branch.
    pub slide_on_steep: bool,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            blend: 0.1,
            height_correction: 0.2,
            slide_on_steep: false,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct InputConfig {
    /// Radians of look rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Seconds between two presses that count as a double tap.
    pub double_tap_window: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.003,
            double_tap_window: 0.25,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("body.mass", self.body.mass)?;
        positive("body.half_height", self.body.half_height)?;
        positive("body.max_speed", self.body.max_speed)?;
        positive("sensor.float_height", self.sensor.float_height)?;
        positive("sensor.probe_multiple", self.sensor.probe_multiple)?;
        positive("rope.min_length", self.rope.min_length)?;
        positive("rope.tension_stiffness", self.rope.tension_stiffness)?;
        positive("rope.wrap_epsilon", self.rope.wrap_epsilon)?;
        positive("input.double_tap_window", self.input.double_tap_window)?;

        if self.rope.min_length >= self.rope.max_length {
            return Err(ConfigError::RopeLengthRange {
                min: self.rope.min_length,
                max: self.rope.max_length,
            });
        }
        if self.sensor.ground_threshold <= self.sensor.float_height {
            return Err(ConfigError::IncompatibleThreshold {
                threshold: self.sensor.ground_threshold,
                float_height: self.sensor.float_height,
            });
        }
        Ok(())
    }

    /// Length of the downward surface probe measured from the body origin.
    pub fn probe_distance(&self) -> f32 {
        self.body.half_height + self.sensor.float_height * self.sensor.probe_multiple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_rope_range() {
        let mut config = ControllerConfig::default();
        config.rope.min_length = 300.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RopeLengthRange {
                min: 300.0,
                max: 200.0
            })
        );
    }

    #[test]
    fn rejects_zero_mass() {
        let mut config = ControllerConfig::default();
        config.body.mass = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "body.mass",
                ..
            })
        ));
    }

    #[test]
    fn ground_threshold_must_clear_float_height() {
        let mut config = ControllerConfig::default();
        config.sensor.ground_threshold = 0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IncompatibleThreshold { .. })
        ));
    }

    #[test]
    fn probe_reaches_below_float_height() {
        let config = ControllerConfig::default();
        assert!(config.probe_distance() > config.body.half_height + config.sensor.ground_threshold);
    }
}
