//! Static tuning values, read once at startup.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} of {value} seconds is out of range")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("move scale must be greater than zero, got {0}")]
    ScaleNotPositive(f64),
    #[error("acceleration max multiplier must be at least 1.0, got {0}")]
    MaxMultiplierTooSmall(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Acceleration {
    pub enabled: bool,
    pub factor: f64,
    pub max_multiplier: f64,
    /// Batches closer together than this never update the speed estimate.
    pub min_time_delta: Duration,
}

impl Default for Acceleration {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 0.5,
            max_multiplier: 3.0,
            min_time_delta: Duration::from_millis(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Natural scrolling: wheel ticks are negated.
    pub invert_scroll: bool,
    /// Longest primary-finger touch that still counts as a tap.
    pub click_time: Duration,
    /// Longest secondary-finger touch that still counts as a right click.
    pub right_click_tap: Duration,
    /// Window in which a second tap turns into a drag.
    pub double_click_timeout: Duration,
    /// Per-batch average motion (device units) below which nothing moves.
    pub move_threshold: f64,
    /// Per-batch average motion (device units) needed for one wheel tick.
    pub scroll_threshold: f64,
    pub move_scale: f64,
    pub x_multiplier: f64,
    pub y_multiplier: f64,
    pub swap_axes: bool,
    pub acceleration: Acceleration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            invert_scroll: true,
            click_time: Duration::from_millis(250),
            right_click_tap: Duration::from_millis(200),
            double_click_timeout: Duration::from_millis(400),
            move_threshold: 1.0,
            scroll_threshold: 8.0,
            move_scale: 0.35,
            x_multiplier: 1.0,
            y_multiplier: 1.0,
            swap_axes: false,
            acceleration: Acceleration::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("move threshold", self.move_threshold),
            ("scroll threshold", self.scroll_threshold),
            ("move scale", self.move_scale),
            ("x multiplier", self.x_multiplier),
            ("y multiplier", self.y_multiplier),
            ("acceleration factor", self.acceleration.factor),
            ("acceleration max multiplier", self.acceleration.max_multiplier),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }

        for (name, value) in [
            ("move threshold", self.move_threshold),
            ("scroll threshold", self.scroll_threshold),
            ("acceleration factor", self.acceleration.factor),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }

        if self.move_scale <= 0.0 {
            return Err(ConfigError::ScaleNotPositive(self.move_scale));
        }
        if self.acceleration.max_multiplier < 1.0 {
            return Err(ConfigError::MaxMultiplierTooSmall(
                self.acceleration.max_multiplier,
            ));
        }
        Ok(())
    }
}

/// Convert a CLI value in seconds, rejecting what `Duration` cannot hold.
pub fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::OutOfRange { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_finite_multiplier() {
        let config = Config {
            x_multiplier: f64::NAN,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite {
                name: "x multiplier",
                ..
            })
        ));
    }

    #[test]
    fn negative_multiplier_inverts_instead_of_failing() {
        let config = Config {
            x_multiplier: -1.0,
            y_multiplier: -1.0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_scale_and_small_cap() {
        let config = Config {
            move_scale: 0.0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ScaleNotPositive(0.0)));

        let mut config = Config::default();
        config.acceleration.max_multiplier = 0.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MaxMultiplierTooSmall(0.5))
        );
    }

    #[test]
    fn seconds_conversion() {
        assert_eq!(seconds("click time", 0.25), Ok(Duration::from_millis(250)));
        assert!(seconds("click time", -0.1).is_err());
        assert!(seconds("click time", f64::INFINITY).is_err());
        assert_eq!(
            seconds("click time", 1e20),
            Err(ConfigError::OutOfRange {
                name: "click time",
                value: 1e20
            })
        );
    }
}
