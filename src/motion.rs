//! Turns averaged per-batch deltas into wheel ticks and relative motion.

use crate::config::Config;
use crate::tracker::BatchDelta;
use std::time::{Duration, Instant};

/// Weight of the newest sample in the smoothed speed.
const SPEED_ALPHA: f64 = 0.3;

/// Average movement of the contacts that contributed to a batch.
pub fn average(delta: &BatchDelta) -> Option<(f64, f64)> {
    if delta.contributors == 0 {
        return None;
    }
    let count = delta.contributors as f64;
    Some((delta.sum_dx as f64 / count, delta.sum_dy as f64 / count))
}

pub fn exceeds_threshold(config: &Config, (dx, dy): (f64, f64)) -> bool {
    dx.abs() > config.move_threshold || dy.abs() > config.move_threshold
}

/// One wheel tick when the scroll axis moved far enough.
pub fn scroll_tick(config: &Config, (dx, dy): (f64, f64)) -> Option<i32> {
    let value = if config.swap_axes { dx } else { dy };
    if value.abs() <= config.scroll_threshold {
        return None;
    }
    let tick = if value < 0.0 { -1 } else { 1 };
    Some(if config.invert_scroll { -tick } else { tick })
}

#[derive(Debug)]
pub struct MotionProcessor {
    last_processed: Instant,
    smoothed_speed: f64,
}

impl MotionProcessor {
    pub fn new(now: Instant) -> Self {
        Self {
            last_processed: now,
            smoothed_speed: 0.0,
        }
    }

    #[cfg(test)]
    pub fn smoothed_speed(&self) -> f64 {
        self.smoothed_speed
    }

    #[cfg(test)]
    pub fn last_processed(&self) -> Instant {
        self.last_processed
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_processed)
    }

    /// Only batches that carried motion move the clock, so acceleration
    /// measures time between real movements.
    pub fn mark_processed(&mut self, now: Instant) {
        self.last_processed = now;
    }

    /// Cursor motion for a single-contact batch.
    pub fn pointer_motion(
        &mut self,
        config: &Config,
        (dx, dy): (f64, f64),
        elapsed: Duration,
    ) -> (i32, i32) {
        let (raw_x, raw_y) = if config.swap_axes { (dy, dx) } else { (dx, dy) };
        let multiplier = self.acceleration(config, raw_x, raw_y, elapsed);

        // `as` truncates toward zero, which is what relative axes expect
        let x = (raw_x * config.move_scale * config.x_multiplier * multiplier) as i32;
        let y = (raw_y * config.move_scale * config.y_multiplier * multiplier) as i32;
        (x, y)
    }

    fn acceleration(&mut self, config: &Config, raw_x: f64, raw_y: f64, elapsed: Duration) -> f64 {
        let accel = &config.acceleration;
        if !accel.enabled || elapsed <= accel.min_time_delta {
            return 1.0;
        }

        let speed = raw_x.hypot(raw_y) / elapsed.as_secs_f64();
        self.smoothed_speed = self.smoothed_speed * (1.0 - SPEED_ALPHA) + speed * SPEED_ALPHA;
        (1.0 + self.smoothed_speed * accel.factor).min(accel.max_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Acceleration;

    fn flat() -> Config {
        Config {
            acceleration: Acceleration {
                enabled: false,
                ..Acceleration::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn average_divides_by_contributors() {
        let delta = BatchDelta {
            sum_dx: 10,
            sum_dy: -20,
            contributors: 2,
            active: 3,
        };
        assert_eq!(average(&delta), Some((5.0, -10.0)));
        assert_eq!(average(&BatchDelta::default()), None);
    }

    #[test]
    fn threshold_is_exclusive() {
        let config = Config::default();
        assert!(!exceeds_threshold(&config, (1.0, -1.0)));
        assert!(exceeds_threshold(&config, (0.0, -1.5)));
    }

    #[test]
    fn unaccelerated_motion_is_scaled_and_truncated() {
        let config = Config {
            move_scale: 0.5,
            x_multiplier: 1.0,
            y_multiplier: -2.0,
            ..flat()
        };
        let mut motion = MotionProcessor::new(Instant::now());
        assert_eq!(
            motion.pointer_motion(&config, (7.0, 6.0), Duration::from_millis(10)),
            (3, -6)
        );
        assert_eq!(
            motion.pointer_motion(&config, (-7.0, 0.0), Duration::from_millis(10)),
            (-3, 0)
        );
        assert_eq!(motion.smoothed_speed(), 0.0);
    }

    #[test]
    fn swap_exchanges_axes_before_scaling() {
        let config = Config {
            move_scale: 1.0,
            swap_axes: true,
            ..flat()
        };
        let mut motion = MotionProcessor::new(Instant::now());
        assert_eq!(
            motion.pointer_motion(&config, (5.0, 0.0), Duration::from_millis(10)),
            (0, 5)
        );
    }

    #[test]
    fn acceleration_smooths_and_caps() {
        let mut config = Config {
            move_scale: 1.0,
            ..Config::default()
        };
        config.acceleration.factor = 0.01;
        config.acceleration.max_multiplier = 100.0;
        let mut motion = MotionProcessor::new(Instant::now());

        // 3-4-5 triangle over 50 ms: 100 units/s, smoothed to 30
        let (x, y) = motion.pointer_motion(&config, (3.0, 4.0), Duration::from_millis(50));
        assert!((motion.smoothed_speed() - 30.0).abs() < 1e-9);
        // multiplier 1.3
        assert_eq!((x, y), (3, 5));

        config.acceleration.max_multiplier = 2.0;
        let (x, _) = motion.pointer_motion(&config, (300.0, 400.0), Duration::from_millis(50));
        assert_eq!(x, 600);
    }

    #[test]
    fn tiny_elapsed_time_skips_acceleration() {
        let config = Config {
            move_scale: 1.0,
            ..Config::default()
        };
        let mut motion = MotionProcessor::new(Instant::now());
        let moved = motion.pointer_motion(&config, (10.0, 0.0), Duration::from_micros(500));
        assert_eq!(moved, (10, 0));
        assert_eq!(motion.smoothed_speed(), 0.0);
    }

    #[test]
    fn scroll_sign_and_inversion() {
        let mut config = Config {
            invert_scroll: false,
            ..Config::default()
        };
        assert_eq!(scroll_tick(&config, (0.0, 8.0)), None);
        assert_eq!(scroll_tick(&config, (0.0, 9.0)), Some(1));
        assert_eq!(scroll_tick(&config, (0.0, -9.0)), Some(-1));

        config.invert_scroll = true;
        assert_eq!(scroll_tick(&config, (0.0, 9.0)), Some(-1));

        config.swap_axes = true;
        assert_eq!(scroll_tick(&config, (0.0, 20.0)), None);
        assert_eq!(scroll_tick(&config, (-20.0, 0.0)), Some(1));
    }
}
