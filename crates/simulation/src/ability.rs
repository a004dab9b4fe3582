//! Sprint ability state and tunables

use serde::{Deserialize, Serialize};
use stride_protocol::{SprintSnapshot, Vec3};

use crate::MovementLimits;

/// Sprint tunables
///
/// Configuration only; never mutated while simulating. Durations are added
/// to `f32` session timestamps, which keep sub-tick resolution only for
/// session clocks well under a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintConfig {
    /// Max speed while sprinting
    pub speed: f32,

    /// Acceleration while sprinting above walk speed
    pub acceleration: f32,

    /// How long one sprint lasts
    pub duration_seconds: f32,

    /// Cooldown after a sprint ends
    pub recharge_seconds: f32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            speed: 2000.0,
            acceleration: 5000.0,
            duration_seconds: 3.0,
            recharge_seconds: 5.0,
        }
    }
}

/// Per-character sprint state
///
/// Owned by exactly one movement simulation. The predicting and the
/// authoritative side each hold their own instance; they are only ever
/// synchronized through [`SprintState::snapshot`] and [`SprintState::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SprintState {
    /// Raw sprint input for the next tick
    pub pressed: bool,

    /// Sprint currently in effect
    pub active: bool,

    /// `active` as it was when the current tick started
    pub was_active: bool,

    /// Simulation time at which an active sprint auto-deactivates
    pub end_time: f32,

    /// Simulation time before which sprint cannot start
    pub recharge_time: f32,
}

impl SprintState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host input: sprint button went down
    pub fn request_start(&mut self) {
        self.pressed = true;
    }

    /// Host input: sprint button went up
    pub fn request_stop(&mut self) {
        self.pressed = false;
    }

    /// True while the cooldown from the last sprint is running
    #[inline]
    pub fn is_recharging(&self, now: f32) -> bool {
        now < self.recharge_time
    }

    pub fn snapshot(&self) -> SprintSnapshot {
        SprintSnapshot {
            pressed: self.pressed,
            active: self.active,
            end_time: self.end_time,
            recharge_time: self.recharge_time,
        }
    }

    /// Hard reset from a snapshot
    ///
    /// `was_active` follows `active` so the next tick sees no stale edge.
    pub fn restore(&mut self, snapshot: &SprintSnapshot) {
        self.pressed = snapshot.pressed;
        self.active = snapshot.active;
        self.was_active = snapshot.active;
        self.end_time = snapshot.end_time;
        self.recharge_time = snapshot.recharge_time;
    }

    /// Max speed for the movement step
    pub fn max_speed(&self, config: &SprintConfig, base: f32) -> f32 {
        if self.active {
            config.speed
        } else {
            base
        }
    }

    /// Max acceleration for the movement step
    ///
    /// The sprint acceleration only kicks in once the character is already
    /// moving faster than walk speed.
    pub fn max_acceleration(
        &self,
        config: &SprintConfig,
        base: f32,
        velocity: Vec3,
        max_walk_speed: f32,
    ) -> f32 {
        if self.active && velocity.length_squared() > max_walk_speed * max_walk_speed {
            config.acceleration
        } else {
            base
        }
    }

    /// Base limits adjusted for the sprint
    pub fn limits(
        &self,
        config: &SprintConfig,
        base: MovementLimits,
        velocity: Vec3,
    ) -> MovementLimits {
        MovementLimits {
            max_speed: self.max_speed(config, base.max_speed),
            max_acceleration: self.max_acceleration(
                config,
                base.max_acceleration,
                velocity,
                base.max_speed,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_start_stop() {
        let mut state = SprintState::new();
        assert!(!state.pressed);

        state.request_start();
        assert!(state.pressed);

        state.request_stop();
        assert!(!state.pressed);
    }

    #[test]
    fn test_snapshot_restore() {
        let state = SprintState {
            pressed: true,
            active: true,
            was_active: false,
            end_time: 3.0,
            recharge_time: 0.0,
        };

        let mut restored = SprintState::new();
        restored.restore(&state.snapshot());

        assert_eq!(restored.snapshot(), state.snapshot());
        assert!(restored.was_active);
    }

    #[test]
    fn test_max_speed() {
        let config = SprintConfig::default();
        let mut state = SprintState::new();

        assert_eq!(state.max_speed(&config, 600.0), 600.0);

        state.active = true;
        assert_eq!(state.max_speed(&config, 600.0), 2000.0);
    }

    #[test]
    fn test_max_acceleration_needs_walk_speed() {
        let config = SprintConfig::default();
        let state = SprintState {
            active: true,
            ..Default::default()
        };

        let slow = Vec3::new(300.0, 0.0, 0.0);
        let fast = Vec3::new(900.0, 0.0, 0.0);

        assert_eq!(state.max_acceleration(&config, 2048.0, slow, 600.0), 2048.0);
        assert_eq!(state.max_acceleration(&config, 2048.0, fast, 600.0), 5000.0);

        let idle = SprintState::new();
        assert_eq!(idle.max_acceleration(&config, 2048.0, fast, 600.0), 2048.0);
    }

    #[test]
    fn test_is_recharging() {
        let state = SprintState {
            recharge_time: 8.0,
            ..Default::default()
        };

        assert!(state.is_recharging(4.0));
        assert!(!state.is_recharging(8.0));
        assert!(!state.is_recharging(8.1));
    }
}
