//! Per-tick sprint transitions
//!
//! ```text
//!            pressed ∧ eligible
//!   Idle ─────────────────────────→ Active
//!     ↑                               │
//!     └───────────────────────────────┘
//!              now > end_time
//! ```
//!
//! Release of the button never ends a sprint; only time does. Timers move on
//! edges only: the rising edge sets `end_time`, the falling edge sets
//! `recharge_time`.

use stride_protocol::PhysicsState;

use crate::ability::{SprintConfig, SprintState};

/// Who is running the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// A new tick is being authored; edges update the timers
    Authoring,

    /// A recorded tick is re-run with timers already restored; timers stay as they are
    Replaying,
}

/// Edge produced by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Started,
    Stopped,
}

/// Host-supplied predicate deciding whether a sprint may start this tick
///
/// Evaluated every tick the sprint is pressed and inactive; never cached.
pub trait Eligibility {
    fn is_eligible(&self, sprint: &SprintState, physics: &PhysicsState, now: f32) -> bool;
}

impl<F> Eligibility for F
where
    F: Fn(&SprintState, &PhysicsState, f32) -> bool,
{
    fn is_eligible(&self, sprint: &SprintState, physics: &PhysicsState, now: f32) -> bool {
        self(sprint, physics, now)
    }
}

/// Standard sprint rule: on the ground, not crouching, cooldown elapsed
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundedEligibility;

impl Eligibility for GroundedEligibility {
    fn is_eligible(&self, sprint: &SprintState, physics: &PhysicsState, now: f32) -> bool {
        physics.grounded && !physics.crouching && !sprint.is_recharging(now)
    }
}

/// Runs the sprint state machine for one tick
///
/// Captures `was_active` before any transition, applies at most one
/// transition, then updates the timers on an edge when `mode` is
/// [`TickMode::Authoring`].
pub fn step<E: Eligibility + ?Sized>(
    state: &mut SprintState,
    config: &SprintConfig,
    physics: &PhysicsState,
    now: f32,
    eligibility: &E,
    mode: TickMode,
) -> Transition {
    state.was_active = state.active;

    if state.pressed && !state.active && eligibility.is_eligible(state, physics, now) {
        state.active = true;
    } else if state.active && now > state.end_time {
        state.active = false;
    }

    let transition = match (state.was_active, state.active) {
        (false, true) => Transition::Started,
        (true, false) => Transition::Stopped,
        _ => Transition::None,
    };

    if mode == TickMode::Authoring {
        match transition {
            Transition::Started => state.end_time = now + config.duration_seconds,
            Transition::Stopped => state.recharge_time = now + config.recharge_seconds,
            Transition::None => {}
        }
    }

    transition
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn grounded() -> PhysicsState {
        PhysicsState::default()
    }

    fn tick(state: &mut SprintState, config: &SprintConfig, now: f32) -> Transition {
        step(state, config, &grounded(), now, &GroundedEligibility, TickMode::Authoring)
    }

    #[test]
    fn test_rising_edge_sets_end_time() {
        let config = SprintConfig::default();
        let mut state = SprintState::new();
        state.request_start();

        let transition = tick(&mut state, &config, 2.0);

        assert_eq!(transition, Transition::Started);
        assert!(state.active);
        assert!(!state.was_active);
        assert!((state.end_time - 5.0).abs() < EPS);
        assert_eq!(state.recharge_time, 0.0);
    }

    #[test]
    fn test_falling_edge_sets_recharge_time() {
        let config = SprintConfig::default();
        let mut state = SprintState::new();
        state.request_start();
        tick(&mut state, &config, 0.0);

        // Still inside the duration
        assert_eq!(tick(&mut state, &config, 3.0), Transition::None);
        assert!(state.active);

        assert_eq!(tick(&mut state, &config, 3.01), Transition::Stopped);
        assert!(!state.active);
        assert!(state.was_active);
        assert!((state.recharge_time - 8.01).abs() < EPS);
    }

    #[test]
    fn test_release_does_not_end_sprint() {
        let config = SprintConfig::default();
        let mut state = SprintState::new();
        state.request_start();
        tick(&mut state, &config, 0.0);

        state.request_stop();
        assert_eq!(tick(&mut state, &config, 1.0), Transition::None);
        assert!(state.active);
    }

    #[test]
    fn test_cooldown_gating() {
        let config = SprintConfig::default();
        let mut state = SprintState {
            pressed: true,
            recharge_time: 8.0,
            ..Default::default()
        };

        for now in [4.0, 6.5, 7.99] {
            assert_eq!(tick(&mut state, &config, now), Transition::None);
            assert!(!state.active);
        }

        assert_eq!(tick(&mut state, &config, 8.1), Transition::Started);
    }

    #[test]
    fn test_eligibility_rechecked_every_tick() {
        let config = SprintConfig::default();
        let mut state = SprintState::new();
        state.request_start();

        let mut physics = PhysicsState {
            grounded: false,
            ..Default::default()
        };

        for i in 0..5 {
            let now = i as f32 * 0.1;
            step(&mut state, &config, &physics, now, &GroundedEligibility, TickMode::Authoring);
            assert!(!state.active);
        }

        physics.crouching = true;
        physics.grounded = true;
        step(&mut state, &config, &physics, 0.5, &GroundedEligibility, TickMode::Authoring);
        assert!(!state.active);

        physics.crouching = false;
        let transition =
            step(&mut state, &config, &physics, 0.6, &GroundedEligibility, TickMode::Authoring);
        assert_eq!(transition, Transition::Started);
    }

    #[test]
    fn test_replaying_keeps_timers() {
        let config = SprintConfig::default();
        let mut state = SprintState {
            pressed: true,
            end_time: 42.0,
            recharge_time: 0.0,
            ..Default::default()
        };

        let transition = step(
            &mut state,
            &config,
            &grounded(),
            1.0,
            &GroundedEligibility,
            TickMode::Replaying,
        );

        assert_eq!(transition, Transition::Started);
        assert_eq!(state.end_time, 42.0);
    }

    #[test]
    fn test_closure_eligibility() {
        let config = SprintConfig::default();
        let mut state = SprintState::new();
        state.request_start();

        let never = |_: &SprintState, _: &PhysicsState, _: f32| false;
        let transition = step(&mut state, &config, &grounded(), 0.0, &never, TickMode::Authoring);

        assert_eq!(transition, Transition::None);
        assert!(!state.active);
    }

    #[test]
    fn test_duration_scenario() {
        let config = SprintConfig {
            duration_seconds: 3.0,
            recharge_seconds: 5.0,
            ..Default::default()
        };
        let mut state = SprintState::new();

        state.request_start();
        assert_eq!(tick(&mut state, &config, 0.0), Transition::Started);
        assert!((state.end_time - 3.0).abs() < EPS);

        state.request_stop();
        tick(&mut state, &config, 2.0);
        assert!(state.active);

        assert_eq!(tick(&mut state, &config, 3.01), Transition::Stopped);
        assert!((state.recharge_time - 8.01).abs() < EPS);

        state.request_start();
        assert_eq!(tick(&mut state, &config, 4.0), Transition::None);
        assert!(!state.active);

        assert_eq!(tick(&mut state, &config, 8.1), Transition::Started);
        assert!((state.end_time - 11.1).abs() < EPS);
    }
}
