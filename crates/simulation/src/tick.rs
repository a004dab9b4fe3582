//! One simulated tick, shared by every author of ticks
//!
//! The predicting side, the authoritative side and reconciliation replay all
//! run exactly this sequence, so identical `(state, input, dt, now)` always
//! produce identical results.

use stride_protocol::PhysicsState;

use crate::ability::{SprintConfig, SprintState};
use crate::saved_move::MoveInput;
use crate::state_machine::{self, Eligibility, TickMode, Transition};
use crate::MovementStep;

/// Collaborators a tick needs besides the state it mutates
pub struct TickContext<'a, M: ?Sized, E: ?Sized> {
    pub sprint_config: &'a SprintConfig,
    pub movement: &'a M,
    pub eligibility: &'a E,
}

impl<M: ?Sized, E: ?Sized> Clone for TickContext<'_, M, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized, E: ?Sized> Copy for TickContext<'_, M, E> {}

impl<'a, M, E> TickContext<'a, M, E>
where
    M: MovementStep + ?Sized,
    E: Eligibility + ?Sized,
{
    pub fn new(sprint_config: &'a SprintConfig, movement: &'a M, eligibility: &'a E) -> Self {
        Self {
            sprint_config,
            movement,
            eligibility,
        }
    }

    /// Applies the tick's sprint input, runs the state machine, then the movement step
    pub fn run(
        &self,
        sprint: &mut SprintState,
        physics: &mut PhysicsState,
        input: &MoveInput,
        delta_time: f32,
        now: f32,
        mode: TickMode,
    ) -> Transition {
        sprint.pressed = input.sprint_pressed;

        let transition = state_machine::step(
            sprint,
            self.sprint_config,
            physics,
            now,
            self.eligibility,
            mode,
        );

        let limits = sprint.limits(
            self.sprint_config,
            self.movement.base_limits(),
            physics.velocity,
        );
        *physics = self.movement.step(physics, input, limits, delta_time);

        transition
    }
}
