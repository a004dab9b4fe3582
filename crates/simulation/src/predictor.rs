//! Predicting side of the sprint protocol
//!
//! This module provides `SprintPredictor` which owns the locally simulated
//! character and handles:
//! - Immediate local ticks (sprint and movement run without waiting for the server)
//! - An open pending move that absorbs compatible ticks before it is sent
//! - Saved-move history of sent moves, evicted by acknowledgments
//! - Rewind and replay when a correction arrives
//!
//! A merged move is simulated as one step over its whole span, on both sides:
//! when a tick folds into the pending move, the pending move is re-run from
//! its start state with the combined duration. The authority receives that
//! combined move, so every sent record replays exactly as it was applied.

use serde::{Deserialize, Serialize};
use stride_protocol::{ClientMove, MoveCorrection, PhysicsState};

use crate::ability::{SprintConfig, SprintState};
use crate::history::{HistoryError, MoveHistory};
use crate::merge::{merge, MergePolicy};
use crate::reconciler::{ReconcileError, Reconciler, ReplayReport};
use crate::saved_move::{BaseInput, MoveInput, SavedMove};
use crate::state_machine::{Eligibility, GroundedEligibility, TickMode};
use crate::tick::TickContext;
use crate::MovementStep;

/// Predicting-side tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub sprint: SprintConfig,
    pub merge: MergePolicy,

    /// History length above which a warning is logged
    ///
    /// Records are never dropped; only the acknowledgment horizon shrinks history.
    pub history_soft_limit: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            sprint: SprintConfig::default(),
            merge: MergePolicy::default(),
            history_soft_limit: 96,
        }
    }
}

/// Newest authored move, not sent yet
#[derive(Debug, Clone, Copy)]
struct PendingMove {
    record: SavedMove,

    /// Live state right before the move's first tick
    start_sprint: SprintState,
    start_physics: PhysicsState,
}

/// Locally predicted sprinting character
///
/// # Example
///
/// ```rust
/// use stride_simulation::movement::FlatGroundMovement;
/// use stride_simulation::predictor::SprintPredictor;
/// use stride_simulation::saved_move::BaseInput;
///
/// let mut predictor = SprintPredictor::new(FlatGroundMovement::default());
///
/// predictor.request_start();
/// let mut outgoing = predictor.tick(BaseInput::default(), 0.016, 0.0).unwrap();
/// outgoing.extend(predictor.tick(BaseInput::default(), 0.016, 0.016).unwrap());
///
/// // Both ticks folded into one pending move; send it now
/// outgoing.extend(predictor.flush());
/// assert_eq!(outgoing.len(), 1);
///
/// // Server confirmed it
/// predictor.acknowledge(outgoing[0].timestamp);
/// assert_eq!(predictor.pending_move_count(), 0);
/// ```
pub struct SprintPredictor<M, E = GroundedEligibility> {
    config: PredictorConfig,
    movement: M,
    eligibility: E,

    /// Host sprint input for the next authored tick
    sprint_requested: bool,

    sprint: SprintState,
    physics: PhysicsState,

    /// Moves sent but not yet acknowledged by the authoritative side
    history: MoveHistory,

    pending: Option<PendingMove>,
}

impl<M: MovementStep> SprintPredictor<M> {
    pub fn new(movement: M) -> Self {
        Self::with_config(movement, PredictorConfig::default())
    }

    pub fn with_config(movement: M, config: PredictorConfig) -> Self {
        Self::with_eligibility(movement, config, GroundedEligibility)
    }
}

impl<M: MovementStep, E: Eligibility> SprintPredictor<M, E> {
    /// Creates a predictor with a host-supplied sprint eligibility rule
    pub fn with_eligibility(movement: M, config: PredictorConfig, eligibility: E) -> Self {
        let history = MoveHistory::new(config.history_soft_limit);
        Self {
            config,
            movement,
            eligibility,
            sprint_requested: false,
            sprint: SprintState::new(),
            physics: PhysicsState::default(),
            history,
            pending: None,
        }
    }

    /// Sprint button down; takes effect on the next tick
    pub fn request_start(&mut self) {
        self.sprint_requested = true;
    }

    /// Sprint button up; an active sprint still runs out its duration
    pub fn request_stop(&mut self) {
        self.sprint_requested = false;
    }

    /// Returns the sprint input the next tick will carry
    pub fn sprint_requested(&self) -> bool {
        self.sprint_requested
    }

    /// Authors one tick at `now`
    ///
    /// Runs the sprint state machine and the movement step, then either folds
    /// the tick into the pending move or closes the pending move and opens a
    /// new one. Returns the moves that are ready to send, oldest first: none
    /// while the pending move can still grow, otherwise one or two.
    ///
    /// # Errors
    ///
    /// `now` must be later than the last authored tick. Nothing is mutated
    /// on error.
    pub fn tick(
        &mut self,
        base: BaseInput,
        delta_time: f32,
        now: f32,
    ) -> Result<Vec<ClientMove>, HistoryError> {
        self.check_next(now)?;

        let input = MoveInput::new(base, self.sprint_requested);
        let ctx = TickContext::new(&self.config.sprint, &self.movement, &self.eligibility);

        let mut sprint = self.sprint;
        let mut physics = self.physics;
        let transition = ctx.run(
            &mut sprint,
            &mut physics,
            &input,
            delta_time,
            now,
            TickMode::Authoring,
        );
        let record = SavedMove::capture(input, &sprint, &physics, delta_time, now);

        let mut ready = Vec::with_capacity(2);
        let merged = match self.pending.take() {
            Some(pending) if self.config.merge.can_merge(&pending.record, &record) => {
                let mut combined = merge(&pending.record, &record);
                let mut sprint = pending.start_sprint;
                let mut physics = pending.start_physics;
                ctx.run(
                    &mut sprint,
                    &mut physics,
                    &combined.input,
                    combined.delta_time,
                    combined.timestamp,
                    TickMode::Authoring,
                );
                combined.sprint = sprint.snapshot();
                combined.physics = physics;

                self.sprint = sprint;
                self.physics = physics;
                self.pending = Some(PendingMove {
                    record: combined,
                    ..pending
                });
                true
            }
            Some(pending) => {
                self.history.push(pending.record)?;
                ready.push(pending.record.to_client_move());
                false
            }
            None => false,
        };

        if !merged {
            self.pending = Some(PendingMove {
                record,
                start_sprint: self.sprint,
                start_physics: self.physics,
            });
            self.sprint = sprint;
            self.physics = physics;
        }

        // Send now unless one more tick of this length could still fold in
        let has_room = self.pending.is_some_and(|pending| {
            pending.record.delta_time + delta_time <= self.config.merge.max_combined_delta
        });
        if !has_room {
            ready.extend(self.flush());
        }

        tracing::trace!(
            timestamp = now,
            delta_time,
            ?transition,
            merged,
            sent = ready.len(),
            pending = self.pending_move_count(),
            "Authored predicted tick"
        );

        Ok(ready)
    }

    /// Closes the pending move and returns it for sending
    ///
    /// Hosts call this when a send is due regardless of merging, for example
    /// on a network send deadline.
    pub fn flush(&mut self) -> Option<ClientMove> {
        let pending = self.pending.take()?;
        match self.history.push(pending.record) {
            Ok(()) => Some(pending.record.to_client_move()),
            Err(error) => {
                // Unreachable while ticks are checked against both slots
                tracing::warn!(%error, "Dropping pending move out of order with history");
                None
            }
        }
    }

    /// Drops every sent move the authoritative side has accepted up to `timestamp`
    ///
    /// Returns the number of evicted records.
    pub fn acknowledge(&mut self, timestamp: f32) -> usize {
        self.history.acknowledge(timestamp)
    }

    /// Rewinds to the authoritative state and replays the remaining moves
    ///
    /// The pending move, if any, is replayed last from the corrected state.
    /// Stale, out-of-window and misaligned corrections are logged and leave
    /// the predicted state untouched.
    pub fn apply_correction(
        &mut self,
        correction: &MoveCorrection,
    ) -> Result<ReplayReport, ReconcileError> {
        let ctx = TickContext::new(&self.config.sprint, &self.movement, &self.eligibility);
        let result = Reconciler::new(ctx).reconcile(
            &mut self.history,
            correction,
            &mut self.sprint,
            &mut self.physics,
        );

        let mut report = match result {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(
                    timestamp = correction.timestamp,
                    pending = self.pending_move_count(),
                    %error,
                    "Ignoring correction"
                );
                return Err(error);
            }
        };

        if let Some(pending) = &mut self.pending {
            pending.start_sprint = self.sprint;
            pending.start_physics = self.physics;

            let record = &mut pending.record;
            ctx.run(
                &mut self.sprint,
                &mut self.physics,
                &record.input,
                record.delta_time,
                record.timestamp,
                TickMode::Authoring,
            );
            record.sprint = self.sprint.snapshot();
            record.physics = self.physics;
            report.replayed += 1;
        }

        Ok(report)
    }

    fn check_next(&self, now: f32) -> Result<(), HistoryError> {
        match &self.pending {
            Some(pending) if now <= pending.record.latest_timestamp => {
                Err(HistoryError::NonMonotonic {
                    timestamp: now,
                    last: pending.record.latest_timestamp,
                })
            }
            _ => self.history.check_next(now),
        }
    }

    /// Returns the predicted sprint state
    pub fn sprint(&self) -> &SprintState {
        &self.sprint
    }

    /// Returns the predicted movement state
    pub fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    /// Returns the sent, unacknowledged saved moves
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Returns the move still open for merging, if any
    pub fn pending_move(&self) -> Option<&SavedMove> {
        self.pending.as_ref().map(|pending| &pending.record)
    }

    /// Returns the number of saved moves awaiting acknowledgment, sent or not
    pub fn pending_move_count(&self) -> usize {
        self.history.len() + usize::from(self.pending.is_some())
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn movement(&self) -> &M {
        &self.movement
    }
}
