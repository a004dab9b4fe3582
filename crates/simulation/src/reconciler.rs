//! Rewind and replay after an authoritative correction
//!
//! A correction names the timestamp of a move the authority applied, which
//! is the timestamp of exactly one buffered record. That record takes the
//! canonical sprint snapshot and physics state, live state is hard-reset
//! from it, and every later record is re-simulated at its own recorded
//! timestamp with its own recorded input and duration.

use stride_protocol::{MoveCorrection, PhysicsState};

use crate::ability::SprintState;
use crate::history::MoveHistory;
use crate::saved_move::restore_from_record;
use crate::state_machine::{Eligibility, TickMode};
use crate::tick::TickContext;
use crate::MovementStep;

/// What a reconciliation did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayReport {
    /// Timestamp of the record the correction anchored at
    pub anchor_timestamp: f32,

    /// Records re-simulated after the anchor
    pub replayed: usize,

    /// Records evicted (acknowledged prefix plus the anchor)
    pub evicted: usize,
}

/// Applies corrections to a move history
pub struct Reconciler<'a, M: ?Sized, E: ?Sized> {
    ctx: TickContext<'a, M, E>,
}

impl<'a, M, E> Reconciler<'a, M, E>
where
    M: MovementStep + ?Sized,
    E: Eligibility + ?Sized,
{
    pub fn new(ctx: TickContext<'a, M, E>) -> Self {
        Self { ctx }
    }

    /// Rewinds to the correction and replays everything after it
    ///
    /// The snapshot wins over the anchor's recorded input: the anchor's
    /// `sprint_pressed` is rewritten to the snapshot's `pressed`, so record
    /// and restored state agree.
    ///
    /// On error nothing is mutated: neither the history nor the live state.
    pub fn reconcile(
        &self,
        history: &mut MoveHistory,
        correction: &MoveCorrection,
        sprint: &mut SprintState,
        physics: &mut PhysicsState,
    ) -> Result<ReplayReport, ReconcileError> {
        let timestamp = correction.timestamp;

        let oldest = history
            .oldest()
            .map(|record| record.timestamp)
            .ok_or(ReconcileError::EmptyHistory)?;
        if timestamp < oldest {
            return Err(ReconcileError::StaleCorrection { timestamp, oldest });
        }

        let anchor = match history.position_from(timestamp) {
            Some(index) => index,
            None => {
                let newest = history
                    .newest()
                    .map(|record| record.latest_timestamp)
                    .unwrap_or(oldest);
                return Err(ReconcileError::OutOfWindow { timestamp, newest });
            }
        };

        let anchor_timestamp = match history.get_mut(anchor) {
            Some(record) if record.timestamp != timestamp => {
                return Err(ReconcileError::Misaligned {
                    timestamp,
                    next: record.timestamp,
                });
            }
            Some(record) => {
                record.sprint = correction.sprint;
                record.physics = correction.physics;
                record.input.sprint_pressed = correction.sprint.pressed;
                restore_from_record(record, sprint, physics);
                record.timestamp
            }
            None => return Err(ReconcileError::EmptyHistory),
        };

        let replayed = self.replay(history, anchor, sprint, physics);

        let evicted = anchor + 1;
        history.evict_front(evicted);

        tracing::debug!(
            correction = timestamp,
            anchor = anchor_timestamp,
            replayed,
            evicted,
            remaining = history.len(),
            "Replayed saved moves after correction"
        );

        Ok(ReplayReport {
            anchor_timestamp,
            replayed,
            evicted,
        })
    }

    /// Re-simulates every record after `anchor` from the current live state
    ///
    /// Each record is run at its recorded timestamp and refreshed with the
    /// result. Returns the number of records replayed.
    pub fn replay(
        &self,
        history: &mut MoveHistory,
        anchor: usize,
        sprint: &mut SprintState,
        physics: &mut PhysicsState,
    ) -> usize {
        let mut replayed = 0;
        for record in history.after_mut(anchor) {
            self.ctx.run(
                sprint,
                physics,
                &record.input,
                record.delta_time,
                record.timestamp,
                TickMode::Authoring,
            );
            record.sprint = sprint.snapshot();
            record.physics = *physics;
            replayed += 1;
        }
        replayed
    }
}

/// Reconciliation errors
///
/// None of these are fatal: the correction is reported and dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    /// No buffered moves to anchor at
    #[error("No saved moves to reconcile against")]
    EmptyHistory,

    /// Correction predates the oldest buffered move
    #[error("Stale correction at {timestamp}: oldest saved move is at {oldest}")]
    StaleCorrection { timestamp: f32, oldest: f32 },

    /// Correction is newer than every buffered move
    #[error("Correction at {timestamp} is past the newest saved move at {newest}")]
    OutOfWindow { timestamp: f32, newest: f32 },

    /// Correction falls between sent moves, inside a span no move started at
    #[error("Correction at {timestamp} does not start a sent move; next move starts at {next}")]
    Misaligned { timestamp: f32, next: f32 },
}
