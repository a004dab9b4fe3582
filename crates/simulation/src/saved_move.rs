//! Saved moves: one record per authored tick
//!
//! A saved move keeps the input that drove a tick and the sprint/movement
//! result it produced. The result is what reconciliation restores from; the
//! input is what it replays.

use stride_protocol::{ClientMove, InputFlags, PhysicsState, SprintSnapshot, Vec3};

use crate::ability::SprintState;

/// Base-framework inputs for a tick, owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaseInput {
    pub acceleration: Vec3,
    pub jump_pressed: bool,
    pub wants_to_crouch: bool,
}

/// Everything replicated for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveInput {
    pub acceleration: Vec3,
    pub jump_pressed: bool,
    pub wants_to_crouch: bool,
    pub sprint_pressed: bool,
}

impl MoveInput {
    pub fn new(base: BaseInput, sprint_pressed: bool) -> Self {
        Self {
            acceleration: base.acceleration,
            jump_pressed: base.jump_pressed,
            wants_to_crouch: base.wants_to_crouch,
            sprint_pressed,
        }
    }

    pub fn flags(&self) -> InputFlags {
        InputFlags {
            jump_pressed: self.jump_pressed,
            wants_to_crouch: self.wants_to_crouch,
            sprint_pressed: self.sprint_pressed,
        }
    }

    /// Packs the boolean inputs into the wire flag byte
    pub fn compressed_flags(&self) -> u8 {
        self.flags().encode()
    }

    /// Rebuilds the input on the receiving side from wire fields
    pub fn from_wire(acceleration: Vec3, compressed_flags: u8) -> Self {
        let flags = InputFlags::decode(compressed_flags);
        Self {
            acceleration,
            jump_pressed: flags.jump_pressed,
            wants_to_crouch: flags.wants_to_crouch,
            sprint_pressed: flags.sprint_pressed,
        }
    }
}

/// One entry of the move history
///
/// Timestamps are `f32` seconds of session time, matching the wire layout.
/// Their spacing grows with magnitude (about 0.008 s at 1e5 s), so hosts
/// keep session clocks well under a day or rebase them on reconnect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedMove {
    /// Input that drove the tick
    pub input: MoveInput,

    /// Sprint fields after the tick
    pub sprint: SprintSnapshot,

    /// Movement result after the tick
    pub physics: PhysicsState,

    /// Time the (first merged) tick was authored at
    pub timestamp: f32,

    /// Time the last tick folded into this record was authored at
    ///
    /// Equal to `timestamp` until the record absorbs a newer one.
    pub latest_timestamp: f32,

    /// Total duration covered by the record
    ///
    /// A merged record is simulated and sent as one step of this length.
    pub delta_time: f32,
}

impl SavedMove {
    /// Captures a record right after the state machine and movement step ran
    pub fn capture(
        input: MoveInput,
        sprint: &SprintState,
        physics: &PhysicsState,
        delta_time: f32,
        now: f32,
    ) -> Self {
        Self {
            input,
            sprint: sprint.snapshot(),
            physics: *physics,
            timestamp: now,
            latest_timestamp: now,
            delta_time,
        }
    }

    /// Wire form of the record
    pub fn to_client_move(&self) -> ClientMove {
        ClientMove {
            timestamp: self.timestamp,
            delta_time: self.delta_time,
            acceleration: self.input.acceleration,
            compressed_flags: self.input.compressed_flags(),
            predicted_position: self.physics.position,
        }
    }
}

/// Overwrites live state with a record's result
///
/// A hard reset: nothing of the previous live state survives.
pub fn restore_from_record(record: &SavedMove, sprint: &mut SprintState, physics: &mut PhysicsState) {
    sprint.restore(&record.sprint);
    *physics = record.physics;
}
