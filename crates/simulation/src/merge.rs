//! Coalescing adjacent unacknowledged moves
//!
//! Two records merge only when nothing that affects future simulation differs
//! between them. When in doubt they stay separate: a lost transition cannot
//! be recovered, an extra record only costs memory.

use serde::{Deserialize, Serialize};
use stride_protocol::Vec3;

use crate::saved_move::SavedMove;

/// Rules for combining two adjacent saved moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePolicy {
    /// Longest span one merged record may cover, in seconds
    pub max_combined_delta: f32,

    /// Allowed acceleration difference, relative to the larger magnitude
    pub acceleration_tolerance: f32,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            max_combined_delta: 0.125,
            acceleration_tolerance: 0.01,
        }
    }
}

impl MergePolicy {
    /// Returns true if `newer` can be folded into `older`
    pub fn can_merge(&self, older: &SavedMove, newer: &SavedMove) -> bool {
        // Ability input
        if older.input.sprint_pressed != newer.input.sprint_pressed {
            return false;
        }

        // No sprint edge may fall inside the merged span
        if older.sprint.active != newer.sprint.active {
            return false;
        }

        self.base_can_merge(older, newer)
    }

    /// Base-framework combine rule: same jump/crouch input, similar
    /// acceleration, bounded duration
    pub fn base_can_merge(&self, older: &SavedMove, newer: &SavedMove) -> bool {
        if older.input.jump_pressed != newer.input.jump_pressed
            || older.input.wants_to_crouch != newer.input.wants_to_crouch
        {
            return false;
        }

        if older.delta_time + newer.delta_time > self.max_combined_delta {
            return false;
        }

        self.accelerations_similar(older.input.acceleration, newer.input.acceleration)
    }

    fn accelerations_similar(&self, a: Vec3, b: Vec3) -> bool {
        if a.is_zero() && b.is_zero() {
            return true;
        }
        if a.is_zero() != b.is_zero() {
            return false;
        }

        let larger = a.length_squared().max(b.length_squared());
        let tolerance = self.acceleration_tolerance * self.acceleration_tolerance * larger;
        a.distance_squared(&b) <= tolerance
    }
}

/// Folds `newer` into `older`
///
/// Keeps `older`'s timestamp, sums the durations, takes `newer`'s input and
/// result. Only valid when [`MergePolicy::can_merge`] returned true. The
/// predicting side then re-simulates the combined span as one step and
/// overwrites the result, so the record replays exactly as it was sent.
pub fn merge(older: &SavedMove, newer: &SavedMove) -> SavedMove {
    SavedMove {
        input: newer.input,
        sprint: newer.sprint,
        physics: newer.physics,
        timestamp: older.timestamp,
        latest_timestamp: newer.latest_timestamp,
        delta_time: older.delta_time + newer.delta_time,
    }
}
