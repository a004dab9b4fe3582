//! Ordered history of sent, unacknowledged saved moves
//!
//! Append-only, except for evicting the acknowledged prefix. Every record
//! here went out as exactly one wire move; folding ticks together happens
//! before a record is appended. Records are never dropped for space: the
//! acknowledgment horizon bounds the history.

use std::collections::VecDeque;

use crate::saved_move::SavedMove;

/// Predicting-side buffer of saved moves, oldest first
#[derive(Debug, Clone)]
pub struct MoveHistory {
    moves: VecDeque<SavedMove>,

    /// Length above which a warning is logged
    soft_limit: usize,

    over_soft_limit: bool,
}

impl MoveHistory {
    pub fn new(soft_limit: usize) -> Self {
        Self {
            moves: VecDeque::with_capacity(soft_limit),
            soft_limit,
            over_soft_limit: false,
        }
    }

    /// Appends a record
    ///
    /// Timestamps must strictly increase.
    pub fn push(&mut self, record: SavedMove) -> Result<(), HistoryError> {
        self.check_next(record.timestamp)?;
        self.moves.push_back(record);
        self.check_soft_limit();
        Ok(())
    }

    /// Checks that a tick authored at `timestamp` may be appended
    pub fn check_next(&self, timestamp: f32) -> Result<(), HistoryError> {
        match self.moves.back() {
            Some(last) if timestamp <= last.latest_timestamp => Err(HistoryError::NonMonotonic {
                timestamp,
                last: last.latest_timestamp,
            }),
            _ => Ok(()),
        }
    }

    /// Evicts every record whose move was sent at or before `timestamp`
    ///
    /// A merged record is acknowledged as a unit by the timestamp of the
    /// move that carried it. Returns the number of evicted records.
    pub fn acknowledge(&mut self, timestamp: f32) -> usize {
        let before = self.moves.len();
        while self
            .moves
            .front()
            .is_some_and(|front| front.timestamp <= timestamp)
        {
            self.moves.pop_front();
        }
        if self.moves.len() <= self.soft_limit {
            self.over_soft_limit = false;
        }
        before - self.moves.len()
    }

    /// Drops the first `count` records
    pub fn evict_front(&mut self, count: usize) {
        self.moves.drain(..count.min(self.moves.len()));
        if self.moves.len() <= self.soft_limit {
            self.over_soft_limit = false;
        }
    }

    /// Index of the first record authored at or after `timestamp`
    pub fn position_from(&self, timestamp: f32) -> Option<usize> {
        self.moves
            .iter()
            .position(|record| record.timestamp >= timestamp)
    }

    pub fn oldest(&self) -> Option<&SavedMove> {
        self.moves.front()
    }

    pub fn newest(&self) -> Option<&SavedMove> {
        self.moves.back()
    }

    pub fn get(&self, index: usize) -> Option<&SavedMove> {
        self.moves.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SavedMove> {
        self.moves.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedMove> {
        self.moves.iter()
    }

    /// Records after `index`, oldest first
    pub fn after_mut(&mut self, index: usize) -> impl Iterator<Item = &mut SavedMove> {
        self.moves.iter_mut().skip(index + 1)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    fn check_soft_limit(&mut self) {
        if self.moves.len() > self.soft_limit && !self.over_soft_limit {
            self.over_soft_limit = true;
            tracing::warn!(
                pending = self.moves.len(),
                soft_limit = self.soft_limit,
                "Move history exceeds soft limit; acknowledgments are falling behind"
            );
        }
    }
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::new(96)
    }
}

/// Move history errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    /// Record is not newer than the newest buffered tick
    #[error("Saved move at {timestamp} is not newer than the last buffered tick at {last}")]
    NonMonotonic { timestamp: f32, last: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::SprintState;
    use crate::merge::merge;
    use crate::saved_move::MoveInput;
    use stride_protocol::{PhysicsState, Vec3};

    fn record(now: f32, pressed: bool) -> SavedMove {
        let input = MoveInput {
            acceleration: Vec3::new(2048.0, 0.0, 0.0),
            sprint_pressed: pressed,
            ..Default::default()
        };
        SavedMove::capture(input, &SprintState::new(), &PhysicsState::default(), 0.01, now)
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut history = MoveHistory::new(8);

        history.push(record(0.00, false)).unwrap();
        history.push(record(0.01, true)).unwrap();

        assert_eq!(history.len(), 2);
        assert!(!history.is_empty());
        assert_eq!(history.oldest().unwrap().timestamp, 0.00);
        assert_eq!(history.newest().unwrap().timestamp, 0.01);
    }

    #[test]
    fn test_push_rejects_non_monotonic() {
        let mut history = MoveHistory::new(8);
        history.push(record(1.0, false)).unwrap();

        let result = history.push(record(1.0, false));
        assert!(matches!(result, Err(HistoryError::NonMonotonic { .. })));

        let result = history.push(record(0.5, false));
        assert!(matches!(result, Err(HistoryError::NonMonotonic { .. })));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_next_tick_must_follow_merged_span() {
        let mut history = MoveHistory::new(8);
        history.push(merge(&record(0.00, false), &record(0.01, false))).unwrap();

        assert!(history.check_next(0.01).is_err());
        assert!(history.check_next(0.02).is_ok());
    }

    #[test]
    fn test_acknowledge_evicts_prefix() {
        let mut history = MoveHistory::new(8);
        for i in 0..5 {
            history.push(record(i as f32, i % 2 == 0)).unwrap();
        }

        assert_eq!(history.acknowledge(2.0), 3);
        assert_eq!(history.len(), 2);
        assert_eq!(history.oldest().unwrap().timestamp, 3.0);

        assert_eq!(history.acknowledge(2.5), 0);
    }

    #[test]
    fn test_acknowledge_evicts_merged_record_by_its_move_timestamp() {
        let mut history = MoveHistory::new(8);
        history.push(merge(&record(0.00, false), &record(0.01, false))).unwrap();
        history.push(record(0.02, true)).unwrap();

        // The merged record went out as one move stamped 0.00
        assert_eq!(history.acknowledge(0.00), 1);
        assert_eq!(history.oldest().unwrap().timestamp, 0.02);
    }

    #[test]
    fn test_position_from() {
        let mut history = MoveHistory::new(8);
        for i in 0..4 {
            history.push(record(i as f32, false)).unwrap();
        }

        assert_eq!(history.position_from(0.0), Some(0));
        assert_eq!(history.position_from(1.5), Some(2));
        assert_eq!(history.position_from(3.0), Some(3));
        assert_eq!(history.position_from(3.5), None);
    }

    #[test]
    fn test_soft_limit_never_drops() {
        let mut history = MoveHistory::new(2);
        for i in 0..10 {
            history.push(record(i as f32, i % 2 == 0)).unwrap();
        }

        assert_eq!(history.len(), 10);
        assert_eq!(history.oldest().unwrap().timestamp, 0.0);
    }
}
