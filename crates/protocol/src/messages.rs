//! Messages exchanged between the predicting and authoritative sides
//!
//! - `MovePacket` (predicting → authoritative): authored ticks, see [`crate::packet`]
//! - `MoveAck` (authoritative → predicting): prediction matched up to a timestamp
//! - `MoveCorrection` (authoritative → predicting): canonical state at a timestamp

use serde::{Deserialize, Serialize};

use crate::message_registry::GameMessage;
use crate::types::{PhysicsState, SprintSnapshot};

/// Route IDs for stride messages
pub mod routes {
    /// MOVE_PACKET (predicting → authoritative)
    pub const MOVE_PACKET: u16 = 100;

    /// MOVE_ACK (authoritative → predicting)
    pub const MOVE_ACK: u16 = 101;

    /// MOVE_CORRECTION (authoritative → predicting)
    pub const MOVE_CORRECTION: u16 = 102;
}

/// Acknowledges every authored tick at or before `timestamp`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveAck {
    pub timestamp: f32,
}

impl GameMessage for MoveAck {
    const ROUTE_ID: u16 = routes::MOVE_ACK;
    const SCHEMA_HASH: u64 = 0x5A71_0C4B_0000_0101;
}

/// Authoritative state after the tick authored at `timestamp`
///
/// Sent when the authoritative result diverges from the position the client
/// predicted for that tick. The predicting side restores both snapshots and
/// replays every later buffered move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveCorrection {
    pub timestamp: f32,

    /// Canonical sprint fields after the tick
    pub sprint: SprintSnapshot,

    /// Canonical movement result after the tick
    pub physics: PhysicsState,
}

impl GameMessage for MoveCorrection {
    const ROUTE_ID: u16 = routes::MOVE_CORRECTION;
    const SCHEMA_HASH: u64 = 0x5A71_0C4B_0000_0102;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_ids_are_distinct() {
        assert_ne!(MoveAck::ROUTE_ID, MoveCorrection::ROUTE_ID);
        assert_ne!(MoveAck::ROUTE_ID, routes::MOVE_PACKET);
        assert_ne!(MoveCorrection::ROUTE_ID, routes::MOVE_PACKET);
    }

    #[test]
    fn test_route_ids_are_game_routes() {
        assert!(routes::MOVE_PACKET >= 100);
        assert!(MoveAck::ROUTE_ID >= 100);
        assert!(MoveCorrection::ROUTE_ID >= 100);
    }
}
