use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::flags::InputFlags;
use crate::message_registry::GameMessage;
use crate::messages::routes;
use crate::types::Vec3;
use crate::version::{check_remote_version, PROTOCOL_VERSION};

/// One authored tick as sent to the authoritative side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientMove {
    /// Simulation time the tick was authored at
    pub timestamp: f32,

    /// Duration of the tick in seconds
    pub delta_time: f32,

    /// Input acceleration for the movement step
    pub acceleration: Vec3,

    /// Compressed flag byte, see [`crate::flags`]
    pub compressed_flags: u8,

    /// Position the predicting side ended the tick at
    pub predicted_position: Vec3,
}

impl ClientMove {
    /// Decodes the flag byte, ignoring bits this version does not define
    #[inline]
    pub fn flags(&self) -> InputFlags {
        InputFlags::decode(self.compressed_flags)
    }
}

/// Batch of authored ticks, oldest first
///
/// Wire format (big-endian):
/// ```text
/// ┌──────────────────┬──────┬───────────┐
/// │ protocol_version │ u16  │  2 bytes  │
/// ├──────────────────┼──────┼───────────┤
/// │ move_count       │ u8   │  1 byte   │
/// ├──────────────────┼──────┼───────────┤
/// │ moves            │      │ 33 bytes  │
/// │                  │      │ per move  │
/// └──────────────────┴──────┴───────────┘
///
/// Each move:
/// ┌────────────────────┬────────┬──────────┐
/// │ timestamp          │ f32    │ 4 bytes  │
/// │ delta_time         │ f32    │ 4 bytes  │
/// │ acceleration       │ 3×f32  │ 12 bytes │
/// │ compressed_flags   │ u8     │ 1 byte   │
/// │ predicted_position │ 3×f32  │ 12 bytes │
/// └────────────────────┴────────┴──────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovePacket {
    pub protocol_version: u16,
    pub moves: Vec<ClientMove>,
}

/// Size of the packet header in bytes
pub const PACKET_HEADER_SIZE: usize = 3;

/// Size of one encoded move in bytes
pub const MOVE_WIRE_SIZE: usize = 33;

/// Maximum number of moves in one packet
pub const MAX_MOVES_PER_PACKET: usize = u8::MAX as usize;

impl GameMessage for MovePacket {
    const ROUTE_ID: u16 = routes::MOVE_PACKET;
    const SCHEMA_HASH: u64 = 0x5A71_0C4B_0000_0100;
}

impl MovePacket {
    /// Creates a packet stamped with the current protocol version
    pub fn new(moves: Vec<ClientMove>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            moves,
        }
    }

    /// Serializes the packet to bytes (big-endian)
    pub fn to_bytes(&self) -> Result<Bytes> {
        if self.moves.len() > MAX_MOVES_PER_PACKET {
            return Err(ProtocolError::TooManyMoves(self.moves.len()));
        }

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u16(self.protocol_version);
        buf.put_u8(self.moves.len() as u8);

        for mv in &self.moves {
            buf.put_f32(mv.timestamp);
            buf.put_f32(mv.delta_time);
            put_vec3(&mut buf, mv.acceleration);
            buf.put_u8(mv.compressed_flags);
            put_vec3(&mut buf, mv.predicted_position);
        }

        Ok(buf.freeze())
    }

    /// Deserializes a packet from bytes (big-endian)
    ///
    /// Rejects packets from an incompatible major version. Flag bytes are
    /// kept as received; unknown bits are ignored when the flags are decoded.
    pub fn from_bytes(mut data: Bytes) -> Result<Self> {
        if data.len() < PACKET_HEADER_SIZE {
            return Err(ProtocolError::BufferTooShort {
                need: PACKET_HEADER_SIZE,
                have: data.len(),
            });
        }

        let protocol_version = data.get_u16();
        check_remote_version(protocol_version)?;

        let count = data.get_u8() as usize;
        let need = count * MOVE_WIRE_SIZE;
        if data.len() < need {
            return Err(ProtocolError::BufferTooShort {
                need,
                have: data.len(),
            });
        }

        let mut moves = Vec::with_capacity(count);
        for _ in 0..count {
            let timestamp = data.get_f32();
            let delta_time = data.get_f32();
            let acceleration = get_vec3(&mut data);
            let compressed_flags = data.get_u8();
            let predicted_position = get_vec3(&mut data);

            moves.push(ClientMove {
                timestamp,
                delta_time,
                acceleration,
                compressed_flags,
                predicted_position,
            });
        }

        Ok(Self {
            protocol_version,
            moves,
        })
    }

    /// Returns the encoded size of the packet
    #[inline]
    pub fn encoded_len(&self) -> usize {
        PACKET_HEADER_SIZE + self.moves.len() * MOVE_WIRE_SIZE
    }
}

fn put_vec3(buf: &mut BytesMut, v: Vec3) {
    buf.put_f32(v.x);
    buf.put_f32(v.y);
    buf.put_f32(v.z);
}

fn get_vec3(data: &mut Bytes) -> Vec3 {
    let x = data.get_f32();
    let y = data.get_f32();
    let z = data.get_f32();
    Vec3::new(x, y, z)
}
