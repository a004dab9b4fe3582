//! # Stride Protocol
//!
//! Wire definitions shared by the predicting client and the authoritative
//! server of the stride movement protocol.
//!
//! This crate provides:
//! - `MoveFlags` / `InputFlags`: the one-byte compressed input flags
//! - `ClientMove` / `MovePacket`: authored ticks in a fixed binary layout
//! - `MoveAck` / `MoveCorrection`: authoritative replies
//! - `Vec3`, `PhysicsState`, `SprintSnapshot`: data both sides must agree on
//! - Serde codecs, the message registry and protocol versioning
//!
//! ## Example
//!
//! ```
//! use stride_protocol::{ClientMove, InputFlags, MovePacket, Vec3};
//!
//! let flags = InputFlags { sprint_pressed: true, ..Default::default() };
//! let packet = MovePacket::new(vec![ClientMove {
//!     timestamp: 0.0,
//!     delta_time: 1.0 / 60.0,
//!     acceleration: Vec3::new(2048.0, 0.0, 0.0),
//!     compressed_flags: flags.encode(),
//!     predicted_position: Vec3::ZERO,
//! }]);
//!
//! let bytes = packet.to_bytes().unwrap();
//! let received = MovePacket::from_bytes(bytes).unwrap();
//! assert!(received.moves[0].flags().sprint_pressed);
//! ```

pub mod codec;
pub mod error;
pub mod flags;
pub mod message_registry;
pub mod messages;
pub mod packet;
pub mod types;
pub mod version;

pub use codec::{Codec, CodecType, JsonCodec, PostcardCodec};
pub use error::{ProtocolError, Result};
pub use flags::{InputFlags, MoveFlags, FLAG_LAYOUT};
pub use message_registry::{calculate_global_schema_hash, GameMessage, MessageRegistry};
pub use messages::{MoveAck, MoveCorrection};
pub use packet::{ClientMove, MovePacket, MOVE_WIRE_SIZE, PACKET_HEADER_SIZE};
pub use types::{PhysicsState, SprintSnapshot, Vec3};
pub use version::{check_remote_version, PROTOCOL_VERSION};

/// Identifies one connected character on the authoritative side
///
/// Internal routing only; never written to the wire.
pub type SessionId = uuid::Uuid;
