//! Compressed per-tick input flags
//!
//! Every authored tick carries one flag byte on the wire. The layout is a
//! protocol constant: changing the meaning of an existing bit is a breaking
//! change, new abilities take one of the free custom bits instead.
//!
//! ```text
//!  7 6 5 4  3 2 1 0
//!  | | | |  | | | +- JUMP_PRESSED
//!  | | | |  | | +--- WANTS_TO_CROUCH
//!  | | | |  | +----- RESERVED_1 (base framework, unused)
//!  | | | |  +------- RESERVED_2 (base framework, unused)
//!  | | | +---------- CUSTOM_0 = sprint pressed
//!  | | +------------ CUSTOM_1 (free)
//!  | +-------------- CUSTOM_2 (free)
//!  +---------------- CUSTOM_3 (free)
//! ```
//!
//! # Example
//!
//! ```
//! use stride_protocol::flags::InputFlags;
//!
//! let flags = InputFlags {
//!     sprint_pressed: true,
//!     ..Default::default()
//! };
//!
//! assert_eq!(flags.encode(), 0x10);
//! assert_eq!(InputFlags::decode(0x10), flags);
//! ```

use bitflags::bitflags;

bitflags! {
    /// Raw bit positions of the compressed flag byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        /// Jump button held this tick
        const JUMP_PRESSED = 0b0000_0001;
        /// Character wants to crouch
        const WANTS_TO_CROUCH = 0b0000_0010;
        /// Reserved for future base framework use
        const RESERVED_1 = 0b0000_0100;
        /// Reserved for future base framework use
        const RESERVED_2 = 0b0000_1000;
        const CUSTOM_0 = 0b0001_0000;
        const CUSTOM_1 = 0b0010_0000;
        const CUSTOM_2 = 0b0100_0000;
        const CUSTOM_3 = 0b1000_0000;
    }
}

impl MoveFlags {
    /// Sprint button held this tick
    pub const SPRINT_PRESSED: MoveFlags = MoveFlags::CUSTOM_0;

    /// Bits this protocol version assigns a meaning to
    pub const DEFINED: MoveFlags = MoveFlags::JUMP_PRESSED
        .union(MoveFlags::WANTS_TO_CROUCH)
        .union(MoveFlags::SPRINT_PRESSED);
}

/// Bit assignment table, one entry per bit from LSB to MSB
pub const FLAG_LAYOUT: [(MoveFlags, &str); 8] = [
    (MoveFlags::JUMP_PRESSED, "jump_pressed"),
    (MoveFlags::WANTS_TO_CROUCH, "wants_to_crouch"),
    (MoveFlags::RESERVED_1, "reserved_1"),
    (MoveFlags::RESERVED_2, "reserved_2"),
    (MoveFlags::CUSTOM_0, "sprint_pressed"),
    (MoveFlags::CUSTOM_1, "custom_1"),
    (MoveFlags::CUSTOM_2, "custom_2"),
    (MoveFlags::CUSTOM_3, "custom_3"),
];

/// Decoded view of the flag byte
///
/// Only the bits in [`MoveFlags::DEFINED`] are represented. Encoding never
/// writes any other bit, and decoding ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFlags {
    pub jump_pressed: bool,
    pub wants_to_crouch: bool,
    pub sprint_pressed: bool,
}

impl InputFlags {
    /// Packs the flags into the wire byte
    pub fn encode(&self) -> u8 {
        self.to_move_flags().bits()
    }

    /// Unpacks a wire byte
    ///
    /// Unknown, reserved and free custom bits are dropped; a byte from a newer
    /// peer never fails to decode.
    pub fn decode(byte: u8) -> Self {
        Self::from_move_flags(MoveFlags::from_bits_truncate(byte))
    }

    pub fn to_move_flags(&self) -> MoveFlags {
        let mut flags = MoveFlags::empty();
        flags.set(MoveFlags::JUMP_PRESSED, self.jump_pressed);
        flags.set(MoveFlags::WANTS_TO_CROUCH, self.wants_to_crouch);
        flags.set(MoveFlags::SPRINT_PRESSED, self.sprint_pressed);
        flags
    }

    pub fn from_move_flags(flags: MoveFlags) -> Self {
        Self {
            jump_pressed: flags.contains(MoveFlags::JUMP_PRESSED),
            wants_to_crouch: flags.contains(MoveFlags::WANTS_TO_CROUCH),
            sprint_pressed: flags.contains(MoveFlags::SPRINT_PRESSED),
        }
    }
}
