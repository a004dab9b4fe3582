//! Protocol versioning for move packets
//!
//! Version format: `MAJOR << 8 | MINOR`
//! - v1.0 = 0x0100 (256)
//! - v1.1 = 0x0101 (257)
//!
//! ## Compatibility Rules
//! - MAJOR change = the flag byte layout or packet layout changed (incompatible)
//! - MINOR change = a free custom flag bit was assigned (older peers ignore it)

use crate::error::{ProtocolError, Result};

/// Current protocol version (v1.0)
pub const PROTOCOL_VERSION: u16 = 0x0100;

/// Extracts the major version number
#[inline]
pub fn major_version(version: u16) -> u8 {
    (version >> 8) as u8
}

/// Extracts the minor version number
#[inline]
pub fn minor_version(version: u16) -> u8 {
    (version & 0xFF) as u8
}

/// Creates a version number from major and minor components
#[inline]
pub fn make_version(major: u8, minor: u8) -> u16 {
    ((major as u16) << 8) | (minor as u16)
}

/// Checks if two versions are compatible (same major version)
#[inline]
pub fn is_compatible(version_a: u16, version_b: u16) -> bool {
    major_version(version_a) == major_version(version_b)
}

/// Accepts a peer's version if it shares our major version
///
/// # Example
/// ```
/// use stride_protocol::version::{check_remote_version, PROTOCOL_VERSION};
///
/// assert!(check_remote_version(0x0105).is_ok());
/// assert!(check_remote_version(0x0200).is_err());
/// # let _ = PROTOCOL_VERSION;
/// ```
pub fn check_remote_version(remote: u16) -> Result<()> {
    if is_compatible(PROTOCOL_VERSION, remote) {
        Ok(())
    } else {
        Err(ProtocolError::VersionMismatch {
            local: PROTOCOL_VERSION,
            remote,
        })
    }
}
