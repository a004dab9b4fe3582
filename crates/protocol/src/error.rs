use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Buffer too short: need {need} bytes, have {have}")]
    BufferTooShort { need: usize, have: usize },

    #[error("Protocol version mismatch: local {local:#06x}, remote {remote:#06x}")]
    VersionMismatch { local: u16, remote: u16 },

    #[error("Too many moves for one packet: {0} (max 255)")]
    TooManyMoves(usize),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
