//! Serde codecs for acknowledgment and correction messages
//!
//! Move packets use the fixed binary layout in [`crate::packet`]. The
//! authoritative replies (`MoveAck`, `MoveCorrection`) are serde messages and
//! go through one of these codecs.
//!
//! # Codec IDs
//!
//! - `1`: JSON (serde_json), handy when inspecting traffic
//! - `2`: Postcard, the default on the wire
//!
//! # Usage
//!
//! ```
//! use stride_protocol::codec::{Codec, PostcardCodec};
//! use stride_protocol::MoveAck;
//!
//! let codec = PostcardCodec;
//! let ack = MoveAck { timestamp: 1.25 };
//!
//! let bytes = codec.encode(&ack).unwrap();
//! let decoded: MoveAck = codec.decode(&bytes).unwrap();
//! assert_eq!(ack, decoded);
//! ```

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ProtocolError, Result};

/// Codec trait for serializing/deserializing message payloads
pub trait Codec: Send + Sync {
    /// Returns the codec ID (1=JSON, 2=Postcard)
    fn id(&self) -> u8;

    /// Returns a human-readable name for this codec
    fn name(&self) -> &'static str;

    /// Encodes a serializable message into bytes
    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes>;

    /// Decodes bytes into a deserializable message
    fn decode<T: DeserializeOwned>(&self, bytes: &Bytes) -> Result<T>;
}

/// JSON codec (codec_id = 1)
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn id(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "JSON"
    }

    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes> {
        let vec = serde_json::to_vec(message)
            .map_err(|e| ProtocolError::Codec(format!("JSON encode failed: {}", e)))?;
        Ok(Bytes::from(vec))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &Bytes) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| ProtocolError::Codec(format!("JSON decode failed: {}", e)))
    }
}

/// Postcard codec (codec_id = 2)
///
/// Compact binary serialization; the default for corrections.
#[derive(Debug, Clone, Copy)]
pub struct PostcardCodec;

impl Codec for PostcardCodec {
    fn id(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "Postcard"
    }

    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes> {
        let vec = postcard::to_allocvec(message)
            .map_err(|e| ProtocolError::Codec(format!("Postcard encode failed: {}", e)))?;
        Ok(Bytes::from(vec))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &Bytes) -> Result<T> {
        postcard::from_bytes(bytes)
            .map_err(|e| ProtocolError::Codec(format!("Postcard decode failed: {}", e)))
    }
}

/// Codec selected at runtime by its wire ID
#[derive(Debug, Clone, Copy)]
pub enum CodecType {
    Json(JsonCodec),
    Postcard(PostcardCodec),
}

impl CodecType {
    /// Creates a CodecType from a codec ID
    pub fn from_id(codec_id: u8) -> Result<Self> {
        match codec_id {
            1 => Ok(CodecType::Json(JsonCodec)),
            2 => Ok(CodecType::Postcard(PostcardCodec)),
            _ => Err(ProtocolError::Codec(format!(
                "Unknown codec ID: {}",
                codec_id
            ))),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            CodecType::Json(c) => c.id(),
            CodecType::Postcard(c) => c.id(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CodecType::Json(c) => c.name(),
            CodecType::Postcard(c) => c.name(),
        }
    }

    pub fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes> {
        match self {
            CodecType::Json(c) => c.encode(message),
            CodecType::Postcard(c) => c.encode(message),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &Bytes) -> Result<T> {
        match self {
            CodecType::Json(c) => c.decode(bytes),
            CodecType::Postcard(c) => c.decode(bytes),
        }
    }
}

impl Default for CodecType {
    fn default() -> Self {
        CodecType::Postcard(PostcardCodec)
    }
}
