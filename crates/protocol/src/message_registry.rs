//! Message registry for type-safe message handling
//!
//! Every stride message has a fixed route ID and a schema hash. Both sides
//! compare the global hash of their registries to detect mismatched builds
//! before exchanging moves.
//!
//! # Example
//!
//! ```
//! use stride_protocol::message_registry::MessageRegistry;
//!
//! let local = MessageRegistry::with_stride_messages();
//! let remote = MessageRegistry::with_stride_messages();
//! assert_eq!(local.global_schema_hash(), remote.global_schema_hash());
//! ```

use serde::{de::DeserializeOwned, Serialize};

use crate::messages::{MoveAck, MoveCorrection};
use crate::packet::MovePacket;

/// Trait for type-safe game messages
///
/// Schema hashes are assigned by hand:
/// - Use a unique 64-bit value for each message type
/// - Change the hash when the message structure changes (breaking change)
pub trait GameMessage: Serialize + DeserializeOwned + Send + Sync {
    /// Route ID for this message type (must be >= 100)
    const ROUTE_ID: u16;

    /// Schema hash for compatibility checking
    const SCHEMA_HASH: u64;
}

/// Calculates a global schema hash from all registered message types
///
/// XOR of the individual hashes, so registration order does not matter.
pub fn calculate_global_schema_hash(message_hashes: &[u64]) -> u64 {
    message_hashes.iter().fold(0u64, |acc, &hash| acc ^ hash)
}

/// Registry of message route IDs and schema hashes
#[derive(Debug, Default)]
pub struct MessageRegistry {
    registered_routes: Vec<(u16, u64)>,
}

impl MessageRegistry {
    /// Creates a new empty message registry
    pub fn new() -> Self {
        Self {
            registered_routes: Vec::new(),
        }
    }

    /// Creates a registry holding every message of this protocol version
    pub fn with_stride_messages() -> Self {
        let mut registry = Self::new();
        registry.register::<MovePacket>();
        registry.register::<MoveAck>();
        registry.register::<MoveCorrection>();
        registry
    }

    /// Registers a message type
    pub fn register<T: GameMessage>(&mut self) {
        self.registered_routes.push((T::ROUTE_ID, T::SCHEMA_HASH));
    }

    /// Returns the global schema hash for all registered messages
    pub fn global_schema_hash(&self) -> u64 {
        let hashes: Vec<u64> = self.registered_routes.iter().map(|(_, hash)| *hash).collect();
        calculate_global_schema_hash(&hashes)
    }

    pub fn len(&self) -> usize {
        self.registered_routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered_routes.is_empty()
    }

    pub fn is_registered(&self, route_id: u16) -> bool {
        self.registered_routes.iter().any(|(id, _)| *id == route_id)
    }

    pub fn get_schema_hash(&self, route_id: u16) -> Option<u64> {
        self.registered_routes
            .iter()
            .find(|(id, _)| *id == route_id)
            .map(|(_, hash)| *hash)
    }
}
