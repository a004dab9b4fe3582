//! Authoritative side of the sprint protocol
//!
//! This module provides `SprintAuthority` which keeps one canonical character
//! per client session and handles:
//! - Move validation (finite values, timestamps strictly increase, bounded tick length)
//! - Re-running each client tick with the same state machine and movement step
//! - Acknowledging matching predictions and correcting diverging ones
//!
//! A move may cover several ticks the client folded together. It is applied
//! as one step of its full `delta_time`, exactly as the client simulated it.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use stride_protocol::{
    ClientMove, MoveAck, MoveCorrection, MovePacket, PhysicsState, ProtocolError, SessionId,
};

use crate::ability::{SprintConfig, SprintState};
use crate::saved_move::MoveInput;
use crate::state_machine::{Eligibility, GroundedEligibility, TickMode};
use crate::tick::TickContext;
use crate::MovementStep;

/// Authoritative-side tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    pub sprint: SprintConfig,

    /// Largest accepted distance between predicted and authoritative position
    pub position_tolerance: f32,

    /// Longest accepted client tick, in seconds
    pub max_delta_time: f32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            sprint: SprintConfig::default(),
            position_tolerance: 1.0,
            max_delta_time: 0.125,
        }
    }
}

/// Canonical state of one client's character
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AuthoritativeCharacter {
    pub sprint: SprintState,
    pub physics: PhysicsState,

    /// Timestamp of the last applied move
    pub last_timestamp: Option<f32>,
}

impl AuthoritativeCharacter {
    pub fn new(physics: PhysicsState) -> Self {
        Self {
            physics,
            ..Default::default()
        }
    }
}

/// Answer to one applied client move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveVerdict {
    /// Prediction matched within tolerance
    Ack(MoveAck),

    /// Prediction diverged; the client must rewind to this state
    Correct(MoveCorrection),
}

impl MoveVerdict {
    pub fn timestamp(&self) -> f32 {
        match self {
            MoveVerdict::Ack(ack) => ack.timestamp,
            MoveVerdict::Correct(correction) => correction.timestamp,
        }
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, MoveVerdict::Ack(_))
    }
}

/// Server-side authoritative sprint simulation
///
/// # Example
///
/// ```rust
/// use stride_simulation::authority::{SprintAuthority, MoveVerdict};
/// use stride_simulation::movement::FlatGroundMovement;
/// use stride_protocol::{ClientMove, SessionId, Vec3};
///
/// let mut authority = SprintAuthority::new(FlatGroundMovement::default());
/// let session_id = SessionId::new_v4();
///
/// let mv = ClientMove {
///     timestamp: 0.0,
///     delta_time: 0.016,
///     acceleration: Vec3::ZERO,
///     compressed_flags: 0,
///     predicted_position: Vec3::ZERO,
/// };
///
/// match authority.apply_move(session_id, &mv) {
///     Ok(MoveVerdict::Ack(ack)) => println!("Acknowledged {}", ack.timestamp),
///     Ok(MoveVerdict::Correct(correction)) => println!("Correcting {}", correction.timestamp),
///     Err(e) => println!("Move rejected: {}", e),
/// }
/// ```
pub struct SprintAuthority<M, E = GroundedEligibility> {
    config: AuthorityConfig,
    movement: M,
    eligibility: E,

    /// One canonical character per client session
    sessions: HashMap<SessionId, AuthoritativeCharacter>,
}

impl<M: MovementStep> SprintAuthority<M> {
    pub fn new(movement: M) -> Self {
        Self::with_config(movement, AuthorityConfig::default())
    }

    pub fn with_config(movement: M, config: AuthorityConfig) -> Self {
        Self::with_eligibility(movement, config, GroundedEligibility)
    }
}

impl<M: MovementStep, E: Eligibility> SprintAuthority<M, E> {
    /// Creates an authority with a host-supplied sprint eligibility rule
    pub fn with_eligibility(movement: M, config: AuthorityConfig, eligibility: E) -> Self {
        Self {
            config,
            movement,
            eligibility,
            sessions: HashMap::new(),
        }
    }

    /// Spawns a character for `session_id`, replacing any existing one
    pub fn add_session(&mut self, session_id: SessionId, physics: PhysicsState) {
        self.sessions
            .insert(session_id, AuthoritativeCharacter::new(physics));
    }

    /// Removes a session (call when client disconnects)
    pub fn remove_session(&mut self, session_id: SessionId) -> Option<AuthoritativeCharacter> {
        self.sessions.remove(&session_id)
    }

    /// Applies one client tick to the session's canonical character
    ///
    /// A session seen for the first time gets a default character. Rejected
    /// moves leave the character untouched.
    ///
    /// # Errors
    ///
    /// - [`AuthorityError::NonFinite`]: a wire field is NaN or infinite
    /// - [`AuthorityError::StaleMove`]: timestamp is not after the last applied one
    /// - [`AuthorityError::InvalidDeltaTime`]: tick length is not in `(0, max_delta_time]`
    pub fn apply_move(
        &mut self,
        session_id: SessionId,
        mv: &ClientMove,
    ) -> Result<MoveVerdict, AuthorityError> {
        let character = self
            .sessions
            .entry(session_id)
            .or_insert_with(AuthoritativeCharacter::default);

        if let Err(error) = validate(session_id, character, mv, self.config.max_delta_time) {
            tracing::warn!(session = %session_id, %error, "Rejected client move");
            return Err(error);
        }

        let input = MoveInput::from_wire(mv.acceleration, mv.compressed_flags);
        let ctx = TickContext::new(&self.config.sprint, &self.movement, &self.eligibility);
        let transition = ctx.run(
            &mut character.sprint,
            &mut character.physics,
            &input,
            mv.delta_time,
            mv.timestamp,
            TickMode::Authoring,
        );
        character.last_timestamp = Some(mv.timestamp);

        let error_squared = character
            .physics
            .position
            .distance_squared(&mv.predicted_position);
        let tolerance = self.config.position_tolerance;

        tracing::debug!(
            session = %session_id,
            timestamp = mv.timestamp,
            ?transition,
            position_error = error_squared.sqrt(),
            "Applied client move to authoritative character"
        );

        if error_squared <= tolerance * tolerance {
            Ok(MoveVerdict::Ack(MoveAck {
                timestamp: mv.timestamp,
            }))
        } else {
            Ok(MoveVerdict::Correct(MoveCorrection {
                timestamp: mv.timestamp,
                sprint: character.sprint.snapshot(),
                physics: character.physics,
            }))
        }
    }

    /// Applies every move of a packet in order
    ///
    /// Moves already applied (resends) are skipped. Any other rejection
    /// stops the packet.
    pub fn apply_packet(
        &mut self,
        session_id: SessionId,
        packet: &MovePacket,
    ) -> Result<Vec<MoveVerdict>, AuthorityError> {
        let mut verdicts = Vec::with_capacity(packet.moves.len());
        for mv in &packet.moves {
            match self.apply_move(session_id, mv) {
                Ok(verdict) => verdicts.push(verdict),
                Err(AuthorityError::StaleMove { .. }) => {
                    tracing::trace!(session = %session_id, timestamp = mv.timestamp, "Skipped resent move");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(verdicts)
    }

    /// Decodes a binary move packet and applies it
    pub fn apply_packet_bytes(
        &mut self,
        session_id: SessionId,
        data: Bytes,
    ) -> Result<Vec<MoveVerdict>, AuthorityError> {
        let packet = MovePacket::from_bytes(data)?;
        self.apply_packet(session_id, &packet)
    }

    /// Builds a correction carrying the session's canonical state
    pub fn capture_from_authoritative(
        &self,
        session_id: SessionId,
    ) -> Result<MoveCorrection, AuthorityError> {
        let character = self
            .sessions
            .get(&session_id)
            .ok_or(AuthorityError::UnknownSession(session_id))?;

        Ok(MoveCorrection {
            timestamp: character.last_timestamp.unwrap_or(0.0),
            sprint: character.sprint.snapshot(),
            physics: character.physics,
        })
    }

    /// Returns the canonical character for a session
    pub fn character(&self, session_id: SessionId) -> Option<&AuthoritativeCharacter> {
        self.sessions.get(&session_id)
    }

    /// Returns the timestamp of the last applied move for a session
    pub fn last_timestamp(&self, session_id: SessionId) -> Option<f32> {
        self.sessions
            .get(&session_id)
            .and_then(|c| c.last_timestamp)
    }

    /// Returns the number of active sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns all active session IDs
    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }
}

fn validate(
    session_id: SessionId,
    character: &AuthoritativeCharacter,
    mv: &ClientMove,
    max_delta_time: f32,
) -> Result<(), AuthorityError> {
    let non_finite = if !mv.timestamp.is_finite() {
        Some("timestamp")
    } else if !mv.acceleration.is_finite() {
        Some("acceleration")
    } else if !mv.predicted_position.is_finite() {
        Some("predicted_position")
    } else {
        None
    };
    if let Some(field) = non_finite {
        return Err(AuthorityError::NonFinite { session_id, field });
    }

    if let Some(last_timestamp) = character.last_timestamp {
        if mv.timestamp <= last_timestamp {
            return Err(AuthorityError::StaleMove {
                session_id,
                timestamp: mv.timestamp,
                last_timestamp,
            });
        }
    }

    // Also rejects NaN
    if !(mv.delta_time > 0.0 && mv.delta_time <= max_delta_time) {
        return Err(AuthorityError::InvalidDeltaTime {
            session_id,
            delta_time: mv.delta_time,
        });
    }

    Ok(())
}

/// Authoritative simulation errors
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// No character for this session
    #[error("Unknown session {0}")]
    UnknownSession(SessionId),

    /// Move carries a NaN or infinite value
    #[error("Non-finite {field} in move from session {session_id}")]
    NonFinite {
        session_id: SessionId,
        field: &'static str,
    },

    /// Move is not newer than the last applied one
    #[error("Stale move from session {session_id}: timestamp {timestamp}, last applied {last_timestamp}")]
    StaleMove {
        session_id: SessionId,
        timestamp: f32,
        last_timestamp: f32,
    },

    /// Tick length out of range
    #[error("Invalid delta time from session {session_id}: {delta_time}")]
    InvalidDeltaTime { session_id: SessionId, delta_time: f32 },

    /// Packet could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
