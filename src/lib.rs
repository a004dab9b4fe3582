//! # Stride
//!
//! Client-side predicted, server-reconciled sprint ability for networked
//! character movement:
//! - Timed sprint with cooldown, edge-triggered timers
//! - One-byte compressed input flags with a fixed, versioned bit layout
//! - Saved-move history with merging, acknowledgment and replay
//! - Authoritative per-session validation with ack/correction answers
//!
//! ## Components
//!
//! - `stride-protocol`: wire types, flag codec, move packets, codecs and versioning
//! - `stride-simulation`: sprint state machine, predicting and authoritative sides
//!
//! ## Example
//!
//! See `demos/sprint_demo.rs` for a predicting side and an authoritative side
//! talking through encoded packets.

pub use stride_protocol as protocol;
pub use stride_simulation as simulation;
