//! # Stride Simulation Layer
//!
//! Client-side prediction with server reconciliation for a timed sprint
//! ability layered on top of character movement.
//!
//! ## Architecture
//!
//! - **Predicting side** ([`predictor::SprintPredictor`]): authors ticks immediately,
//!   folds compatible ticks into one pending [`saved_move::SavedMove`], sends it
//!   once closed and replays sent moves when a correction arrives
//! - **Authoritative side** ([`authority::SprintAuthority`]): re-runs every client
//!   tick from the wire packet and answers with an ack or a correction
//! - **Shared**: both sides run the same [`tick::TickContext::run`] over the same
//!   [`state_machine`] and the same [`MovementStep`] implementation
//!
//! Time is always passed in explicitly as `now`; nothing here reads a clock.
//!
//! ## Example
//!
//! ```rust
//! use stride_simulation::movement::FlatGroundMovement;
//! use stride_simulation::predictor::SprintPredictor;
//! use stride_simulation::saved_move::BaseInput;
//! use stride_protocol::Vec3;
//!
//! let mut predictor = SprintPredictor::new(FlatGroundMovement::default());
//! predictor.request_start();
//!
//! let base = BaseInput {
//!     acceleration: Vec3::new(2048.0, 0.0, 0.0),
//!     ..Default::default()
//! };
//! let sent = predictor.tick(base, 1.0 / 60.0, 0.0).unwrap();
//! assert!(sent.is_empty()); // still open for merging
//!
//! let mv = predictor.flush().unwrap();
//! assert!(predictor.sprint().active);
//! assert!(mv.flags().sprint_pressed);
//! ```

pub mod ability;
pub mod authority;
pub mod config;
pub mod history;
pub mod merge;
pub mod movement;
pub mod predictor;
pub mod reconciler;
pub mod saved_move;
pub mod state_machine;
pub mod tick;

pub use ability::{SprintConfig, SprintState};
pub use authority::{AuthorityConfig, AuthorityError, MoveVerdict, SprintAuthority};
pub use config::{ConfigError, StrideConfig};
pub use history::{HistoryError, MoveHistory};
pub use merge::MergePolicy;
pub use predictor::{PredictorConfig, SprintPredictor};
pub use reconciler::{ReconcileError, Reconciler, ReplayReport};
pub use saved_move::{BaseInput, MoveInput, SavedMove};
pub use state_machine::{Eligibility, GroundedEligibility, TickMode, Transition};

use stride_protocol::PhysicsState;

/// Speed and acceleration caps handed to the movement step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementLimits {
    pub max_speed: f32,
    pub max_acceleration: f32,
}

/// External movement physics
///
/// The sprint protocol only needs a pure step: same `(state, input, limits,
/// delta_time)` must give the same result on every machine, every time.
///
/// # Example
///
/// ```rust
/// use stride_simulation::{MovementLimits, MovementStep, MoveInput};
/// use stride_protocol::PhysicsState;
///
/// struct Teleporter;
///
/// impl MovementStep for Teleporter {
///     fn base_limits(&self) -> MovementLimits {
///         MovementLimits { max_speed: 600.0, max_acceleration: 2048.0 }
///     }
///
///     fn step(
///         &self,
///         state: &PhysicsState,
///         input: &MoveInput,
///         _limits: MovementLimits,
///         delta_time: f32,
///     ) -> PhysicsState {
///         let mut next = *state;
///         next.position = next.position + input.acceleration * delta_time;
///         next
///     }
/// }
/// ```
pub trait MovementStep {
    /// Walking limits before any ability modifies them
    ///
    /// `max_speed` doubles as the walk speed the sprint acceleration rule
    /// compares against.
    fn base_limits(&self) -> MovementLimits;

    /// Advances the character by `delta_time`
    fn step(
        &self,
        state: &PhysicsState,
        input: &MoveInput,
        limits: MovementLimits,
        delta_time: f32,
    ) -> PhysicsState;
}
