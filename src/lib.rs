// src/lib.rs

//! `qonnect` - engine for a connect-four variant played on a shared quantum
//! state
//!
//! One qubit per board column. A move either applies a gate from a fixed
//! eight-gate set or measures a column; measurement collapses the column's
//! qubit by the Born rule, drags entangled columns down with it, and turns
//! the observed bits into coins. Four equal bits in a row win.
//!
//! Two remote players each hold their own [`GameSession`]. The sessions
//! start identical because the opening circuit is re-derived from a shared
//! seed, and they stay identical because every move travels as a
//! [`MoveRecord`] carrying the full outcome of the action, measurement
//! cascades included.

pub mod circuits;
pub mod core;
pub mod net;
pub mod operations;
pub mod session;
pub mod simulation;

// Re-export the most common types for easier top-level use
pub use circuits::Circuit;
pub use core::{Board, GameError, Player, StateVector};
pub use net::{Relay, TcpRelay, server::RelayServer};
pub use operations::Gate;
pub use session::{
    GameConfig, GameSession, MoveAction, MoveRecord, NOT_MEASURED, SessionPhase, SessionSetup,
    SyncStatus,
};
pub use simulation::Measurement;

// Example: a full exchange between two in-process sessions.
// Demonstrates the lockstep that normally runs over the relay: both sides
// derive the same opening circuit from the seed, then replay each other's
// move records.
/// ```
/// use qonnect::{GameConfig, GameError, GameSession, Gate, Player, SyncStatus};
///
/// let config = GameConfig::new(4, 42, 1)?;
/// let mut first = GameSession::new(config, Player::Zero)?;
/// let mut second = GameSession::new(config, Player::One)?;
///
/// // Player 0 opens with a Hadamard on column 1 and ships the record.
/// let record = first.play_gate(Gate::H { target: 1 })?;
/// assert_eq!(second.apply_remote(&record)?, SyncStatus::Applied);
///
/// // Player 1 measures column 1; the observed bit lands on both boards.
/// let (record, measurement) = second.measure(1)?;
/// first.apply_remote(&record)?;
/// assert!(measurement.outcome <= 1);
/// assert_eq!(first.board().height(1), second.board().height(1));
///
/// // The amplitude vectors never drift apart.
/// for (a, b) in first.state().vector().iter().zip(second.state().vector()) {
///     assert!((a - b).norm_sqr() < 1e-12);
/// }
/// # Ok::<(), GameError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
