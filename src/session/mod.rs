// src/session/mod.rs

//! One player's view of a running game, and the state machine that keeps two
//! remote views consistent.
//!
//! A session exclusively owns its board, amplitude vector and circuit log.
//! Strict alternation is enforced with two move counters: the local one and
//! the last known remote one. The first player may act when they are equal,
//! the second when the local counter is exactly one behind. Every permitted
//! action produces a [`MoveRecord`] for the opponent; applying an opponent's
//! record replays the gate, or forces the recorded measurement outcomes onto
//! the local state instead of re-sampling them.

pub mod record;

pub use record::{MoveAction, MoveRecord, NOT_MEASURED, SessionSetup};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::circuits::{Circuit, generator};
use crate::core::{Board, GameError, Player, StateVector};
use crate::net::Relay;
use crate::operations::Gate;
use crate::simulation::Measurement;
use crate::simulation::engine::QuantumEngine;

/// Smallest board that can hold a four-in-a-row.
const MIN_COLUMNS: usize = 4;
/// Largest supported board; the amplitude vector has 2^N entries.
const MAX_COLUMNS: usize = 12;

/// Immutable parameters both players must agree on before the first move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Board side length; also the number of qubits.
    pub columns: usize,
    /// Seed of the shared opening circuit.
    pub seed: u32,
    /// Generator rounds over the columns.
    pub depth: usize,
}

impl GameConfig {
    /// Validates and builds a config.
    pub fn new(columns: usize, seed: u32, depth: usize) -> Result<Self, GameError> {
        if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&columns) {
            return Err(GameError::InvalidOperation {
                message: format!(
                    "board must have {}..={} columns, got {}",
                    MIN_COLUMNS, MAX_COLUMNS, columns
                ),
            });
        }
        if depth == 0 {
            return Err(GameError::InvalidOperation {
                message: "circuit depth must be at least 1".to_string(),
            });
        }
        Ok(Self { columns, seed, depth })
    }
}

/// Where the session's turn machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The local player may act.
    AwaitingLocal,
    /// Waiting for the opponent's move record.
    AwaitingRemote,
    /// A win was detected; all further actions are frozen.
    Ended,
}

/// What applying a fetched record did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The record was new and has been applied.
    Applied,
    /// The record was a duplicate or the relay placeholder; nothing changed.
    Stale,
}

/// One player's complete game state.
///
/// Both players hold their own `GameSession`; the amplitude vectors start
/// identical because the opening circuit is re-derived from the shared seed,
/// and they stay identical because measurement outcomes travel inside the
/// move records instead of being re-sampled.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    role: Player,
    engine: QuantumEngine,
    circuit: Circuit,
    board: Board,
    local_moves: u32,
    remote_moves: u32,
    winner: Option<Player>,
    ended: bool,
    last_record: Option<MoveRecord>,
    rng: StdRng,
}

impl GameSession {
    /// Creates a session and runs the seeded opening circuit. `role` is the
    /// side this process plays; [`Player::Zero`] always moves first.
    pub fn new(config: GameConfig, role: Player) -> Result<Self, GameError> {
        let mut engine = QuantumEngine::new(config.columns);
        let mut circuit = Circuit::new(config.columns);
        for gate in generator::generate(config.seed, config.columns, config.depth) {
            engine.apply_gate(&gate)?;
            circuit.push(gate);
        }

        Ok(Self {
            board: Board::new(config.columns),
            config,
            role,
            engine,
            circuit,
            local_moves: 0,
            remote_moves: 0,
            winner: None,
            ended: false,
            last_record: None,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Creates the hosting session and publishes the setup tuple through the
    /// relay so the opponent can join.
    pub fn host<R: Relay>(relay: &mut R, config: GameConfig, role: Player) -> Result<Self, GameError> {
        let setup = SessionSetup {
            seed: config.seed,
            depth: config.depth,
            columns: config.columns,
            start_player: role,
        };
        relay.exchange(&format!("seed:{}", setup))?;
        Self::new(config, role)
    }

    /// Joins a hosted game: asks the relay for the setup tuple and takes the
    /// role the host did not.
    pub fn join<R: Relay>(relay: &mut R) -> Result<Self, GameError> {
        let reply = relay.exchange("seed:want")?;
        let setup: SessionSetup = reply.trim().parse()?;
        let config = GameConfig::new(setup.columns, setup.seed, setup.depth)?;
        Self::new(config, setup.start_player.other())
    }

    // --- Read-only views ---

    /// The agreed game parameters.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The side this session plays.
    pub fn role(&self) -> Player {
        self.role
    }

    /// The board as currently revealed by measurements.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Every gate applied so far, opening circuit included.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The current amplitude vector.
    pub fn state(&self) -> &StateVector {
        self.engine.state()
    }

    /// This player's move counter.
    pub fn local_moves(&self) -> u32 {
        self.local_moves
    }

    /// The last move number seen from the opponent.
    pub fn remote_moves(&self) -> u32 {
        self.remote_moves
    }

    /// The winner, once a four-in-a-row exists.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Whether the session has reached its terminal state.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Current position of the turn machine.
    pub fn phase(&self) -> SessionPhase {
        if self.ended {
            SessionPhase::Ended
        } else if self.is_local_turn() {
            SessionPhase::AwaitingLocal
        } else {
            SessionPhase::AwaitingRemote
        }
    }

    /// Whose turn it is, in absolute player terms.
    pub fn current_turn(&self) -> Player {
        if self.is_local_turn() { self.role } else { self.role.other() }
    }

    fn is_local_turn(&self) -> bool {
        match self.role {
            Player::Zero => self.local_moves == self.remote_moves,
            Player::One => self.local_moves + 1 == self.remote_moves,
        }
    }

    // --- Local actions ---

    /// Applies a gate as this player's move. Produces the record to send.
    pub fn play_gate(&mut self, gate: Gate) -> Result<MoveRecord, GameError> {
        self.ensure_local_turn()?;
        self.ensure_columns_not_full(&gate.operands())?;
        self.engine.apply_gate(&gate)?;
        self.circuit.push(gate);

        self.local_moves += 1;
        let record = MoveRecord {
            player: self.role,
            sequence: self.local_moves,
            action: MoveAction::Gate(gate),
        };
        self.last_record = Some(record.clone());
        Ok(record)
    }

    /// Measures `column` as this player's move. The returned record carries
    /// the primary outcome and every cascade so the opponent can replay them
    /// without re-sampling.
    pub fn measure(&mut self, column: usize) -> Result<(MoveRecord, Measurement), GameError> {
        self.ensure_local_turn()?;
        if column >= self.config.columns {
            return Err(GameError::IllegalMove {
                message: format!("column {} out of bounds (0..{})", column, self.config.columns),
            });
        }
        if self.board.is_full(column) {
            return Err(GameError::IllegalMove {
                message: format!("column {} is full", column),
            });
        }

        let measurement = self.engine.measure_with_cascade(column, &mut self.rng)?;
        let mut outcomes = vec![NOT_MEASURED; self.config.columns];
        for (col, bit) in measurement.all_outcomes() {
            self.drop_coin(col, bit)?;
            outcomes[col] = bit as i8;
        }

        self.local_moves += 1;
        let record = MoveRecord {
            player: self.role,
            sequence: self.local_moves,
            action: MoveAction::Measure { column, outcomes },
        };
        self.last_record = Some(record.clone());
        self.detect_win();
        Ok((record, measurement))
    }

    // --- Remote actions ---

    /// Applies an opponent's record. Duplicates and the relay's "no move yet"
    /// placeholder are ignored silently; everything else either applies fully
    /// or reports an error with the session unchanged.
    pub fn apply_remote(&mut self, record: &MoveRecord) -> Result<SyncStatus, GameError> {
        if self.ended || record.sequence == 0 || record.sequence == self.remote_moves {
            debug!(sequence = record.sequence, "ignoring stale move record");
            return Ok(SyncStatus::Stale);
        }

        match &record.action {
            MoveAction::Gate(gate) => {
                self.ensure_columns_not_full(&gate.operands())?;
                self.engine.apply_gate(gate)?;
                self.circuit.push(*gate);
            }
            MoveAction::Measure { column, outcomes } => {
                self.replay_measurement(*column, outcomes)?;
            }
        }

        self.remote_moves = record.sequence;
        debug!(
            sequence = record.sequence,
            player = %record.player,
            "applied remote move"
        );
        self.detect_win();
        Ok(SyncStatus::Applied)
    }

    /// Re-derives an opponent's measurement by forcing each recorded column
    /// to its recorded bit, primary column first, then the cascaded columns
    /// in ascending order.
    fn replay_measurement(&mut self, column: usize, outcomes: &[i8]) -> Result<(), GameError> {
        if outcomes.len() != self.config.columns {
            return Err(GameError::MalformedRecord {
                message: format!(
                    "measurement record lists {} columns, board has {}",
                    outcomes.len(),
                    self.config.columns
                ),
            });
        }
        if column >= self.config.columns || !matches!(outcomes[column], 0 | 1) {
            return Err(GameError::MalformedRecord {
                message: format!("measurement record has no outcome for its own column {}", column),
            });
        }

        let bit = outcomes[column] as u8;
        self.engine.collapse(column, bit)?;
        self.drop_coin(column, bit)?;

        for (col, &recorded) in outcomes.iter().enumerate() {
            if col == column || recorded == NOT_MEASURED {
                continue;
            }
            let bit = recorded as u8;
            self.engine.collapse(col, bit)?;
            self.drop_coin(col, bit)?;
        }
        Ok(())
    }

    // --- Relay-driven convenience ---

    /// Sends this player's most recent move record through the relay.
    pub fn send_move<R: Relay>(&self, relay: &mut R) -> Result<(), GameError> {
        let record = self.last_record.as_ref().ok_or_else(|| GameError::IllegalMove {
            message: "no local move to send yet".to_string(),
        })?;
        relay.exchange(&record.to_string())?;
        Ok(())
    }

    /// Polls the relay for the opponent's latest record and applies it.
    /// Polling is idempotent; a repeat fetch of an old record reports
    /// [`SyncStatus::Stale`].
    pub fn fetch_move<R: Relay>(&mut self, relay: &mut R) -> Result<SyncStatus, GameError> {
        let reply = relay.exchange(&self.role.as_bit().to_string())?;
        let record: MoveRecord = reply.trim().parse()?;
        self.apply_remote(&record)
    }

    // --- Internals ---

    fn ensure_local_turn(&self) -> Result<(), GameError> {
        if self.ended {
            return Err(GameError::IllegalMove {
                message: "the game has ended".to_string(),
            });
        }
        if !self.is_local_turn() {
            return Err(GameError::IllegalMove {
                message: "not your turn; wait for the opponent's move".to_string(),
            });
        }
        Ok(())
    }

    /// Gate moves are rejected while any operand column is already full.
    fn ensure_columns_not_full(&self, operands: &[usize]) -> Result<(), GameError> {
        for &column in operands {
            if column < self.config.columns && self.board.is_full(column) {
                return Err(GameError::IllegalMove {
                    message: format!("column {} is full", column),
                });
            }
        }
        Ok(())
    }

    fn drop_coin(&mut self, column: usize, bit: u8) -> Result<(), GameError> {
        let claimant = if bit == 0 { Player::Zero } else { Player::One };
        self.board.place(column, claimant)?;
        Ok(())
    }

    fn detect_win(&mut self) {
        if let Some(winner) = self.board.winner() {
            self.winner = Some(winner);
            self.ended = true;
            info!(%winner, "game over");
        }
    }
}
