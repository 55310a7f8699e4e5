//! Error handling logic

use std::fmt;

/// One of the two players. The value doubles as the wire `player_id`, the
/// session role (`Zero` always moves first) and the colour a measured bit
/// paints on the board: a cell holds the observed bit, not the mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    /// Player 0, the first mover. Claims cells that measured 0.
    Zero,
    /// Player 1, the second mover. Claims cells that measured 1.
    One,
}

impl Player {
    /// The opposing player.
    pub fn other(self) -> Self {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
        }
    }

    /// The bit value this player claims.
    pub fn as_bit(self) -> u8 {
        match self {
            Player::Zero => 0,
            Player::One => 1,
        }
    }

    /// Maps a measured bit to the player claiming it.
    /// Returns `None` for anything other than 0 or 1.
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Player::Zero),
            1 => Some(Player::One),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.as_bit())
    }
}

/// Error types covering everything that can go wrong in a game session.
///
/// Nothing here is fatal to the process: every variant is reported before
/// state is mutated (or after it has been restored), so the session always
/// stays in its last valid, normalized state.
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum GameError {
    /// A gate or session was constructed with bad parameters: out-of-range
    /// or duplicate operands, unknown gate name, wrong operand count, or a
    /// board size outside the supported range. Detected before any state
    /// mutation.
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// A move that the rules forbid right now: acting out of turn, a full
    /// column, an out-of-bounds column, or a session that has already ended.
    IllegalMove {
        /// IllegalMove failure message
        message: String,
    },

    /// A wire payload that could not be decoded, or whose recorded outcomes
    /// are inconsistent with the local quantum state.
    MalformedRecord {
        /// MalformedRecord failure message
        message: String,
    },

    /// The relay could not be reached or replied with something unusable.
    /// Recoverable; the caller decides whether to retry.
    Transport {
        /// Transport failure message
        message: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidOperation { message } => write!(f, "Invalid Operation: {}", message),
            GameError::IllegalMove { message } => write!(f, "Illegal Move: {}", message),
            GameError::MalformedRecord { message } => write!(f, "Malformed Record: {}", message),
            GameError::Transport { message } => write!(f, "Transport Error: {}", message),
        }
    }
}

// Implement the standard Error trait to allow for easy integration with Rust error handling.
impl std::error::Error for GameError {}
