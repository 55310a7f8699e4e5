// src/session/record.rs

//! Wire encoding of completed actions and of the session-setup handshake.
//!
//! Everything on the wire is a colon-delimited ASCII string, small enough to
//! travel as a single datagram through the relay. A move record is
//! `"<player_id>:<seq>:<op>:<operand>[:<operand>...]"`; for a measurement
//! the operands are the primary column followed by one observed bit per
//! column, `-1` marking columns this action did not touch, so a primary
//! measurement and its cascade travel atomically.

use std::fmt;
use std::str::FromStr;

use crate::core::{GameError, Player};
use crate::operations::Gate;

/// Sentinel in a measurement's per-column outcome array for "not measured in
/// this action".
pub const NOT_MEASURED: i8 = -1;

/// What a move did: applied a gate, or measured a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveAction {
    /// A gate move; operands travel in gate-defined order.
    Gate(Gate),
    /// A measurement move with its full per-column outcome array.
    Measure {
        /// The column the mover chose to measure.
        column: usize,
        /// Observed bit per column, [`NOT_MEASURED`] where none was fixed.
        outcomes: Vec<i8>,
    },
}

/// One completed player action, produced exactly once and immutable after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Who moved.
    pub player: Player,
    /// The mover's move counter after this action. 0 is the relay's
    /// "no move yet" placeholder and never a real move.
    pub sequence: u32,
    /// What the move did.
    pub action: MoveAction,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.player.as_bit(), self.sequence)?;
        match &self.action {
            MoveAction::Gate(gate) => {
                write!(f, ":{}", gate.name())?;
                for operand in gate.operands() {
                    write!(f, ":{}", operand)?;
                }
            }
            MoveAction::Measure { column, outcomes } => {
                write!(f, ":measure:{}", column)?;
                for bit in outcomes {
                    write!(f, ":{}", bit)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for MoveRecord {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |message: String| GameError::MalformedRecord { message };
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() < 4 {
            return Err(malformed(format!("move record '{}' has too few fields", s)));
        }

        let player_bit: u8 = fields[0]
            .parse()
            .map_err(|_| malformed(format!("bad player id '{}'", fields[0])))?;
        let player = Player::from_bit(player_bit)
            .ok_or_else(|| malformed(format!("bad player id '{}'", fields[0])))?;
        let sequence: u32 = fields[1]
            .parse()
            .map_err(|_| malformed(format!("bad move number '{}'", fields[1])))?;
        let operation = fields[2];

        let action = if operation == "measure" {
            let column: usize = fields[3]
                .parse()
                .map_err(|_| malformed(format!("bad measured column '{}'", fields[3])))?;
            let outcomes = fields[4..]
                .iter()
                .map(|field| match field.parse::<i8>() {
                    Ok(bit @ (NOT_MEASURED | 0 | 1)) => Ok(bit),
                    _ => Err(malformed(format!("bad outcome '{}'", field))),
                })
                .collect::<Result<Vec<i8>, GameError>>()?;
            MoveAction::Measure { column, outcomes }
        } else {
            let operands = fields[3..]
                .iter()
                .map(|field| {
                    field
                        .parse::<usize>()
                        .map_err(|_| malformed(format!("bad operand '{}'", field)))
                })
                .collect::<Result<Vec<usize>, GameError>>()?;
            MoveAction::Gate(Gate::from_parts(operation, &operands)?)
        };

        Ok(MoveRecord { player, sequence, action })
    }
}

/// The tuple a host publishes so the joining player can reconstruct the same
/// opening circuit: `"<seed>:<depth>:<columns>:<start_player>"`, where
/// `start_player` is the role the host took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSetup {
    /// Shared circuit seed.
    pub seed: u32,
    /// Rounds of the generator.
    pub depth: usize,
    /// Board side length.
    pub columns: usize,
    /// The host's role; the joiner takes the other one.
    pub start_player: Player,
}

impl fmt::Display for SessionSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.seed,
            self.depth,
            self.columns,
            self.start_player.as_bit()
        )
    }
}

impl FromStr for SessionSetup {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |message: String| GameError::MalformedRecord { message };
        let fields: Vec<&str> = s.split(':').collect();
        let &[seed, depth, columns, start] = &fields[..] else {
            return Err(malformed(format!("session setup '{}' must have 4 fields", s)));
        };
        Ok(SessionSetup {
            seed: seed
                .parse()
                .map_err(|_| malformed(format!("bad seed '{}'", seed)))?,
            depth: depth
                .parse()
                .map_err(|_| malformed(format!("bad depth '{}'", depth)))?,
            columns: columns
                .parse()
                .map_err(|_| malformed(format!("bad column count '{}'", columns)))?,
            start_player: start
                .parse::<u8>()
                .ok()
                .and_then(Player::from_bit)
                .ok_or_else(|| malformed(format!("bad start player '{}'", start)))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_record_round_trips() {
        let record = MoveRecord {
            player: Player::Zero,
            sequence: 3,
            action: MoveAction::Gate(Gate::Cx { control: 1, target: 4 }),
        };
        let wire = record.to_string();
        assert_eq!(wire, "0:3:cx:1:4");
        assert_eq!(wire.parse::<MoveRecord>().unwrap(), record);
    }

    #[test]
    fn measurement_record_with_cascades_round_trips() {
        // Primary on column 2, cascades on columns 0 and 3.
        let record = MoveRecord {
            player: Player::One,
            sequence: 7,
            action: MoveAction::Measure {
                column: 2,
                outcomes: vec![1, -1, 0, 1, -1],
            },
        };
        let wire = record.to_string();
        assert_eq!(wire, "1:7:measure:2:1:-1:0:1:-1");
        assert_eq!(wire.parse::<MoveRecord>().unwrap(), record);
    }

    #[test]
    fn relay_placeholder_decodes() {
        let record: MoveRecord = "0:0:h:0".parse().unwrap();
        assert_eq!(record.sequence, 0);
        assert_eq!(record.action, MoveAction::Gate(Gate::H { target: 0 }));
    }

    #[test]
    fn junk_is_rejected() {
        assert!("".parse::<MoveRecord>().is_err());
        assert!("0:1".parse::<MoveRecord>().is_err());
        assert!("9:1:h:0".parse::<MoveRecord>().is_err());
        assert!("0:x:h:0".parse::<MoveRecord>().is_err());
        assert!("0:1:warp:0".parse::<MoveRecord>().is_err());
        assert!("0:1:measure:0:5".parse::<MoveRecord>().is_err());
    }

    #[test]
    fn session_setup_round_trips() {
        let setup = SessionSetup {
            seed: 42,
            depth: 2,
            columns: 7,
            start_player: Player::Zero,
        };
        assert_eq!(setup.to_string(), "42:2:7:0");
        assert_eq!("42:2:7:0".parse::<SessionSetup>().unwrap(), setup);
        assert!("42:2:7".parse::<SessionSetup>().is_err());
        assert!("42:2:7:5".parse::<SessionSetup>().is_err());
    }
}
