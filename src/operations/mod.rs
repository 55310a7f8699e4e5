// src/operations/mod.rs

//! The fixed gate set a move can apply to the shared state.
//!
//! A gate names its operand columns directly; arity is enforced by the
//! variant shape, so a `Gate` value is well-formed by construction. Operand
//! *range* depends on the board size and is checked when the gate is applied.

use crate::core::GameError;

/// A single move's unitary, over the fixed eight-gate vocabulary.
///
/// Operand order matters for the controlled variants: `Cx` flips `target`
/// when `control` is 1, `Ccx` flips `target` when both controls are 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Hadamard: rotates the column into an equal superposition.
    H {
        /// The column whose qubit is transformed.
        target: usize,
    },
    /// Phase flip.
    Z {
        /// The column whose qubit is transformed.
        target: usize,
    },
    /// Bit flip.
    X {
        /// The column whose qubit is transformed.
        target: usize,
    },
    /// Combined bit and phase flip.
    Y {
        /// The column whose qubit is transformed.
        target: usize,
    },
    /// Quarter-turn phase.
    S {
        /// The column whose qubit is transformed.
        target: usize,
    },
    /// Eighth-turn phase.
    T {
        /// The column whose qubit is transformed.
        target: usize,
    },
    /// Controlled bit flip.
    Cx {
        /// The column whose value conditions the flip.
        control: usize,
        /// The column that is flipped.
        target: usize,
    },
    /// Doubly-controlled bit flip.
    Ccx {
        /// First conditioning column.
        control1: usize,
        /// Second conditioning column.
        control2: usize,
        /// The column that is flipped.
        target: usize,
    },
}

impl Gate {
    /// Builds a single-qubit gate from its generator symbol (0..=5).
    pub(crate) fn single_from_symbol(symbol: u8, target: usize) -> Self {
        match symbol {
            0 => Gate::H { target },
            1 => Gate::Z { target },
            2 => Gate::X { target },
            3 => Gate::Y { target },
            4 => Gate::S { target },
            5 => Gate::T { target },
            _ => unreachable!("single-qubit symbols are 0..=5"),
        }
    }

    /// The gate's lowercase wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H { .. } => "h",
            Gate::Z { .. } => "z",
            Gate::X { .. } => "x",
            Gate::Y { .. } => "y",
            Gate::S { .. } => "s",
            Gate::T { .. } => "t",
            Gate::Cx { .. } => "cx",
            Gate::Ccx { .. } => "ccx",
        }
    }

    /// Operand columns in gate-defined order (controls before target).
    pub fn operands(&self) -> Vec<usize> {
        match *self {
            Gate::H { target }
            | Gate::Z { target }
            | Gate::X { target }
            | Gate::Y { target }
            | Gate::S { target }
            | Gate::T { target } => vec![target],
            Gate::Cx { control, target } => vec![control, target],
            Gate::Ccx { control1, control2, target } => vec![control1, control2, target],
        }
    }

    /// Reassembles a gate from its wire name and operand list, rejecting
    /// unknown names and arity mismatches before anything is applied.
    pub fn from_parts(name: &str, operands: &[usize]) -> Result<Self, GameError> {
        let arity_error = || GameError::InvalidOperation {
            message: format!(
                "gate '{}' does not take {} operand(s)",
                name,
                operands.len()
            ),
        };
        match name {
            "h" | "z" | "x" | "y" | "s" | "t" => {
                let &[target] = operands else {
                    return Err(arity_error());
                };
                Ok(match name {
                    "h" => Gate::H { target },
                    "z" => Gate::Z { target },
                    "x" => Gate::X { target },
                    "y" => Gate::Y { target },
                    "s" => Gate::S { target },
                    _ => Gate::T { target },
                })
            }
            "cx" => {
                let &[control, target] = operands else {
                    return Err(arity_error());
                };
                Ok(Gate::Cx { control, target })
            }
            "ccx" => {
                let &[control1, control2, target] = operands else {
                    return Err(arity_error());
                };
                Ok(Gate::Ccx { control1, control2, target })
            }
            other => Err(GameError::InvalidOperation {
                message: format!("unknown gate '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_operands_round_trip() {
        let gates = [
            Gate::H { target: 0 },
            Gate::T { target: 3 },
            Gate::Cx { control: 1, target: 2 },
            Gate::Ccx { control1: 0, control2: 2, target: 3 },
        ];
        for gate in gates {
            let rebuilt = Gate::from_parts(gate.name(), &gate.operands()).unwrap();
            assert_eq!(rebuilt, gate);
        }
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        assert!(Gate::from_parts("h", &[0, 1]).is_err());
        assert!(Gate::from_parts("cx", &[0]).is_err());
        assert!(Gate::from_parts("ccx", &[0, 1]).is_err());
    }

    #[test]
    fn unknown_gate_is_rejected() {
        let err = Gate::from_parts("swap", &[0, 1]).unwrap_err();
        assert!(matches!(err, GameError::InvalidOperation { .. }));
    }
}
