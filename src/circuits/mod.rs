// src/circuits/mod.rs

//! The ordered gate log of a session.
//!
//! Every gate applied to the shared state, whether from the seeded opening
//! sequence or from a player's move, is appended here so the whole game can
//! be audited or replayed. The `Display` impl draws the log as an ASCII
//! circuit diagram, one wire per column.

use std::fmt;

use crate::operations::Gate;

pub mod generator;

/// Ordered sequence of gates applied to an N-column board.
#[derive(Clone, PartialEq, Eq)]
pub struct Circuit {
    columns: usize,
    gates: Vec<Gate>,
}

impl Circuit {
    /// Creates an empty log for a board with `columns` columns.
    pub(crate) fn new(columns: usize) -> Self {
        Self { columns, gates: Vec::new() }
    }

    /// Appends a gate to the log.
    pub(crate) fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    /// The gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Total number of logged gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns `true` if no gate has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const GATE_WIDTH: usize = 5;
        const WIRE: &str = "─────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        writeln!(f, "Circuit[{} gates on {} columns]", self.gates.len(), self.columns)?;
        if self.gates.is_empty() {
            return Ok(());
        }

        let num_ops = self.gates.len();
        // op_grid[row][time] is the gate/wire segment, v_connect[row][time]
        // the vertical connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; self.columns];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; self.columns];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total = GATE_WIDTH - slen;
                let pre = total / 2;
                let post = total - pre;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre),
                    symbol,
                    H_WIRE.to_string().repeat(post)
                )
            }
        }

        for (t, gate) in self.gates.iter().enumerate() {
            let operands = gate.operands();
            match gate {
                Gate::Cx { control, target } => {
                    op_grid[*control][t] = format_gate("@");
                    op_grid[*target][t] = format_gate("X");
                }
                Gate::Ccx { control1, control2, target } => {
                    op_grid[*control1][t] = format_gate("@");
                    op_grid[*control2][t] = format_gate("@");
                    op_grid[*target][t] = format_gate("X");
                }
                single => {
                    let symbol = single.name().to_uppercase();
                    op_grid[single.operands()[0]][t] = format_gate(&symbol);
                }
            }
            // Vertical connection lines between the outermost operands.
            if let (Some(&r_min), Some(&r_max)) = (operands.iter().min(), operands.iter().max()) {
                for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                    row_vec[t] = V_WIRE;
                }
            }
        }

        let max_label_width = format!("q{}", self.columns - 1).len();
        for r in 0..self.columns {
            let label = format!("q{}: ", r);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < self.columns - 1 {
                write!(f, "{}", " ".repeat(max_label_width + 2))?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding = GATE_WIDTH.saturating_sub(1);
                    let pre = padding / 2;
                    let post = padding - pre;
                    write!(f, "{}{}{}", " ".repeat(pre), connector, " ".repeat(post))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_gates_and_connectors() {
        let mut circuit = Circuit::new(3);
        circuit.push(Gate::H { target: 0 });
        circuit.push(Gate::Cx { control: 0, target: 2 });
        let drawn = format!("{}", circuit);
        assert!(drawn.contains("Circuit[2 gates on 3 columns]"));
        assert!(drawn.contains("H"));
        assert!(drawn.contains("@"));
        assert!(drawn.contains("X"));
        assert!(drawn.contains('│'));
    }
}
