// src/simulation/results.rs
use std::fmt;

/// The outcome of one measurement action: the column the player asked for,
/// the bit it produced, and every column that collapsed alongside it because
/// it was entangled with the measured one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// The column the player measured.
    pub column: usize,
    /// The Born-sampled bit for that column.
    pub outcome: u8,
    /// Cascade-collapsed columns and their forced bits, ascending by column.
    pub cascades: Vec<(usize, u8)>,
}

impl Measurement {
    /// Every `(column, bit)` pair this action fixed, primary first.
    pub fn all_outcomes(&self) -> Vec<(usize, u8)> {
        let mut outcomes = vec![(self.column, self.outcome)];
        outcomes.extend(self.cascades.iter().copied());
        outcomes
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {} -> {}", self.column, self.outcome)?;
        for (column, bit) in &self.cascades {
            write!(f, ", column {} collapsed to {}", column, bit)?;
        }
        Ok(())
    }
}
