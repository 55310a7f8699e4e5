// src/circuits/generator.rs

//! Deterministic expansion of an integer seed into the opening gate
//! sequence.
//!
//! Both players run this with the seed exchanged at session setup; it must be
//! reproducible down to the last gate, since the full sequence is never
//! transmitted. The recipe: cube `(seed + 500)`, read the cube's binary
//! digits as a stream of base-8 symbols, stretch the stream if it is too
//! short, then spend `depth` rounds walking the columns and turning symbols
//! into gates.

use crate::operations::Gate;

/// Expands `seed` into the opening sequence for a `columns`-wide board.
///
/// Emits exactly `depth * columns` gates. Symbols 0..=5 pick a single-qubit
/// gate for the current column; symbol 6 spends a second symbol to pick a cx
/// partner; symbol 7 spends two more to pick ccx partners. Partner columns
/// are decremented modulo `columns` until distinct from the operands chosen
/// before them.
pub fn generate(seed: u32, columns: usize, depth: usize) -> Vec<Gate> {
    let mut symbols = symbol_stream(seed);

    // Worst case consumption is three symbols per column visit.
    let needed = 3 * depth * columns;
    if symbols.len() < needed {
        let original = symbols.clone();
        for rep in 0..(needed / original.len()) {
            symbols.extend(
                original
                    .iter()
                    .map(|&d| ((d as u64 + seed as u64 * rep as u64) % 8) as u8),
            );
        }
    }

    let mut gates = Vec::with_capacity(depth * columns);
    let mut cursor = 0;
    for _ in 0..depth {
        for column in 0..columns {
            match symbols[cursor] {
                symbol @ 0..=5 => {
                    gates.push(Gate::single_from_symbol(symbol, column));
                    cursor += 1;
                }
                6 => {
                    let partner = distinct_column(symbols[cursor + 1], columns, &[column]);
                    gates.push(Gate::Cx { control: column, target: partner });
                    cursor += 2;
                }
                7 => {
                    let second = distinct_column(symbols[cursor + 1], columns, &[column]);
                    let third = distinct_column(symbols[cursor + 2], columns, &[column, second]);
                    gates.push(Gate::Ccx {
                        control1: column,
                        control2: second,
                        target: third,
                    });
                    cursor += 3;
                }
                _ => unreachable!("symbols are 3-bit"),
            }
        }
    }
    gates
}

/// The seed's base-8 symbol stream: binary digits of `(seed + 500)^3`, most
/// significant first, truncated to a multiple of three and grouped in threes.
fn symbol_stream(seed: u32) -> Vec<u8> {
    let base = seed as u128 + 500;
    let cube = base * base * base;
    let bit_len = (128 - cube.leading_zeros()) as usize;

    let bits: Vec<u8> = (0..bit_len)
        .rev()
        .map(|i| ((cube >> i) & 1) as u8)
        .collect();
    let usable = bit_len - bit_len % 3;

    bits[..usable]
        .chunks(3)
        .map(|group| 4 * group[0] + 2 * group[1] + group[2])
        .collect()
}

/// Reduces a raw symbol to a column index distinct from everything in
/// `taken`, stepping downwards modulo `columns` on collision.
fn distinct_column(symbol: u8, columns: usize, taken: &[usize]) -> usize {
    let mut candidate = symbol as usize % columns;
    while taken.contains(&candidate) {
        candidate = if candidate == 0 { columns - 1 } else { candidate - 1 };
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_arguments_reproduce_the_sequence() {
        let first = generate(42, 7, 2);
        let second = generate(42, 7, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(generate(42, 7, 2), generate(43, 7, 2));
    }

    #[test]
    fn emits_one_gate_per_column_visit() {
        for seed in [0, 1, 42, 999, 123_456] {
            for columns in 4..=8 {
                for depth in 1..=3 {
                    let gates = generate(seed, columns, depth);
                    assert_eq!(
                        gates.len(),
                        depth * columns,
                        "seed {} columns {} depth {}",
                        seed,
                        columns,
                        depth
                    );
                }
            }
        }
    }

    #[test]
    fn operands_are_in_range_and_distinct() {
        for seed in [3, 42, 2_000_000_000] {
            for gate in generate(seed, 5, 3) {
                let operands = gate.operands();
                for &op in &operands {
                    assert!(op < 5, "operand {} out of range for {:?}", op, gate);
                }
                for (i, &a) in operands.iter().enumerate() {
                    for &b in &operands[i + 1..] {
                        assert_ne!(a, b, "duplicate operand in {:?}", gate);
                    }
                }
            }
        }
    }

    #[test]
    fn symbol_stream_matches_hand_expansion() {
        // (0 + 500)^3 = 125_000_000 = 0b111011100110101100101000000, 27
        // bits, so no truncation: 111 011 100 110 101 100 101 000 000.
        assert_eq!(symbol_stream(0), vec![7, 3, 4, 6, 5, 4, 5, 0, 0]);
    }

    #[test]
    fn collision_stepping_wraps_downwards() {
        assert_eq!(distinct_column(2, 4, &[2]), 1);
        assert_eq!(distinct_column(0, 4, &[0]), 3);
        assert_eq!(distinct_column(2, 4, &[2, 1]), 0);
    }
}
