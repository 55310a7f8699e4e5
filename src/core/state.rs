// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

use super::error::GameError;

/// Tolerance under which a squared amplitude is treated as exactly zero.
pub(crate) const AMPLITUDE_TOLERANCE: f64 = 1e-12;

/// The joint quantum state of N qubits, one per board column, as a vector of
/// 2^N complex amplitudes.
///
/// Basis indexing is little-endian: qubit `i` occupies bit position `i` of
/// the basis index. The vector is kept normalized; unitaries preserve the
/// norm by construction and every collapse renormalizes the survivors.
///
/// The engine replaces the vector wholesale on every gate or measurement
/// rather than patching it in place.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl StateVector {
    /// Creates the all-zeros ground state |0...0> on `num_qubits` qubits.
    pub(crate) fn ground(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self { amplitudes, num_qubits }
    }

    /// Wraps a raw amplitude vector. The caller guarantees the length is
    /// 2^`num_qubits`.
    pub(crate) fn new(amplitudes: Vec<Complex<f64>>, num_qubits: usize) -> Self {
        debug_assert_eq!(amplitudes.len(), 1usize << num_qubits);
        Self { amplitudes, num_qubits }
    }

    /// Read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    /// Number of basis states (2^N).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Number of qubits N.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Sum of squared magnitudes. 1.0 for a healthy state.
    pub fn norm_sqr_sum(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Checks that the state is normalized within `tolerance`.
    pub fn check_normalization(&self, tolerance: f64) -> Result<(), GameError> {
        let norm_sq = self.norm_sqr_sum();
        if (norm_sq - 1.0).abs() > tolerance {
            Err(GameError::InvalidOperation {
                message: format!(
                    "state vector norm deviated from 1: sum(|c_i|^2) = {}",
                    norm_sq
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Marginal probability that `qubit` measures 0: the summed squared
    /// magnitude of every basis state whose `qubit` bit is clear.
    pub fn probability_zero(&self, qubit: usize) -> f64 {
        let mask = 1usize << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask == 0)
            .map(|(_, c)| c.norm_sqr())
            .sum()
    }

    /// Whether `qubit`'s marginal is within `tolerance` of a definite 0 or 1.
    pub fn effectively_pure(&self, qubit: usize, tolerance: f64) -> bool {
        let p0 = self.probability_zero(qubit);
        p0.abs() <= tolerance || (p0 - 1.0).abs() <= tolerance
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
