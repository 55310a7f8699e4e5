// src/simulation/engine.rs
use crate::core::state::AMPLITUDE_TOLERANCE;
use crate::core::{GameError, StateVector};
use crate::operations::Gate;
use crate::simulation::Measurement;
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;

/// Marginal probabilities this close to 0 or 1 count as a definite value
/// when deciding whether a qubit is effectively pure. Fixed contract, not a
/// tunable default.
pub(crate) const PURITY_TOLERANCE: f64 = 1e-3;

/// Evolves the joint state of the board's qubits: embeds each gate of the
/// fixed set into the full 2^N space and performs Born-rule measurement with
/// cascading collapse of entangled columns.
/// (Internal visibility)
#[derive(Debug, Clone)]
pub(crate) struct QuantumEngine {
    state: StateVector,
    num_qubits: usize,
}

impl QuantumEngine {
    /// Starts the engine in the ground state |0...0>.
    pub(crate) fn new(num_qubits: usize) -> Self {
        Self {
            state: StateVector::ground(num_qubits),
            num_qubits,
        }
    }

    /// Read-only view of the current state.
    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    /// Applies one gate. Operand range and distinctness are checked before
    /// the state is touched; a unitary needs no renormalization afterwards.
    pub(crate) fn apply_gate(&mut self, gate: &Gate) -> Result<(), GameError> {
        self.check_operands(gate)?;
        match *gate {
            Gate::Cx { control, target } => self.apply_controlled_flip(&[control], target),
            Gate::Ccx { control1, control2, target } => {
                self.apply_controlled_flip(&[control1, control2], target)
            }
            ref single => {
                let matrix = single_qubit_matrix(single);
                self.apply_single_qubit(single.operands()[0], &matrix);
            }
        }
        Ok(())
    }

    /// Measures `column` by the Born rule, then sweeps the remaining columns
    /// for entanglement casualties: any qubit whose marginal was mixed before
    /// the collapse but is definite after it gets collapsed too, at its now
    /// forced value, in ascending column order.
    pub(crate) fn measure_with_cascade<R: Rng>(
        &mut self,
        column: usize,
        rng: &mut R,
    ) -> Result<Measurement, GameError> {
        if column >= self.num_qubits {
            return Err(GameError::IllegalMove {
                message: format!("column {} out of bounds (0..{})", column, self.num_qubits),
            });
        }

        let pure_before: Vec<bool> = (0..self.num_qubits)
            .map(|q| self.state.effectively_pure(q, PURITY_TOLERANCE))
            .collect();

        let p0 = self.state.probability_zero(column);
        let outcome = if p0 < AMPLITUDE_TOLERANCE {
            1
        } else if p0 > 1.0 - AMPLITUDE_TOLERANCE {
            0
        } else if rng.random::<f64>() < p0 {
            0
        } else {
            1
        };
        self.collapse(column, outcome)?;

        let mut cascades = Vec::new();
        for q in 0..self.num_qubits {
            if q == column || pure_before[q] {
                continue;
            }
            if self.state.effectively_pure(q, PURITY_TOLERANCE) {
                let bit = if self.state.probability_zero(q) > 0.5 { 0 } else { 1 };
                self.collapse(q, bit)?;
                cascades.push((q, bit));
            }
        }

        Ok(Measurement { column, outcome, cascades })
    }

    /// Projects `qubit` onto `outcome` and renormalizes the survivors.
    /// Used directly when replaying an opponent's recorded measurement, where
    /// the outcome is trusted rather than re-sampled.
    pub(crate) fn collapse(&mut self, qubit: usize, outcome: u8) -> Result<(), GameError> {
        let p0 = self.state.probability_zero(qubit);
        let p = if outcome == 0 { p0 } else { 1.0 - p0 };
        if p <= AMPLITUDE_TOLERANCE {
            return Err(GameError::MalformedRecord {
                message: format!(
                    "recorded outcome {} for column {} has zero probability in the local state",
                    outcome, qubit
                ),
            });
        }

        let mask = 1usize << qubit;
        let keep_set = outcome == 1;
        let scale = 1.0 / p.sqrt();
        let new_vec: Vec<Complex<f64>> = self
            .state
            .vector()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if (i & mask != 0) == keep_set {
                    c.scale(scale)
                } else {
                    Complex::zero()
                }
            })
            .collect();
        self.state = StateVector::new(new_vec, self.num_qubits);
        Ok(())
    }

    /// Rejects gates whose operands fall outside the board or repeat.
    fn check_operands(&self, gate: &Gate) -> Result<(), GameError> {
        let operands = gate.operands();
        for &op in &operands {
            if op >= self.num_qubits {
                return Err(GameError::InvalidOperation {
                    message: format!(
                        "operand {} of gate '{}' out of range (0..{})",
                        op,
                        gate.name(),
                        self.num_qubits
                    ),
                });
            }
        }
        for (i, &a) in operands.iter().enumerate() {
            if operands[i + 1..].contains(&a) {
                return Err(GameError::InvalidOperation {
                    message: format!("gate '{}' names column {} twice", gate.name(), a),
                });
            }
        }
        Ok(())
    }

    /// Applies a 2x2 matrix to a single qubit within the global state.
    /// Iterates basis-index pairs differing only in the target bit, which is
    /// the tensor product of the matrix with identity on every other qubit.
    fn apply_single_qubit(&mut self, target: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let mask = 1usize << target;
        let dim = self.state.dim();
        let mut new_vec = vec![Complex::zero(); dim];

        for i0 in 0..dim {
            if i0 & mask != 0 {
                continue;
            }
            let i1 = i0 | mask;
            let psi_0 = self.state.vector()[i0];
            let psi_1 = self.state.vector()[i1];
            new_vec[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            new_vec[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }

        self.state = StateVector::new(new_vec, self.num_qubits);
    }

    /// Flips the target bit of every basis state whose control bits are all
    /// set: the cx/ccx unitary expressed as a basis permutation.
    fn apply_controlled_flip(&mut self, controls: &[usize], target: usize) {
        let t_mask = 1usize << target;
        let c_mask: usize = controls.iter().fold(0, |m, &c| m | (1usize << c));
        let dim = self.state.dim();
        let mut new_vec = vec![Complex::zero(); dim];

        for (i, &amp) in self.state.vector().iter().enumerate() {
            let j = if i & c_mask == c_mask { i ^ t_mask } else { i };
            new_vec[j] = amp;
        }

        self.state = StateVector::new(new_vec, self.num_qubits);
    }
}

/// The 2x2 matrix for a single-qubit gate.
fn single_qubit_matrix(gate: &Gate) -> [[Complex<f64>; 2]; 2] {
    use std::f64::consts::FRAC_1_SQRT_2;
    let one = Complex::new(1.0, 0.0);
    let i = Complex::i();
    // exp(i*PI/4) = (1+i)/sqrt(2)
    let exp_i_pi_4 = Complex::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);

    match gate {
        Gate::H { .. } => [
            [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(FRAC_1_SQRT_2, 0.0)],
            [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(-FRAC_1_SQRT_2, 0.0)],
        ],
        Gate::Z { .. } => [[one, Complex::zero()], [Complex::zero(), -one]],
        Gate::X { .. } => [[Complex::zero(), one], [one, Complex::zero()]],
        Gate::Y { .. } => [[Complex::zero(), -i], [i, Complex::zero()]],
        Gate::S { .. } => [[one, Complex::zero()], [Complex::zero(), i]],
        Gate::T { .. } => [[one, Complex::zero()], [Complex::zero(), exp_i_pi_4]],
        Gate::Cx { .. } | Gate::Ccx { .. } => {
            unreachable!("controlled gates are applied as basis permutations")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn assert_norm_preserved(engine: &QuantumEngine) {
        let norm_sq = engine.state().norm_sqr_sum();
        assert!(
            (norm_sq - 1.0).abs() < 1e-6,
            "norm drifted: sum(|c_i|^2) = {}",
            norm_sq
        );
    }

    #[test]
    fn ground_state_is_all_zeros() {
        let engine = QuantumEngine::new(3);
        assert_eq!(engine.state().dim(), 8);
        assert!((engine.state().vector()[0].re - 1.0).abs() < TEST_TOLERANCE);
        assert_norm_preserved(&engine);
    }

    #[test]
    fn x_flips_the_target_qubit() {
        let mut engine = QuantumEngine::new(2);
        engine.apply_gate(&Gate::X { target: 1 }).unwrap();
        // Qubit 1 set, qubit 0 clear: basis index 0b10.
        assert!((engine.state().vector()[2].re - 1.0).abs() < TEST_TOLERANCE);
        assert_norm_preserved(&engine);
    }

    #[test]
    fn h_splits_amplitude_evenly() {
        let mut engine = QuantumEngine::new(1);
        engine.apply_gate(&Gate::H { target: 0 }).unwrap();
        let p0 = engine.state().probability_zero(0);
        assert!((p0 - 0.5).abs() < TEST_TOLERANCE);
        assert_norm_preserved(&engine);
    }

    #[test]
    fn cx_flips_only_when_control_is_set() {
        let mut engine = QuantumEngine::new(2);
        engine.apply_gate(&Gate::Cx { control: 0, target: 1 }).unwrap();
        // Control clear: nothing happens.
        assert!((engine.state().vector()[0].re - 1.0).abs() < TEST_TOLERANCE);

        engine.apply_gate(&Gate::X { target: 0 }).unwrap();
        engine.apply_gate(&Gate::Cx { control: 0, target: 1 }).unwrap();
        // Control set: |01> became |11> (index 0b11).
        assert!((engine.state().vector()[3].re - 1.0).abs() < TEST_TOLERANCE);
        assert_norm_preserved(&engine);
    }

    #[test]
    fn ccx_needs_both_controls() {
        let mut engine = QuantumEngine::new(3);
        engine.apply_gate(&Gate::X { target: 0 }).unwrap();
        engine
            .apply_gate(&Gate::Ccx { control1: 0, control2: 1, target: 2 })
            .unwrap();
        // Only one control set: target untouched, still |001>.
        assert!((engine.state().vector()[1].re - 1.0).abs() < TEST_TOLERANCE);

        engine.apply_gate(&Gate::X { target: 1 }).unwrap();
        engine
            .apply_gate(&Gate::Ccx { control1: 0, control2: 1, target: 2 })
            .unwrap();
        // Both controls set: |011> became |111> (index 0b111).
        assert!((engine.state().vector()[7].re - 1.0).abs() < TEST_TOLERANCE);
        assert_norm_preserved(&engine);
    }

    #[test]
    fn norm_is_preserved_across_a_generated_circuit() {
        let gates = crate::circuits::generator::generate(42, 5, 3);
        let mut engine = QuantumEngine::new(5);
        for gate in &gates {
            engine.apply_gate(gate).unwrap();
            assert_norm_preserved(&engine);
        }
    }

    #[test]
    fn out_of_range_operand_is_rejected_without_mutation() {
        let mut engine = QuantumEngine::new(2);
        let before = engine.state().clone();
        let err = engine.apply_gate(&Gate::H { target: 2 }).unwrap_err();
        assert!(matches!(err, GameError::InvalidOperation { .. }));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn duplicate_operands_are_rejected() {
        let mut engine = QuantumEngine::new(3);
        let err = engine
            .apply_gate(&Gate::Cx { control: 1, target: 1 })
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidOperation { .. }));
    }

    #[test]
    fn measuring_a_definite_qubit_is_deterministic() {
        let mut engine = QuantumEngine::new(2);
        engine.apply_gate(&Gate::X { target: 0 }).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let measurement = engine.measure_with_cascade(0, &mut rng).unwrap();
        assert_eq!(measurement.outcome, 1);
        assert!(measurement.cascades.is_empty());
        assert_norm_preserved(&engine);
    }

    #[test]
    fn entangled_partner_cascades_with_the_forced_value() {
        // H then cx entangles qubits 0 and 1 into (|00> + |11>)/sqrt(2);
        // measuring qubit 0 must drag qubit 1 to the same bit.
        let mut engine = QuantumEngine::new(2);
        engine.apply_gate(&Gate::H { target: 0 }).unwrap();
        engine.apply_gate(&Gate::Cx { control: 0, target: 1 }).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let measurement = engine.measure_with_cascade(0, &mut rng).unwrap();

        assert_eq!(measurement.cascades, vec![(1, measurement.outcome)]);
        assert_norm_preserved(&engine);
        // The joint state is now the matching basis state.
        let index = (measurement.outcome as usize) | ((measurement.outcome as usize) << 1);
        assert!((engine.state().vector()[index].norm() - 1.0).abs() < TEST_TOLERANCE);
    }

    #[test]
    fn unentangled_superposition_does_not_cascade() {
        let mut engine = QuantumEngine::new(2);
        engine.apply_gate(&Gate::H { target: 0 }).unwrap();
        engine.apply_gate(&Gate::H { target: 1 }).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let measurement = engine.measure_with_cascade(0, &mut rng).unwrap();
        assert!(measurement.cascades.is_empty());
        // Qubit 1 keeps its even split.
        let p0 = engine.state().probability_zero(1);
        assert!((p0 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn forced_collapse_with_impossible_outcome_is_rejected() {
        let mut engine = QuantumEngine::new(1);
        // State is |0>; claiming it measured 1 cannot be replayed.
        let err = engine.collapse(0, 1).unwrap_err();
        assert!(matches!(err, GameError::MalformedRecord { .. }));
    }
}
