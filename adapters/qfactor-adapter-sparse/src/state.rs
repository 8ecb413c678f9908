//! Sparse amplitude-map state.
//!
//! Only basis states with non-negligible amplitude are stored. Phase
//! estimation on the modulus-15 work register touches at most
//! `2^n_count * 4` basis states, far below the `2^(n_count+4)` of a dense
//! vector.

use num_complex::Complex64;
use rand::Rng;
use rustc_hash::FxHashMap;

use qfactor_ir::{ControlledOp, PrimitiveOp, Unitary2x2};

/// Squared magnitude below which an amplitude is dropped.
const PRUNE_EPS: f64 = 1e-24;

/// A quantum state as a map from basis index to amplitude.
///
/// Basis index bit `q` holds the value of qubit `q`.
#[derive(Debug, Clone)]
pub struct SparseState {
    amplitudes: FxHashMap<usize, Complex64>,
    num_qubits: usize,
}

impl SparseState {
    /// The state |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = FxHashMap::default();
        amplitudes.insert(0, Complex64::new(1.0, 0.0));
        Self {
            amplitudes,
            num_qubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of stored basis states.
    pub fn support(&self) -> usize {
        self.amplitudes.len()
    }

    /// Amplitude of basis state `index` (zero if not stored).
    #[cfg(test)]
    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.amplitudes
            .get(&index)
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Apply one lowered operation. Measurements are deferred to sampling.
    pub fn apply<R: Rng + ?Sized>(&mut self, op: &ControlledOp, rng: &mut R) {
        let ctrl = op.controls;
        match &op.op {
            PrimitiveOp::Single { target, matrix } if matrix.is_diagonal() => {
                self.apply_diagonal(*target, matrix, ctrl);
            }
            PrimitiveOp::Single { target, matrix } => self.apply_single(*target, matrix, ctrl),
            PrimitiveOp::Swap { a, b } => self.apply_swap(*a, *b, ctrl),
            PrimitiveOp::Dense { targets, matrix } => self.apply_dense(targets, matrix, ctrl),
            PrimitiveOp::Reset { qubit } => self.reset(*qubit, rng),
            PrimitiveOp::Measure { .. } => {}
        }
    }

    fn apply_diagonal(&mut self, target: usize, m: &Unitary2x2, ctrl: usize) {
        let mask = 1 << target;
        for (&i, amp) in &mut self.amplitudes {
            if i & ctrl == ctrl {
                *amp *= if i & mask != 0 { m.data[3] } else { m.data[0] };
            }
        }
        self.prune();
    }

    fn apply_single(&mut self, target: usize, m: &Unitary2x2, ctrl: usize) {
        let mask = 1 << target;
        let [m00, m01, m10, m11] = m.data;
        let mut next = FxHashMap::with_capacity_and_hasher(self.amplitudes.len() * 2, Default::default());

        for (&i, &amp) in &self.amplitudes {
            if i & ctrl != ctrl {
                *next.entry(i).or_default() += amp;
                continue;
            }
            let zero = i & !mask;
            let one = i | mask;
            let (to_zero, to_one) = if i & mask == 0 { (m00, m10) } else { (m01, m11) };
            *next.entry(zero).or_default() += to_zero * amp;
            *next.entry(one).or_default() += to_one * amp;
        }

        self.amplitudes = next;
        self.prune();
    }

    fn apply_swap(&mut self, a: usize, b: usize, ctrl: usize) {
        let ma = 1 << a;
        let mb = 1 << b;
        self.amplitudes = self
            .amplitudes
            .drain()
            .map(|(i, amp)| {
                let differ = (i & ma != 0) != (i & mb != 0);
                if differ && i & ctrl == ctrl {
                    (i ^ ma ^ mb, amp)
                } else {
                    (i, amp)
                }
            })
            .collect();
    }

    fn apply_dense(&mut self, targets: &[usize], matrix: &[Complex64], ctrl: usize) {
        let local_dim = 1usize << targets.len();
        let target_mask = targets.iter().fold(0usize, |acc, &t| acc | (1 << t));
        let offset = |local: usize| {
            targets
                .iter()
                .enumerate()
                .filter(|(bit, _)| local >> bit & 1 == 1)
                .fold(0usize, |acc, (_, &t)| acc | (1 << t))
        };

        let mut next = FxHashMap::with_capacity_and_hasher(self.amplitudes.len(), Default::default());
        for (&i, &amp) in &self.amplitudes {
            if i & ctrl != ctrl {
                *next.entry(i).or_default() += amp;
                continue;
            }
            let col = targets
                .iter()
                .enumerate()
                .filter(|&(_, &t)| i & (1 << t) != 0)
                .fold(0usize, |acc, (bit, _)| acc | (1 << bit));
            let base = i & !target_mask;
            for row in 0..local_dim {
                let m = matrix[row * local_dim + col];
                if m.norm_sqr() > 0.0 {
                    *next.entry(base | offset(row)).or_default() += m * amp;
                }
            }
        }

        self.amplitudes = next;
        self.prune();
    }

    /// Projective reset: sample the qubit, keep the matching branch and move
    /// it to |0⟩.
    fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) {
        let mask = 1 << qubit;
        let p1: f64 = self
            .amplitudes
            .iter()
            .filter(|(i, _)| *i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();

        let outcome_one = rng.r#gen::<f64>() < p1;
        let norm = (if outcome_one { p1 } else { 1.0 - p1 }).sqrt();

        self.amplitudes = self
            .amplitudes
            .drain()
            .filter(|(i, _)| (i & mask != 0) == outcome_one)
            .map(|(i, a)| (i & !mask, if norm > 0.0 { a / norm } else { a }))
            .collect();
    }

    fn prune(&mut self) {
        self.amplitudes.retain(|_, a| a.norm_sqr() > PRUNE_EPS);
    }

    /// `(basis index, probability)` for every stored state, sorted by index.
    pub fn probabilities(&self) -> Vec<(usize, f64)> {
        let mut probs: Vec<_> = self
            .amplitudes
            .iter()
            .map(|(&i, a)| (i, a.norm_sqr()))
            .collect();
        probs.sort_unstable_by_key(|&(i, _)| i);
        probs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfactor_ir::{Circuit, QubitId, flatten};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(circuit: &Circuit) -> SparseState {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = SparseState::new(circuit.num_qubits());
        for op in flatten(circuit).unwrap() {
            state.apply(&op, &mut rng);
        }
        state
    }

    #[test]
    fn test_interference_prunes_cancelled_states() {
        let mut circuit = Circuit::with_size("hh", 1, 0);
        circuit.h(QubitId(0)).unwrap().h(QubitId(0)).unwrap();
        let state = run(&circuit);
        assert_eq!(state.support(), 1);
        assert!((state.amplitude(0).re - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_ghz_support() {
        let mut circuit = Circuit::with_size("ghz", 3, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .cx(QubitId(1), QubitId(2))
            .unwrap();
        let state = run(&circuit);
        let probs = state.probabilities();
        assert_eq!(probs.len(), 2);
        assert_eq!(probs[0].0, 0b000);
        assert_eq!(probs[1].0, 0b111);
        assert!((probs[0].1 - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_controlled_swap() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit
            .x(QubitId(0))
            .unwrap()
            .x(QubitId(1))
            .unwrap()
            .cswap(QubitId(0), QubitId(1), QubitId(2))
            .unwrap();
        assert!((run(&circuit).amplitude(0b101).re - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_dense_matrix_flip() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let flip = qfactor_ir::CustomGate::new("flip", 1)
            .with_matrix(vec![zero, one, one, zero])
            .unwrap()
            .control(1);

        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .x(QubitId(1))
            .unwrap()
            .gate(flip, [QubitId(1), QubitId(0)])
            .unwrap();
        assert!((run(&circuit).amplitude(0b11).re - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_reset_collapses_to_zero() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .x(QubitId(1))
            .unwrap()
            .reset(QubitId(0))
            .unwrap();
        let state = run(&circuit);
        assert_eq!(state.support(), 1);
        assert!((state.amplitude(0b10).norm_sqr() - 1.0).abs() < 1e-10);
    }
}
