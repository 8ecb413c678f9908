//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use qfactor_ir::{ControlledOp, PrimitiveOp, Unitary2x2};

/// A statevector representing a quantum state.
///
/// Basis index bit `q` holds the value of qubit `q`.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    #[inline]
    fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Apply one lowered operation.
    ///
    /// Measurements leave the state untouched; sampling happens afterwards.
    pub fn apply<R: Rng + ?Sized>(&mut self, op: &ControlledOp, rng: &mut R) {
        let ctrl = op.controls;
        match &op.op {
            PrimitiveOp::Single { target, matrix } => {
                if matrix.is_diagonal() {
                    self.apply_diagonal(*target, matrix, ctrl);
                } else {
                    self.apply_single(*target, matrix, ctrl);
                }
            }
            PrimitiveOp::Swap { a, b } => self.apply_swap(*a, *b, ctrl),
            PrimitiveOp::Dense { targets, matrix } => self.apply_dense(targets, matrix, ctrl),
            PrimitiveOp::Reset { qubit } => self.reset(*qubit, rng),
            PrimitiveOp::Measure { .. } => {}
        }
    }

    // =========================================================================
    // Kernels
    // =========================================================================

    fn apply_single(&mut self, target: usize, m: &Unitary2x2, ctrl: usize) {
        let mask = 1 << target;
        let [m00, m01, m10, m11] = m.data;
        for i in 0..self.dim() {
            if i & mask == 0 && i & ctrl == ctrl {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m00 * a + m01 * b;
                self.amplitudes[j] = m10 * a + m11 * b;
            }
        }
    }

    fn apply_diagonal(&mut self, target: usize, m: &Unitary2x2, ctrl: usize) {
        let mask = 1 << target;
        let d0 = m.data[0];
        let d1 = m.data[3];
        let touch_zero = d0 != Complex64::new(1.0, 0.0);
        for i in 0..self.dim() {
            if i & ctrl != ctrl {
                continue;
            }
            if i & mask != 0 {
                self.amplitudes[i] *= d1;
            } else if touch_zero {
                self.amplitudes[i] *= d0;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize, ctrl: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.dim() {
            if i & mask1 != 0 && i & mask2 == 0 && i & ctrl == ctrl {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_dense(&mut self, targets: &[usize], matrix: &[Complex64], ctrl: usize) {
        let k = targets.len();
        let local_dim = 1usize << k;
        let target_mask = targets.iter().fold(0usize, |acc, &t| acc | (1 << t));

        // Global offset of each local basis state.
        let offsets: Vec<usize> = (0..local_dim)
            .map(|local| {
                targets
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| local >> bit & 1 == 1)
                    .fold(0usize, |acc, (_, &t)| acc | (1 << t))
            })
            .collect();

        let mut scratch = vec![Complex64::new(0.0, 0.0); local_dim];
        for base in 0..self.dim() {
            if base & target_mask != 0 || base & ctrl != ctrl {
                continue;
            }
            for (slot, &offset) in scratch.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, &offset) in offsets.iter().enumerate() {
                let row_data = &matrix[row * local_dim..(row + 1) * local_dim];
                self.amplitudes[base | offset] = row_data
                    .iter()
                    .zip(&scratch)
                    .map(|(m, v)| m * v)
                    .sum();
            }
        }
    }

    /// Projective reset: sample the qubit, collapse, and flip it back to |0⟩.
    fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) {
        let mask = 1 << qubit;
        let p1: f64 = self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();

        let outcome_one = rng.r#gen::<f64>() < p1;
        let norm = (if outcome_one { p1 } else { 1.0 - p1 }).sqrt();

        for i in 0..self.dim() {
            if i & mask != 0 {
                continue;
            }
            let j = i | mask;
            let kept = if outcome_one {
                self.amplitudes[j]
            } else {
                self.amplitudes[i]
            };
            self.amplitudes[i] = if norm > 0.0 { kept / norm } else { kept };
            self.amplitudes[j] = Complex64::new(0.0, 0.0);
        }
    }

    /// Outcome probabilities for every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }
}
