//! 2x2 unitary matrices for the single-qubit gates.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::gate::StandardGate;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub const fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// A diagonal matrix `diag(d0, d1)`.
    pub const fn diagonal(d0: Complex64, d1: Complex64) -> Self {
        Self::new(d0, ZERO, ZERO, d1)
    }

    /// Create the identity matrix.
    pub const fn identity() -> Self {
        Self::diagonal(ONE, ONE)
    }

    /// Create a Pauli-X matrix.
    pub const fn x() -> Self {
        Self::new(ZERO, ONE, ONE, ZERO)
    }

    /// Create a Pauli-Y matrix.
    pub const fn y() -> Self {
        Self::new(ZERO, Complex64::new(0.0, -1.0), Complex64::new(0.0, 1.0), ZERO)
    }

    /// Create a Pauli-Z matrix.
    pub const fn z() -> Self {
        Self::diagonal(ONE, Complex64::new(-1.0, 0.0))
    }

    /// Create a Hadamard matrix.
    pub fn h() -> Self {
        let s = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        Self::new(s, s, s, -s)
    }

    /// Phase gate `diag(1, e^{iθ})`.
    pub fn phase(theta: f64) -> Self {
        Self::diagonal(ONE, Complex64::from_polar(1.0, theta))
    }

    /// Rotation about X.
    pub fn rx(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(theta / 2.0).sin());
        Self::new(c, s, s, c)
    }

    /// Rotation about Y.
    pub fn ry(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        Self::new(c, -s, s, c)
    }

    /// Rotation about Z.
    pub fn rz(theta: f64) -> Self {
        Self::diagonal(
            Complex64::from_polar(1.0, -theta / 2.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// The matrix of a single-qubit standard gate, `None` for wider gates.
    pub fn from_gate(gate: &StandardGate) -> Option<Self> {
        Some(match *gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::x(),
            StandardGate::Y => Self::y(),
            StandardGate::Z => Self::z(),
            StandardGate::H => Self::h(),
            StandardGate::S => Self::phase(PI / 2.0),
            StandardGate::Sdg => Self::phase(-PI / 2.0),
            StandardGate::T => Self::phase(PI / 4.0),
            StandardGate::Tdg => Self::phase(-PI / 4.0),
            StandardGate::Rx(t) => Self::rx(t),
            StandardGate::Ry(t) => Self::ry(t),
            StandardGate::Rz(t) => Self::rz(t),
            StandardGate::P(t) => Self::phase(t),
            _ => return None,
        })
    }

    /// Check whether both off-diagonal entries are exactly zero.
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        self.data[1] == ZERO && self.data[2] == ZERO
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Unitary2x2) -> Unitary2x2 {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }
}
