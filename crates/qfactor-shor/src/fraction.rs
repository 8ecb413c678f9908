//! Best rational approximation by continued fractions.
//!
//! A phase reading is a dyadic rational `k / 2^n`, so it is recovered
//! exactly from its `f64` value and all arithmetic below is on integers.

use crate::arith::gcd;

/// Bits of precision kept when converting a phase to a fraction.
const PHASE_BITS: u32 = 52;

/// A non-negative fraction in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    /// Numerator.
    pub numer: u64,
    /// Denominator, never zero.
    pub denom: u64,
}

impl Ratio {
    /// `numer / denom` reduced to lowest terms. `denom` must be non-zero.
    pub fn new(numer: u64, denom: u64) -> Self {
        let g = gcd(numer, denom).max(1);
        Self {
            numer: numer / g,
            denom: denom / g,
        }
    }

    /// Exact fraction for a phase in `[0, 1)`, rounded to 2^-52.
    ///
    /// Values outside the range are clamped.
    pub fn from_phase(phase: f64) -> Self {
        let scale = 1u64 << PHASE_BITS;
        let clamped = if phase.is_finite() { phase.clamp(0.0, 1.0) } else { 0.0 };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let numer = (clamped * scale as f64).round() as u64;
        Self::new(numer, scale)
    }

    /// The closest fraction with denominator at most `max_denom`.
    ///
    /// Walks the continued-fraction convergents until the next one would
    /// exceed the bound, then picks between the last convergent and the best
    /// semiconvergent. Ties go to the convergent. Bounds are clamped to
    /// `1..=u32::MAX`.
    pub fn limit_denominator(self, max_denom: u64) -> Self {
        let max_denom = max_denom.clamp(1, u64::from(u32::MAX));
        if self.denom <= max_denom {
            return self;
        }

        let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
        let (mut n, mut d) = (u128::from(self.numer), u128::from(self.denom));
        let bound = u128::from(max_denom);
        loop {
            let a = n / d;
            let q2 = q0 + a * q1;
            if q2 > bound {
                break;
            }
            (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
            (n, d) = (d, n - a * d);
        }

        let k = (bound - q0) / q1;
        let semi = (p0 + k * p1, q0 + k * q1);
        let conv = (p1, q1);

        // |p/q - x| compared as |p*D - N*q| / q with a common factor of D.
        let x_n = u128::from(self.numer);
        let x_d = u128::from(self.denom);
        let err = |(p, q): (u128, u128)| (p * x_d).abs_diff(x_n * q);
        let pick = if err(conv) * semi.1 <= err(semi) * conv.1 {
            conv
        } else {
            semi
        };

        // Both candidates have denominators at most `max_denom`.
        #[allow(clippy::cast_possible_truncation)]
        let (numer, denom) = (pick.0 as u64, pick.1 as u64);
        Self::new(numer, denom)
    }
}
