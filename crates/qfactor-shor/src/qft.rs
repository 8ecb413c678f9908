//! Inverse quantum Fourier transform.

use std::f64::consts::PI;

use qfactor_ir::{Circuit, QubitId};

use crate::error::{ShorError, ShorResult};

/// Build the `n`-qubit inverse QFT, named `QFT†`.
///
/// Qubit order is reversed first, then every qubit `j` receives a
/// controlled phase of `-π/2^(j-m)` from each lower qubit `m` followed by a
/// Hadamard. The result is [`Circuit::qft`] inverted exactly.
pub fn qft_dagger(n: u32) -> ShorResult<Circuit> {
    if n == 0 || n >= u32::BITS {
        return Err(ShorError::InvalidQubitCount(n));
    }

    let mut qc = Circuit::with_size("QFT†", n, 0);
    for q in 0..n / 2 {
        qc.swap(QubitId(q), QubitId(n - q - 1))?;
    }
    for j in 0..n {
        for m in 0..j {
            qc.cp(-PI / f64::from(1u32 << (j - m)), QubitId(m), QubitId(j))?;
        }
        qc.h(QubitId(j))?;
    }
    Ok(qc)
}
