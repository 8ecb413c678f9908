//! Controlled multiplication by `a^power` modulo 15.
//!
//! The work register holds a 4-bit value big-endian over its qubits,
//! `v = 8*b0 + 4*b1 + 2*b2 + b3`. Multiplying by 2 mod 15 is then a cyclic
//! rotation of the bits, multiplying by 4 a rotation by two, and the bases
//! 7, 11 and 13 are `-8`, `-4` and `-2`: the same rotation followed by a
//! bitwise complement (`15 - v`).
//!
//! | a | swaps (per repetition) | complement |
//! |---|------------------------|------------|
//! | 2, 13 | (0,1) (1,2) (2,3) | 13 |
//! | 7, 8 | (2,3) (1,2) (0,1) | 7 |
//! | 4, 11 | (1,3) (0,2) | 11 |

use qfactor_ir::{Circuit, CustomGate, QubitId};

use crate::error::{ShorError, ShorResult};

/// The only modulus the multiplication circuit supports.
pub const MODULUS: u64 = 15;

/// Width of the work register.
pub const WORK_QUBITS: u32 = 4;

/// Bases with a multiplication circuit, in ascending order.
pub const SUPPORTED_BASES: [u64; 6] = [2, 4, 7, 8, 11, 13];

const ROTATE_UP: &[(u32, u32)] = &[(0, 1), (1, 2), (2, 3)];
const ROTATE_DOWN: &[(u32, u32)] = &[(2, 3), (1, 2), (0, 1)];
const ROTATE_TWO: &[(u32, u32)] = &[(1, 3), (0, 2)];

/// A base coprime to 15 for which the swap network is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModExpBase(u64);

impl ModExpBase {
    /// The base value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Qubit swaps realising one multiplication, before any complement.
    pub fn swap_pattern(self) -> &'static [(u32, u32)] {
        match self.0 {
            2 | 13 => ROTATE_UP,
            7 | 8 => ROTATE_DOWN,
            _ => ROTATE_TWO,
        }
    }

    /// Whether each multiplication ends with a complement of the register.
    pub fn negates(self) -> bool {
        matches!(self.0, 7 | 11 | 13)
    }
}

impl TryFrom<u64> for ModExpBase {
    type Error = ShorError;

    fn try_from(base: u64) -> ShorResult<Self> {
        if SUPPORTED_BASES.contains(&base) {
            Ok(Self(base))
        } else {
            Err(ShorError::InvalidBase { base })
        }
    }
}

/// Build the controlled gate multiplying the work register by `a^power`.
///
/// The returned gate has five operands: the control qubit first, then the
/// four work qubits `b0..b3`. Its body repeats the single multiplication
/// `power` times; `power = 0` yields the identity.
pub fn c_amod15(a: u64, power: u64) -> ShorResult<CustomGate> {
    let base = ModExpBase::try_from(a)?;

    let mut u = Circuit::with_size(format!("{a}^{power} mod 15"), WORK_QUBITS, 0);
    for _ in 0..power {
        for &(p, q) in base.swap_pattern() {
            u.swap(QubitId(p), QubitId(q))?;
        }
        if base.negates() {
            for q in 0..WORK_QUBITS {
                u.x(QubitId(q))?;
            }
        }
    }

    Ok(u.to_gate()?.control(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Apply the swap network to a classical value.
    fn permute(base: ModExpBase, v: u64) -> u64 {
        let mut bits: Vec<u64> = (0..4).map(|i| (v >> (3 - i)) & 1).collect();
        for &(p, q) in base.swap_pattern() {
            bits.swap(p as usize, q as usize);
        }
        let mut out = bits.iter().fold(0, |acc, b| acc << 1 | b);
        if base.negates() {
            out ^= 0b1111;
        }
        out
    }

    #[test]
    fn test_rejects_unsupported_base() {
        for bad in [0, 1, 3, 5, 6, 9, 14, 15, 16] {
            assert!(matches!(
                c_amod15(bad, 1),
                Err(ShorError::InvalidBase { base }) if base == bad
            ));
        }
    }

    #[test]
    fn test_gate_shape() {
        let gate = c_amod15(7, 4).unwrap();
        assert_eq!(gate.name, "7^4 mod 15");
        assert_eq!(gate.num_qubits, 5);
        assert_eq!(gate.num_ctrl_qubits, 1);
        // 4 repetitions of 3 swaps and 4 X gates.
        assert_eq!(gate.definition.as_ref().map(Vec::len), Some(28));
    }

    #[test]
    fn test_zero_power_is_empty() {
        let gate = c_amod15(2, 0).unwrap();
        assert_eq!(gate.definition.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_patterns_multiply_classically() {
        for &a in &SUPPORTED_BASES {
            let base = ModExpBase::try_from(a).unwrap();
            for v in 1..15 {
                assert_eq!(permute(base, v), a * v % MODULUS, "a={a} v={v}");
            }
        }
    }
}
