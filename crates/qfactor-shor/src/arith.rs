//! Integer helpers for the classical half of the algorithm.

/// Greatest common divisor, with `gcd(0, n) = n`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `base^exp mod m` by binary exponentiation with u128 intermediates.
pub fn mod_pow(base: u64, mut exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let m = u128::from(m);
    let mut b = u128::from(base) % m;
    let mut result = 1u128;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        exp >>= 1;
        b = b * b % m;
    }
    // result < m <= u64::MAX
    result as u64
}

/// Deterministic Miller-Rabin for all `u64`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    let mul = |x: u64, y: u64| (u128::from(x) * u128::from(y) % u128::from(n)) as u64;
    'witness: for a in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul(x, x);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// The two Shor guesses `gcd(a^k - 1, n)` and `gcd(a^k + 1, n)`.
///
/// The power is reduced modulo `n` first, which leaves both gcds unchanged.
pub fn factor_guesses(a: u64, k: u64, n: u64) -> [u64; 2] {
    let p = mod_pow(a, k, n);
    let minus = if p == 0 { n - 1 } else { p - 1 };
    let plus = (u128::from(p) + 1) % u128::from(n);
    [gcd(minus, n), gcd(plus as u64, n)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(48, 15), 3);
        assert_eq!(gcd(0, 15), 15);
        assert_eq!(gcd(15, 0), 15);
        assert_eq!(gcd(17, 5), 1);
    }

    #[test]
    fn test_mod_pow() {
        assert_eq!(mod_pow(7, 2, 15), 4);
        assert_eq!(mod_pow(2, 0, 15), 1);
        assert_eq!(mod_pow(2, 10, 1), 0);
        assert_eq!(mod_pow(u64::MAX, 2, u64::MAX - 1), 1);
    }

    #[test]
    fn test_is_prime() {
        let primes: Vec<u64> = (0..50).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
        assert!(!is_prime(15));
        assert!(!is_prime(3_215_031_751)); // strong pseudoprime to bases 2, 3, 5, 7
        assert!(is_prime(18_446_744_073_709_551_557));
    }

    #[test]
    fn test_guesses_match_direct_powers() {
        // 7^2 = 49: gcd(48, 15) = 3, gcd(50, 15) = 5
        assert_eq!(factor_guesses(7, 2, 15), [3, 5]);
        // a^0 = 1: gcd(0, 15) = 15, gcd(2, 15) = 1
        assert_eq!(factor_guesses(2, 0, 15), [15, 1]);
        // 2^1 = 2 mod 14: gcd(1, 14) = 1, gcd(3, 14) = 1
        assert_eq!(factor_guesses(2, 1, 14), [1, 1]);
    }

    #[test]
    fn test_guesses_when_power_vanishes() {
        // 3^2 = 9 = 0 mod 9: gcd(8, 9) = 1, gcd(10, 9) = 1
        assert_eq!(factor_guesses(3, 2, 9), [1, 1]);
        // 6^1 mod 3 = 0: gcd(-1 mod 3 = 2, 3) = 1
        assert_eq!(factor_guesses(6, 1, 3), [1, 1]);
    }
}
