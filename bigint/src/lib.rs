//! Arbitrary-precision unsigned integer facade.
//!
//! `Natural` is the only arithmetic surface the rest of the workspace is
//! allowed to touch; every engine goes through `mul`/`quo_rem`/`rem`/`gcd`
//! here instead of reaching into `num_bigint` directly, so the destination-
//! passing variants (`mul_into`, `rem_into`) stay the one place that decides
//! how aggressively to reuse allocations.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("invalid hex digit in {0:?}")]
    InvalidHex(String),
}

/// An immutable (from the caller's point of view) arbitrary-precision
/// non-negative integer.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Natural(BigUint);

impl Natural {
    pub fn zero() -> Self {
        Natural(BigUint::zero())
    }

    pub fn one() -> Self {
        Natural(BigUint::one())
    }

    pub fn from_u64(v: u64) -> Self {
        Natural(BigUint::from(v))
    }

    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Natural(BigUint::from_bytes_be(bytes))
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }

    /// Parses a lowercase-or-uppercase hex string with no `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidHex(s.to_string()));
        }
        // BigUint::parse_bytes wants an even number of hex digits is not
        // required; it decodes the same way `big.Int.SetString(_, 16)` does.
        let value = BigUint::parse_bytes(s.as_bytes(), 16).ok_or_else(|| ParseError::InvalidHex(s.to_string()))?;
        Ok(Natural(value))
    }

    /// Lowercase hex, no leading zeros, no `0x` prefix. `0` renders as `"0"`.
    pub fn to_hex(&self) -> String {
        if self.0.is_zero() {
            return "0".to_string();
        }
        let bytes = self.0.to_bytes_be();
        let mut s = hex::encode(bytes);
        // to_bytes_be never carries leading zero bytes (BigUint strips them),
        // but the top nibble of the first byte can still be zero.
        while s.len() > 1 && s.starts_with('0') {
            s.remove(0);
        }
        s
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// 0 for zero, 1 for one, matching the reference `big.Int.BitLen`.
    pub fn bit_len(&self) -> u64 {
        self.0.bits()
    }

    pub fn cmp(&self, other: &Natural) -> Ordering {
        self.0.cmp(&other.0)
    }

    pub fn mul(a: &Natural, b: &Natural) -> Natural {
        Natural(&a.0 * &b.0)
    }

    /// Destination-passing multiply: `self <- a * b`.
    pub fn mul_into(&mut self, a: &Natural, b: &Natural) {
        self.0 = &a.0 * &b.0;
    }

    pub fn quo(a: &Natural, b: &Natural) -> Natural {
        Natural(&a.0 / &b.0)
    }

    pub fn rem(a: &Natural, modulus: &Natural) -> Natural {
        Natural(&a.0 % &modulus.0)
    }

    /// Destination-passing remainder: `self <- a mod modulus`.
    pub fn rem_into(&mut self, a: &Natural, modulus: &Natural) {
        self.0 = &a.0 % &modulus.0;
    }

    pub fn quo_rem(a: &Natural, b: &Natural) -> (Natural, Natural) {
        let (q, r) = a.0.div_rem(&b.0);
        (Natural(q), Natural(r))
    }

    pub fn gcd(a: &Natural, b: &Natural) -> Natural {
        Natural(a.0.gcd(&b.0))
    }

    pub fn square(&self) -> Natural {
        Natural(&self.0 * &self.0)
    }
}

impl fmt::Display for Natural {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::ops::Mul for &Natural {
    type Output = Natural;
    fn mul(self, rhs: &Natural) -> Natural {
        Natural::mul(self, rhs)
    }
}

/// Uniform random `Natural` generation, used only by the synthetic modulus
/// generator — never by the engines themselves.
pub mod random {
    use super::Natural;
    use num_bigint::{BigUint, RandBigInt};
    use num_integer::Integer;
    use num_traits::One;
    use rand::Rng;

    /// Generates a uniformly random odd `Natural` with exactly `bits` bits
    /// (top bit set), suitable as an RSA prime candidate before sieving.
    pub fn random_odd(rng: &mut impl Rng, bits: u64) -> Natural {
        let mut v: BigUint = rng.gen_biguint(bits);
        let top = BigUint::one() << (bits - 1);
        v |= &top;
        v |= BigUint::one();
        Natural(v)
    }

    /// A small Miller-Rabin primality test, deterministic for the bit sizes
    /// this crate cares about via a fixed witness set plus a handful of
    /// random witnesses, good enough for generating test fixtures (this is
    /// not a cryptographic primality oracle).
    pub fn is_probably_prime(rng: &mut impl Rng, n: &Natural, rounds: u32) -> bool {
        let n = &n.0;
        if *n < BigUint::from(2u8) {
            return false;
        }
        for small in [2u8, 3, 5, 7, 11, 13].iter().map(|&p| BigUint::from(p)) {
            if *n == small {
                return true;
            }
            if (n % &small).is_zero_uint() {
                return false;
            }
        }

        let one = BigUint::one();
        let two = &one + &one;
        let n_minus_one = n - &one;
        let (mut d, mut r) = (n_minus_one.clone(), 0u32);
        while (&d % &two).is_zero_uint() {
            d /= &two;
            r += 1;
        }

        'witness: for _ in 0..rounds {
            let a = rng.gen_biguint_range(&two, &n_minus_one);
            let mut x = a.modpow(&d, n);
            if x == one || x == n_minus_one {
                continue;
            }
            for _ in 0..r - 1 {
                x = x.modpow(&two, n);
                if x == n_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }

    trait IsZeroUint {
        fn is_zero_uint(&self) -> bool;
    }
    impl IsZeroUint for BigUint {
        fn is_zero_uint(&self) -> bool {
            use num_traits::Zero;
            Zero::is_zero(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let n = Natural::from_hex("1a2b3c").unwrap();
        assert_eq!(n.to_hex(), "1a2b3c");
    }

    #[test]
    fn hex_strips_leading_zeros() {
        let n = Natural::from_hex("00ff").unwrap();
        assert_eq!(n.to_hex(), "ff");
    }

    #[test]
    fn zero_renders_as_zero() {
        assert_eq!(Natural::zero().to_hex(), "0");
    }

    #[test]
    fn bit_len_matches_reference_semantics() {
        assert_eq!(Natural::zero().bit_len(), 0);
        assert_eq!(Natural::one().bit_len(), 1);
        assert_eq!(Natural::from_u64(4).bit_len(), 3);
    }

    #[test]
    fn mul_and_quo_rem_invert() {
        let a = Natural::from_hex("deadbeef").unwrap();
        let b = Natural::from_hex("cafe").unwrap();
        let product = Natural::mul(&a, &b);
        let (q, r) = Natural::quo_rem(&product, &b);
        assert_eq!(q, a);
        assert_eq!(r, Natural::zero());
    }

    #[test]
    fn gcd_shares_common_factor() {
        // 35 = 5*7, 143 = 11*13, 77 = 7*11 shares a factor with each
        let a = Natural::from_u64(35);
        let b = Natural::from_u64(77);
        let c = Natural::from_u64(143);
        assert_eq!(Natural::gcd(&a, &b), Natural::from_u64(7));
        assert_eq!(Natural::gcd(&b, &c), Natural::from_u64(11));
        assert_eq!(Natural::gcd(&a, &c), Natural::one());
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert_eq!(Natural::from_hex(""), Err(ParseError::Empty));
        assert!(Natural::from_hex("zz").is_err());
    }

    #[test]
    fn destination_passing_matches_allocating() {
        let a = Natural::from_u64(123456789);
        let b = Natural::from_u64(987654321);
        let mut dest = Natural::zero();
        dest.mul_into(&a, &b);
        assert_eq!(dest, Natural::mul(&a, &b));
    }
}
