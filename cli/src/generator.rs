//! Synthetic RSA-like modulus generator, mirroring the reference tool's
//! `mkmoduli`: each modulus is a product of two random primes, and at the
//! configured rate a high prime is stashed and reused as one factor of a
//! later modulus, planting a genuine shared-factor collision instead of an
//! exact duplicate.

use batchgcd_bigint::{random, Natural};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct GenerateOptions {
    pub count: u64,
    pub bits: u64,
    pub dup_rate: f64,
    pub seed: Option<u64>,
}

fn random_prime(rng: &mut StdRng, bits: u64) -> Natural {
    loop {
        let candidate = random::random_odd(rng, bits);
        if random::is_probably_prime(rng, &candidate, 20) {
            return candidate;
        }
    }
}

pub fn generate(opts: &GenerateOptions) -> Vec<Natural> {
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let hi_bits = (opts.bits + 1) / 2;
    let lo_bits = opts.bits / 2;

    let mut stashed: Option<Natural> = None;
    let mut out = Vec::with_capacity(opts.count as usize);
    for _ in 0..opts.count {
        let hi = random_prime(&mut rng, hi_bits);
        if rng.gen::<f64>() < opts.dup_rate {
            match stashed.take() {
                Some(shared) => {
                    out.push(Natural::mul(&hi, &shared));
                    continue;
                }
                None => stashed = Some(hi.clone()),
            }
        }
        let lo = random_prime(&mut rng, lo_bits);
        out.push(Natural::mul(&hi, &lo));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_the_requested_count() {
        let opts = GenerateOptions { count: 10, bits: 64, dup_rate: 0.3, seed: Some(42) };
        let moduli = generate(&opts);
        assert_eq!(moduli.len(), 10);
        assert!(moduli.iter().all(|m| m.bit_len() >= 60));
    }

    #[test]
    fn same_seed_reproduces_the_same_batch() {
        let opts = GenerateOptions { count: 8, bits: 64, dup_rate: 0.5, seed: Some(7) };
        let a = generate(&opts);
        let b = generate(&opts);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_dup_rate_still_generates() {
        let opts = GenerateOptions { count: 4, bits: 64, dup_rate: 0.0, seed: Some(1) };
        assert_eq!(generate(&opts).len(), 4);
    }
}
