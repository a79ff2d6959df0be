//! The two resolver tasks the accumulator engine fans out to whenever its
//! running product shares a factor with the modulus it just multiplied in.
//! Each resolver only ever looks backwards, at moduli already folded into
//! the accumulator (indices `0..i`), mirroring the streaming nature of the
//! O(N) scan.

use crate::collision::Collision;
use batchgcd_bigint::Natural;
use crossbeam_channel::Sender;

/// `gcd(accumulator, M_i) == g`, `1 < g < M_i`. Reports `(M_i, g, M_i/g)`
/// and then re-derives `g` against every earlier modulus to find which one
/// actually contributed it.
pub fn find_divisors(moduli: &[Natural], i: usize, g: &Natural, tx: &Sender<Collision>) {
    let m = &moduli[i];
    if tx.send(Collision::factorization(m.clone(), g.clone(), Natural::quo(m, g))).is_err() {
        return;
    }
    for n in &moduli[..i] {
        let (q, r) = Natural::quo_rem(n, g);
        if r.is_zero() && tx.send(Collision::factorization(n.clone(), g.clone(), q)).is_err() {
            return;
        }
    }
}

/// `gcd(accumulator, M_i) == M_i`: the accumulator was already divisible by
/// `M_i`, so the shared factor can't be isolated from the running product
/// alone. Falls back to a pairwise scan against every earlier modulus.
pub fn find_gcd(moduli: &[Natural], i: usize, tx: &Sender<Collision>) {
    let m = &moduli[i];
    for n in &moduli[..i] {
        if m == n {
            if tx.send(Collision::Duplicate(m.clone())).is_err() {
                return;
            }
            continue;
        }
        let g = Natural::gcd(m, n);
        if g.bit_len() != 1 {
            if tx.send(Collision::factorization(m.clone(), g.clone(), Natural::quo(m, &g))).is_err() {
                return;
            }
            if tx.send(Collision::factorization(n.clone(), g.clone(), Natural::quo(n, &g))).is_err() {
                return;
            }
        }
    }
}
