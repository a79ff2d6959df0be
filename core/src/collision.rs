//! The `Collision` record and the first-occurrence deduplication it needs
//! once results start arriving out of order from parallel engines.

use batchgcd_bigint::Natural;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// One finding surfaced by an engine: either two identical moduli, or a
/// modulus factored via a shared prime with another modulus in the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Duplicate(Natural),
    Factorization {
        modulus: Natural,
        p: Natural,
        q: Natural,
    },
}

impl Collision {
    /// Builds a `Factorization`, ordering `p <= q` so textually equal
    /// collisions dedupe regardless of which engine found which factor first.
    pub fn factorization(modulus: Natural, p: Natural, q: Natural) -> Self {
        let (p, q) = if p.cmp(&q) == Ordering::Greater { (q, p) } else { (p, q) };
        Collision::Factorization { modulus, p, q }
    }

    pub fn modulus(&self) -> &Natural {
        match self {
            Collision::Duplicate(m) => m,
            Collision::Factorization { modulus, .. } => modulus,
        }
    }

    /// Checks the invariant every `Factorization` must satisfy: `p * q == modulus`
    /// and `1 < p, q < modulus`. `Duplicate` records are trivially valid.
    pub fn is_valid(&self) -> bool {
        match self {
            Collision::Duplicate(_) => true,
            Collision::Factorization { modulus, p, q } => {
                !p.is_one() && !q.is_one() && p.cmp(modulus) == Ordering::Less && q.cmp(modulus) == Ordering::Less
                    && &Natural::mul(p, q) == modulus
            }
        }
    }
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collision::Duplicate(m) => write!(f, "DUPLICATE: {}", m.to_hex()),
            Collision::Factorization { modulus, p, q } => {
                write!(f, "COLLISION: N={} P={} Q={}", modulus.to_hex(), p.to_hex(), q.to_hex())
            }
        }
    }
}

/// First-occurrence filter keyed on a collision's canonical textual form, so
/// the same finding reported by two resolvers (or both directions of a
/// pairwise comparison) is only ever reported once.
#[derive(Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Deduplicator { seen: HashSet::new() }
    }

    /// Returns `true` the first time a given canonical form is seen.
    pub fn accept(&mut self, collision: &Collision) -> bool {
        self.seen.insert(collision.to_string())
    }
}
