//! Exact-value duplicate pre-scan.
//!
//! The product/remainder tree's math has no way to notice that `M_i == M_j`
//! (gcd(M_i, M_i) == M_i and the emitted Q collapses to 1, which is not a
//! valid factorization); the pairwise and accumulator engines instead catch
//! equal moduli directly while they scan. Anything driving the tree engine
//! from an in-memory batch runs this first so duplicates are still reported.

use crate::collision::Collision;
use batchgcd_bigint::Natural;
use std::collections::HashMap;

pub fn find_duplicates(moduli: &[Natural]) -> Vec<Collision> {
    let mut seen: HashMap<&Natural, bool> = HashMap::new();
    let mut out = Vec::new();
    for m in moduli {
        match seen.get(m) {
            None => {
                seen.insert(m, false);
            }
            Some(false) => {
                out.push(Collision::Duplicate(m.clone()));
                seen.insert(m, true);
            }
            Some(true) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_one_duplicate_per_repeated_value() {
        let n = Natural::from_u64(35);
        let m = Natural::from_u64(77);
        let found = find_duplicates(&[n.clone(), n.clone(), n, m]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn no_duplicates_in_distinct_batch() {
        let found = find_duplicates(&[Natural::from_u64(35), Natural::from_u64(77)]);
        assert!(found.is_empty());
    }
}
