//! In-memory product/remainder tree ("smoothparts"): O(N log^2 N) instead
//! of pairwise's O(N^2), by reducing the full product down to each
//! modulus's own smooth part in two parallel tree passes.
//!
//! Build phase 1 (bottom-up) pairs adjacent moduli into products, level by
//! level, until a single root remains; an odd node at any level is copied
//! through untouched rather than paired (the tree's odd-fan-out rule).
//! Build phase 2 (top-down) reduces the root against each level's own
//! values: `x <- y mod x^2`, where `y` is the already-reduced parent. The
//! same formula applies uniformly at an odd-fan-out position too, since a
//! one-leaf subtree's "product" is just that leaf, and nothing about the
//! reduction requires the subtree to have two children.

use crate::collision::Collision;
use crate::config::RunConfig;
use crate::dedup_scan;
use crate::error::EngineError;
use crate::worker;
use batchgcd_bigint::Natural;
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::cmp::Ordering;

fn build_level(pool: &rayon::ThreadPool, input: &[Natural], out_len: usize) -> Vec<Natural> {
    let mut output = vec![Natural::zero(); out_len];
    pool.install(|| {
        output.par_iter_mut().enumerate().for_each(|(i, slot)| {
            let j = i * 2;
            if j + 1 < input.len() {
                slot.mul_into(&input[j], &input[j + 1]);
            }
        });
    });
    if input.len() % 2 == 1 {
        output[out_len - 1] = input[input.len() - 1].clone();
    }
    output
}

pub fn run(moduli: &[Natural], tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    for dup in dedup_scan::find_duplicates(moduli) {
        if tx.send(dup).is_err() {
            return Ok(());
        }
    }

    let n = moduli.len();
    if n < 2 {
        return Ok(());
    }

    let pool = worker::build_pool(cfg.threads)?;

    let mut level_sizes = Vec::new();
    let mut cur = (n + 1) / 2;
    loop {
        level_sizes.push(cur);
        if cur == 1 {
            break;
        }
        cur = (cur + 1) / 2;
    }

    let mut levels: Vec<Vec<Natural>> = Vec::with_capacity(level_sizes.len());
    for (level_idx, &size) in level_sizes.iter().enumerate() {
        let input: &[Natural] = if level_idx == 0 { moduli } else { &levels[level_idx - 1] };
        levels.push(build_level(&pool, input, size));
    }

    // Remainder tree, top-down: levels[last] is already the root, so the
    // loop starts one level below it.
    for level in (0..levels.len() - 1).rev() {
        let (lower, upper) = levels.split_at_mut(level + 1);
        let this_level = &mut lower[level];
        let parent_level = &upper[0];
        pool.install(|| {
            this_level.par_iter_mut().enumerate().for_each(|(i, x)| {
                let y = &parent_level[i / 2];
                let xsq = x.square();
                x.rem_into(y, &xsq);
            });
        });
    }

    let level0 = &levels[0];
    for (i, modulus) in moduli.iter().enumerate() {
        let y = &level0[i / 2];
        let msq = modulus.square();
        let z = Natural::rem(y, &msq);
        let z = Natural::quo(&z, modulus);
        let g = Natural::gcd(&z, modulus);
        if g.bit_len() == 1 {
            continue;
        }
        if g.cmp(modulus) == Ordering::Equal {
            // g == M_i: the tree math can't isolate a nontrivial factor pair
            // here (the Q it would emit collapses to 1). The exact-value
            // pre-scan above already reported any duplicate responsible for
            // this; nothing further to emit.
            continue;
        }
        let q = Natural::quo(modulus, &g);
        if tx.send(Collision::factorization(modulus.clone(), g, q)).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::pairwise;

    fn oracle_keys(moduli: &[Natural]) -> Vec<String> {
        let (tx, rx) = crossbeam_channel::unbounded();
        pairwise::run(moduli, tx, &RunConfig::default()).unwrap();
        let mut keys: Vec<String> = rx.iter().map(|c| c.to_string()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn tree_keys(moduli: &[Natural]) -> Vec<String> {
        let (tx, rx) = crossbeam_channel::unbounded();
        run(moduli, tx, &RunConfig::default()).unwrap();
        let mut keys: Vec<String> = rx.iter().map(|c| c.to_string()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    #[test]
    fn matches_pairwise_on_even_batch() {
        let moduli = vec![
            Natural::from_u64(35),
            Natural::from_u64(77),
            Natural::from_u64(143),
            Natural::from_u64(91),
        ];
        assert_eq!(tree_keys(&moduli), oracle_keys(&moduli));
    }

    #[test]
    fn matches_pairwise_on_odd_batch() {
        let moduli = vec![
            Natural::from_u64(35),
            Natural::from_u64(77),
            Natural::from_u64(143),
            Natural::from_u64(91),
            Natural::from_u64(221),
        ];
        assert_eq!(tree_keys(&moduli), oracle_keys(&moduli));
    }

    #[test]
    fn duplicate_is_reported_once() {
        let n = Natural::from_u64(35);
        let moduli = vec![n.clone(), Natural::from_u64(77), n];
        let (tx, rx) = crossbeam_channel::unbounded();
        run(&moduli, tx, &RunConfig::default()).unwrap();
        let found: Vec<Collision> = rx.iter().collect();
        assert_eq!(found.iter().filter(|c| matches!(c, Collision::Duplicate(_))).count(), 1);
    }
}
