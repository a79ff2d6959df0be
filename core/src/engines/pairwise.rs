//! Pairwise baseline: every unordered pair gets a direct GCD. O(N^2) GCDs,
//! used as the oracle the other three engines are tested against.

use crate::collision::Collision;
use crate::config::RunConfig;
use crate::error::EngineError;
use crate::worker;
use batchgcd_bigint::Natural;
use crossbeam_channel::Sender;
use rayon::prelude::*;

pub fn run(moduli: &[Natural], tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    let n = moduli.len();
    if n < 2 {
        return Ok(());
    }
    let pool = worker::build_pool(cfg.threads)?;
    pool.install(|| {
        (0..n).into_par_iter().for_each(|i| {
            let mi = &moduli[i];
            for mj in &moduli[i + 1..] {
                if mi == mj {
                    if tx.send(Collision::Duplicate(mi.clone())).is_err() {
                        return;
                    }
                    continue;
                }
                let g = Natural::gcd(mi, mj);
                if g.bit_len() != 1 {
                    let qi = Natural::quo(mi, &g);
                    let qj = Natural::quo(mj, &g);
                    if tx.send(Collision::factorization(mi.clone(), g.clone(), qi)).is_err() {
                        return;
                    }
                    if tx.send(Collision::factorization(mj.clone(), g, qj)).is_err() {
                        return;
                    }
                }
            }
        });
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_shared_factor_and_duplicate() {
        let moduli = vec![Natural::from_u64(35), Natural::from_u64(77), Natural::from_u64(35)];
        let (tx, rx) = crossbeam_channel::unbounded();
        run(&moduli, tx, &RunConfig::default()).unwrap();
        let found: Vec<Collision> = rx.iter().collect();
        assert!(found.iter().any(|c| matches!(c, Collision::Duplicate(_))));
        assert!(found.iter().any(|c| matches!(c, Collision::Factorization { .. })));
        assert!(found.iter().all(Collision::is_valid));
    }

    #[test]
    fn empty_and_singleton_batches_emit_nothing() {
        let (tx, rx) = crossbeam_channel::unbounded();
        run(&[], tx, &RunConfig::default()).unwrap();
        assert!(rx.try_recv().is_err());

        let (tx, rx) = crossbeam_channel::unbounded();
        run(&[Natural::from_u64(35)], tx, &RunConfig::default()).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
