//! O(N) streaming variant: multiply moduli one at a time into a running
//! accumulator, and whenever the accumulator picks up a new shared factor,
//! fan out a resolver task to figure out which modulus actually owns it.
//! Resolver concurrency is capped at `cfg.threads` via a permit channel so
//! a batch with many collisions can't spawn unbounded resolvers.

use crate::collision::Collision;
use crate::config::RunConfig;
use crate::engines::resolvers;
use crate::error::EngineError;
use batchgcd_bigint::Natural;
use crossbeam_channel::Sender;
use std::cmp::Ordering;

pub fn run(moduli: &[Natural], tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    let n = moduli.len();
    if n == 0 {
        return Ok(());
    }
    let workers = cfg.threads.max(1);
    let (permit_tx, permit_rx) = crossbeam_channel::bounded::<()>(workers);
    for _ in 0..workers {
        let _ = permit_tx.send(());
    }

    std::thread::scope(|scope| {
        let mut accum = Natural::one();
        for i in 0..n {
            let g = Natural::gcd(&accum, &moduli[i]);
            if g.bit_len() != 1 {
                // Block for a free resolver slot before spawning, so at most
                // `workers` resolvers ever run concurrently.
                let _ = permit_rx.recv();
                let tx = tx.clone();
                let permit_tx = permit_tx.clone();
                if g.cmp(&moduli[i]) == Ordering::Equal {
                    scope.spawn(move || {
                        resolvers::find_gcd(moduli, i, &tx);
                        let _ = permit_tx.send(());
                    });
                } else {
                    scope.spawn(move || {
                        resolvers::find_divisors(moduli, i, &g, &tx);
                        let _ = permit_tx.send(());
                    });
                }
            }
            accum = Natural::mul(&accum, &moduli[i]);
        }
    });
    Ok(())
}
