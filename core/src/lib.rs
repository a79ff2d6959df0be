//! Four ways to find which moduli in an RSA modulus batch share a prime
//! factor, from the quadratic pairwise baseline up to the streaming
//! low-memory product/remainder tree.

pub mod collision;
pub mod config;
pub mod dedup_scan;
pub mod engines;
pub mod error;
pub mod spill;
mod worker;

pub use batchgcd_bigint::Natural;
pub use collision::{Collision, Deduplicator};
pub use config::RunConfig;
pub use error::EngineError;

use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Pairwise,
    MulAccum,
    SmoothParts,
    SmoothPartsLowMem,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Algorithm::Pairwise => "pairwise",
            Algorithm::MulAccum => "mulaccum",
            Algorithm::SmoothParts => "smoothparts",
            Algorithm::SmoothPartsLowMem => "smoothparts_lowmem",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown algorithm {0:?}")]
pub struct UnknownAlgorithm(String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairwise" => Ok(Algorithm::Pairwise),
            "mulaccum" => Ok(Algorithm::MulAccum),
            "smoothparts" => Ok(Algorithm::SmoothParts),
            // "smoothparts_lowmem" is the external-interface spelling; the
            // hyphenated form is accepted too since it matches every other
            // multi-word value this flag takes.
            "smoothparts_lowmem" | "smoothparts-lowmem" => Ok(Algorithm::SmoothPartsLowMem),
            other => Err(UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Runs `algorithm` over a fully-loaded batch of moduli, streaming
/// `Collision` records to `tx` as they're found.
///
/// `SmoothPartsLowMem` is the odd one out in the engine API (it wants a
/// `Receiver<Natural>` rather than a slice, since it's the one engine meant
/// for batches too large to hold entirely in memory); callers that already
/// have the whole batch loaded get a feeder thread wired up for them here.
pub fn run(algorithm: Algorithm, moduli: Vec<Natural>, tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    match algorithm {
        Algorithm::Pairwise => engines::pairwise::run(&moduli, tx, cfg),
        Algorithm::MulAccum => engines::accumulator::run(&moduli, tx, cfg),
        Algorithm::SmoothParts => engines::tree::run(&moduli, tx, cfg),
        Algorithm::SmoothPartsLowMem => run_streaming(moduli, tx, cfg),
    }
}

/// Entry point for callers that already have a stream of moduli (rather
/// than a pre-loaded `Vec`), matching `SmoothPartsLowMem`'s native shape.
pub fn run_streaming_from(input: Receiver<Natural>, tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    engines::streaming::run(input, tx, cfg)
}

fn run_streaming(moduli: Vec<Natural>, tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    let (feed_tx, feed_rx) = crossbeam_channel::bounded(cfg.channel_capacity);
    let feeder = std::thread::spawn(move || {
        for m in moduli {
            if feed_tx.send(m).is_err() {
                break;
            }
        }
    });
    let result = engines::streaming::run(feed_rx, tx, cfg);
    let _ = feeder.join();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_round_trips_through_its_display_form() {
        for algo in [Algorithm::Pairwise, Algorithm::MulAccum, Algorithm::SmoothParts, Algorithm::SmoothPartsLowMem] {
            assert_eq!(algo.to_string().parse::<Algorithm>().unwrap(), algo);
        }
    }

    #[test]
    fn unknown_algorithm_name_is_rejected() {
        assert!("quantum".parse::<Algorithm>().is_err());
    }

    #[test]
    fn all_four_algorithms_agree_on_a_mixed_batch() {
        let moduli = vec![
            Natural::from_u64(35),
            Natural::from_u64(77),
            Natural::from_u64(143),
            Natural::from_u64(91),
            Natural::from_u64(221),
        ];
        let cfg = RunConfig::default();
        let mut all_keys = Vec::new();
        for algo in [Algorithm::Pairwise, Algorithm::MulAccum, Algorithm::SmoothParts, Algorithm::SmoothPartsLowMem] {
            let (tx, rx) = crossbeam_channel::unbounded();
            run(algo, moduli.clone(), tx, &cfg).unwrap();
            let mut keys: Vec<String> = rx.iter().map(|c| c.to_string()).collect();
            keys.sort();
            keys.dedup();
            all_keys.push((algo, keys));
        }
        let (_, first) = &all_keys[0];
        for (algo, keys) in &all_keys[1..] {
            assert_eq!(keys, first, "{algo} disagreed with {}", all_keys[0].0);
        }
    }
}
