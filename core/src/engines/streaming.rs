//! Low-memory variant of the product/remainder tree: the same algorithm as
//! [`crate::engines::tree`], but with every level's node values spilled to a
//! temp file instead of kept in a `Vec`, so peak memory stays bounded by the
//! width of the tree's top few levels rather than the whole input.
//!
//! The input arrives as a channel rather than a slice, since the whole
//! point of this engine is to not require the full batch resident in
//! memory at once. One thread runs per tree level (product construction
//! and, afterwards, remainder reduction); a level's own spill file is
//! shared between the thread that writes it and the thread that later
//! reads it back, via a plain mutex (no extra writer/reader task needed,
//! since by the time the root is found every lower level has necessarily
//! finished writing).
//!
//! Level 0's spill doubles as the record of the original moduli
//! themselves: the recursion bottoms out by reading that level's records
//! back as the two leaves to actually factor, rather than as an
//! intermediate product to reduce further.

use crate::collision::Collision;
use crate::config::RunConfig;
use crate::error::EngineError;
use crate::spill::SpillFile;
use batchgcd_bigint::Natural;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

type NatRx = Receiver<Natural>;
type NatTx = Sender<Natural>;

pub fn run(input: NatRx, tx: Sender<Collision>, cfg: &RunConfig) -> Result<(), EngineError> {
    product_tree_level(input, Vec::new(), tx, cfg.work_dir.clone())
}

fn product_tree_level(
    input: NatRx,
    mut spills: Vec<Arc<Mutex<SpillFile>>>,
    final_output: Sender<Collision>,
    work_dir: PathBuf,
) -> Result<(), EngineError> {
    let hold = match input.recv() {
        Ok(v) => v,
        Err(_) => return Ok(()), // nothing reached this level at all
    };
    let second = match input.recv() {
        Ok(v) => v,
        Err(_) => {
            if spills.is_empty() {
                // The whole batch had exactly one modulus; no pair, no tree.
                return Ok(());
            }
            // Exactly one value reached this level: it's already the root.
            let (result_tx, result_rx) = bounded::<Natural>(1);
            let _ = result_tx.send(hold);
            drop(result_tx);
            return remainder_tree_level(result_rx, spills, final_output);
        }
    };

    let spill = Arc::new(Mutex::new(SpillFile::new(&work_dir)?));
    {
        let mut s = spill.lock().expect("spill mutex poisoned");
        s.write(&hold)?;
        s.write(&second)?;
    }
    spills.push(Arc::clone(&spill));

    let (result_tx, result_rx): (NatTx, NatRx) = bounded(2);
    let next_output = final_output.clone();
    let next_work_dir = work_dir.clone();
    let handle = std::thread::spawn(move || product_tree_level(result_rx, spills, next_output, next_work_dir));

    let _ = result_tx.send(Natural::mul(&hold, &second));

    let mut held: Option<Natural> = None;
    let mut write_err: Option<EngineError> = None;
    for m in input.iter() {
        if write_err.is_some() {
            continue;
        }
        if let Err(e) = spill.lock().expect("spill mutex poisoned").write(&m) {
            write_err = Some(e);
            continue;
        }
        match held.take() {
            None => held = Some(m),
            Some(prev) => {
                let _ = result_tx.send(Natural::mul(&prev, &m));
            }
        }
    }
    if let Some(h) = held {
        // Odd trailing leaf: forwarded untouched, same as the in-memory tree.
        let _ = result_tx.send(h);
    }
    drop(result_tx);

    let joined = handle
        .join()
        .unwrap_or_else(|_| Err(EngineError::SpillInvariant("product-tree worker thread panicked".into())));
    match write_err {
        Some(e) => Err(e),
        None => joined,
    }
}

fn remainder_tree_level(
    input: NatRx,
    mut spills: Vec<Arc<Mutex<SpillFile>>>,
    final_output: Sender<Collision>,
) -> Result<(), EngineError> {
    let this_level = spills.pop().expect("remainder phase reached with no levels left to consume");
    this_level.lock().expect("spill mutex poisoned").rewind_for_reading()?;

    if spills.is_empty() {
        return remainder_tree_final(input, this_level, final_output);
    }

    let (result_tx, result_rx): (NatTx, NatRx) = bounded(2);
    let next_output = final_output.clone();
    let handle = std::thread::spawn(move || remainder_tree_level(result_rx, spills, next_output));

    let mut read_err: Option<EngineError> = None;
    'outer: for y in input.iter() {
        let (x1, x2) = {
            let mut s = this_level.lock().expect("spill mutex poisoned");
            let x1 = match s.read_next() {
                Ok(Some(v)) => v,
                Ok(None) => {
                    read_err = Some(EngineError::SpillInvariant("expected a product, found none".into()));
                    break 'outer;
                }
                Err(e) => {
                    read_err = Some(e);
                    break 'outer;
                }
            };
            let x2 = match s.read_next() {
                Ok(v) => v,
                Err(e) => {
                    read_err = Some(e);
                    break 'outer;
                }
            };
            (x1, x2)
        };

        let mut x1 = x1;
        let sq = x1.square();
        x1.rem_into(&y, &sq);
        if result_tx.send(x1).is_err() {
            break 'outer;
        }
        if let Some(mut x2) = x2 {
            let sq = x2.square();
            x2.rem_into(&y, &sq);
            if result_tx.send(x2).is_err() {
                break 'outer;
            }
        }
    }
    drop(result_tx);

    if read_err.is_none() {
        if let Err(e) = this_level.lock().expect("spill mutex poisoned").assert_fully_consumed() {
            read_err = Some(e);
        }
    }

    let joined = handle
        .join()
        .unwrap_or_else(|_| Err(EngineError::SpillInvariant("remainder-tree worker thread panicked".into())));
    match read_err {
        Some(e) => Err(e),
        None => joined,
    }
}

/// Level 0: reads back the original moduli (not intermediate products) and
/// does the actual factor extraction.
fn remainder_tree_final(
    input: NatRx,
    moduli_spill: Arc<Mutex<SpillFile>>,
    final_output: Sender<Collision>,
) -> Result<(), EngineError> {
    let mut warned_odd = false;
    let mut err: Option<EngineError> = None;
    'outer: for y in input.iter() {
        for _ in 0..2 {
            let modulus = {
                let mut s = moduli_spill.lock().expect("spill mutex poisoned");
                match s.read_next() {
                    Ok(Some(v)) => v,
                    Ok(None) => {
                        if !warned_odd {
                            tracing::warn!("odd number of moduli; final modulus has no sibling to reduce against");
                            warned_odd = true;
                        }
                        break;
                    }
                    Err(e) => {
                        err = Some(e);
                        break;
                    }
                }
            };
            if err.is_some() {
                break 'outer;
            }

            let msq = modulus.square();
            let z = Natural::rem(&y, &msq);
            let z = Natural::quo(&z, &modulus);
            let g = Natural::gcd(&z, &modulus);
            if g.bit_len() == 1 || g.cmp(&modulus) == Ordering::Equal {
                continue;
            }
            let q = Natural::quo(&modulus, &g);
            if final_output.send(Collision::factorization(modulus.clone(), g, q)).is_err() {
                return Ok(());
            }
        }
    }

    let s = moduli_spill.lock().expect("spill mutex poisoned");
    match err {
        Some(e) => Err(e),
        None => s.assert_fully_consumed(),
    }
}
