//! Run-time tuning knobs shared by every engine.

use std::path::PathBuf;

/// Default bound on the in-flight collision channel, matched to the CLI's
/// consumer being a single formatter writing to stdout/file.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Worker count for the rayon pool (pairwise, accumulator resolver
    /// fan-out, tree level parallelism).
    pub threads: usize,
    /// Bound on the `Collision` channel handed to an engine.
    pub channel_capacity: usize,
    /// Directory the low-memory engine spills product/remainder tree
    /// levels into. Each spill file is a `tempfile::NamedTempFile`, so it
    /// is unlinked automatically once dropped.
    pub work_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        RunConfig {
            threads,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            work_dir: std::env::temp_dir(),
        }
    }
}
