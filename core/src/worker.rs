//! Rayon pool construction, shared by the engines that parallelize over
//! row ranges or tree levels.

use crate::error::EngineError;

pub fn build_pool(threads: usize) -> Result<rayon::ThreadPool, EngineError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| EngineError::Pool(e.to_string()))
}
