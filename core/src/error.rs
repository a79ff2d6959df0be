use thiserror::Error;

/// Fatal errors surfaced by an engine. None of these are retried; the
/// caller (the CLI) is expected to log and exit non-zero.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    Pool(String),

    #[error("spill file invariant violated: {0}")]
    SpillInvariant(String),

    #[error("self-test failed for emitted factorization of {0}")]
    SelfTestFailed(String),
}
