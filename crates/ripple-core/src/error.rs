use thiserror::Error;

pub type RippleResult<T> = Result<T, RippleError>;

/// Errors surfaced by the checksum core and the harness.
///
/// A wrong per-block length handed to `combine`/`extract` is not an error
/// here: the algebra cannot detect it and returns a well-defined but wrong
/// checksum. Callers must pass true lengths.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("index {index} out of range for sequence of {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("byte offset {offset} out of range for sequence of {total} bytes")]
    OffsetOutOfRange { offset: u64, total: u64 },

    #[error("checksum table has {table} entries but sequence has {blocks} blocks")]
    LengthMismatch { table: usize, blocks: usize },

    #[error("checksum table inconsistent at index {index}")]
    InconsistentTable { index: usize },

    #[error("unknown strategy '{0}' (expected ripple, naive, or trivial)")]
    UnknownStrategy(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
