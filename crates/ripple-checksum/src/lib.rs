//! ripple-checksum: cumulative checksum tables over block sequences
//!
//! # Overview
//! - `algebra`: CRC-32 `combine`/`extract` over GF(2), with a memoized shift cache
//! - `blake3`: non-algebraic checksum function (direct hashing only)
//! - `sequence`: ordered byte blocks and the `ContentSource` seam
//! - `table`: cumulative checksums, full rebuild, verification
//! - `strategy`: Ripple, Naive and Trivial updates after one block is replaced

pub mod algebra;
pub mod blake3;
pub mod sequence;
pub mod strategy;
pub mod table;

pub use algebra::{ChecksumAlgebra, ChecksumFunction, Crc32, Crc32Value};
pub use sequence::{Block, BlockSequence, ContentSource, CountingSource};
pub use strategy::{apply, naive, ripple, trivial, UpdateReport};
pub use table::ChecksumTable;

pub use ripple_core::{RippleError, RippleResult, StrategyKind};
