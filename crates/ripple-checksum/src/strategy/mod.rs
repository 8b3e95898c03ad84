//! Update strategies: restore a checksum table after one block is replaced
//!
//! All three share one contract. Given a table that was consistent before
//! block `k` was replaced, they rewrite entries `k..n` so that every entry is
//! again the checksum of its prefix. Entries before `k` are never written.
//! No strategy verifies its own output; use `ChecksumTable::verify` for that.

pub mod naive;
pub mod ripple;
pub mod trivial;

use serde::Serialize;
use tracing::debug;

use crate::algebra::ChecksumAlgebra;
use crate::sequence::ContentSource;
use crate::table::ChecksumTable;
use ripple_core::{RippleError, RippleResult, StrategyKind};

/// What one strategy invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub strategy: StrategyKind,
    /// Index of the replaced block
    pub index: usize,
    /// Table entries written (always `n - index`)
    pub entries_rewritten: usize,
    /// Bytes fed to the checksum function
    pub bytes_hashed: u64,
}

/// Run the strategy named by `kind` after block `index` was replaced.
pub fn apply<A, S>(
    kind: StrategyKind,
    algebra: &A,
    source: &S,
    table: &mut ChecksumTable<A::Value>,
    index: usize,
) -> RippleResult<UpdateReport>
where
    A: ChecksumAlgebra,
    S: ContentSource + ?Sized,
{
    let report = match kind {
        StrategyKind::Ripple => ripple::update(algebra, source, table, index)?,
        StrategyKind::Naive => naive::update(algebra, source, table, index)?,
        StrategyKind::Trivial => trivial::update(algebra, source, table, index)?,
    };
    debug!(
        strategy = %report.strategy,
        index = report.index,
        entries = report.entries_rewritten,
        bytes_hashed = report.bytes_hashed,
        "checksum table updated"
    );
    Ok(report)
}

/// Shared preconditions: `index` names a block and the table is aligned.
fn check_bounds<V, S>(source: &S, table: &ChecksumTable<V>, index: usize) -> RippleResult<usize>
where
    V: Copy + Eq,
    S: ContentSource + ?Sized,
{
    let count = source.block_count();
    if index >= count {
        return Err(RippleError::IndexOutOfRange { index, len: count });
    }
    if table.len() != count {
        return Err(RippleError::LengthMismatch {
            table: table.len(),
            blocks: count,
        });
    }
    Ok(count)
}
