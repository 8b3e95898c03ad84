//! Naive update: re-hash every block from the replaced one to the end

use crate::algebra::ChecksumAlgebra;
use crate::sequence::ContentSource;
use crate::strategy::{check_bounds, UpdateReport};
use crate::table::ChecksumTable;
use ripple_core::{RippleResult, StrategyKind};

/// For each `i >= index`, `table[i] = combine(table[i-1], H(block[i]), len_i)`.
///
/// Reads the content of every block from `index` onward.
pub fn update<A, S>(
    algebra: &A,
    source: &S,
    table: &mut ChecksumTable<A::Value>,
    index: usize,
) -> RippleResult<UpdateReport>
where
    A: ChecksumAlgebra,
    S: ContentSource + ?Sized,
{
    let count = check_bounds(source, table, index)?;
    let entries = table.entries_mut();
    let mut bytes_hashed = 0u64;

    for i in index..count {
        let content = source.read(i)?;
        bytes_hashed += content.len() as u64;
        let block = algebra.checksum(content);
        entries[i] = if i == 0 {
            block
        } else {
            algebra.combine(entries[i - 1], block, source.byte_len(i)?)
        };
    }

    Ok(UpdateReport {
        strategy: StrategyKind::Naive,
        index,
        entries_rewritten: count - index,
        bytes_hashed,
    })
}
