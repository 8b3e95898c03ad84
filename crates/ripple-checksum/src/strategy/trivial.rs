//! Trivial update: hash each affected prefix from scratch
//!
//! This is the definition of the table, so it is correct for any checksum
//! function, algebraic or not. It needs the bytes of every block up to the
//! last one, including those before the replaced index, and hashes
//! `sum(len(prefix_i))` bytes in total. Use it as an oracle.

use crate::algebra::ChecksumFunction;
use crate::sequence::ContentSource;
use crate::strategy::{check_bounds, UpdateReport};
use crate::table::ChecksumTable;
use ripple_core::{RippleResult, StrategyKind};

/// For each `i >= index`, `table[i] = H(block[0] || ... || block[i])`.
pub fn update<F, S>(
    function: &F,
    source: &S,
    table: &mut ChecksumTable<F::Value>,
    index: usize,
) -> RippleResult<UpdateReport>
where
    F: ChecksumFunction,
    S: ContentSource + ?Sized,
{
    let count = check_bounds(source, table, index)?;
    let entries = table.entries_mut();
    let mut prefix = Vec::new();
    let mut bytes_hashed = 0u64;

    for i in 0..count {
        prefix.extend_from_slice(source.read(i)?);
        if i >= index {
            entries[i] = function.checksum(&prefix);
            bytes_hashed += prefix.len() as u64;
        }
    }

    Ok(UpdateReport {
        strategy: StrategyKind::Trivial,
        index,
        entries_rewritten: count - index,
        bytes_hashed,
    })
}
