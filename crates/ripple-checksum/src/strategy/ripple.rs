//! Ripple update: re-hash only the replaced block, then propagate forward
//! using checksums and lengths alone.
//!
//! For every `i > k` the block itself did not change, so its own checksum can
//! be pulled out of the stale pair `(old[i-1], old[i])` with `extract` and
//! folded onto the repaired `new[i-1]` with `combine`. Block content past `k`
//! is never read.

use crate::algebra::ChecksumAlgebra;
use crate::sequence::ContentSource;
use crate::strategy::{check_bounds, UpdateReport};
use crate::table::ChecksumTable;
use ripple_core::{RippleResult, StrategyKind};

/// Repair `table[index..]` after block `index` was replaced.
///
/// Reads the content of block `index` only. Each later entry costs one
/// `extract` and one `combine` for that block's length.
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

    let content = source.read(index)?;
    let bytes_hashed = content.len() as u64;
    let block = algebra.checksum(content);

    // Stale value of the entry just rewritten; extraction must see the
    // pre-update neighbour.
    let mut stale_prev = entries[index];
    entries[index] = if index == 0 {
        block
    } else {
        algebra.combine(entries[index - 1], block, source.byte_len(index)?)
    };

    for i in index + 1..count {
        let stale = entries[i];
        let len = source.byte_len(i)?;
        let own = algebra.extract(stale_prev, stale, len);
        entries[i] = algebra.combine(entries[i - 1], own, len);
        stale_prev = stale;
    }

    Ok(UpdateReport {
        strategy: StrategyKind::Ripple,
        index,
        entries_rewritten: count - index,
        bytes_hashed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Crc32;
    use crate::sequence::{BlockSequence, CountingSource};

    #[test]
    fn single_block_sequence() {
        let algebra = Crc32::new();
        let mut seq = BlockSequence::new(vec![b"lonely".to_vec()]);
        let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();

        seq.replace(0, b"company".to_vec()).unwrap();
        let counting = CountingSource::new(&seq);
        let report = update(&algebra, &counting, &mut table, 0).unwrap();

        assert_eq!(report.entries_rewritten, 1);
        assert_eq!(counting.indices_read(), vec![0]);
        table.verify(&algebra, &seq).unwrap();
    }

    #[test]
    fn block_length_may_change() {
        let algebra = Crc32::new();
        let mut seq = BlockSequence::new(vec![b"aa".to_vec(), b"bbbb".to_vec(), b"c".to_vec()]);
        let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();

        seq.replace(1, b"a much longer middle block".to_vec()).unwrap();
        update(&algebra, &seq, &mut table, 1).unwrap();
        table.verify(&algebra, &seq).unwrap();

        seq.replace(1, Vec::new()).unwrap();
        update(&algebra, &seq, &mut table, 1).unwrap();
        table.verify(&algebra, &seq).unwrap();
    }

    #[test]
    fn only_hashes_replaced_block() {
        let algebra = Crc32::new();
        let mut seq = BlockSequence::new((0..6u8).map(|i| vec![i; 100]));
        let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();

        seq.replace(3, vec![0xffu8; 40]).unwrap();
        let report = update(&algebra, &seq, &mut table, 3).unwrap();
        assert_eq!(report.bytes_hashed, 40);
        assert_eq!(report.entries_rewritten, 3);
    }
}
