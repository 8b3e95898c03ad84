//! Cumulative checksum tables
//!
//! `table[i]` is the checksum of blocks `0..=i` joined. Tables are only
//! created by a full scan ([`ChecksumTable::rebuild`]); afterwards the update
//! strategies keep them consistent.

use tracing::debug;

use crate::algebra::{ChecksumAlgebra, ChecksumFunction};
use crate::sequence::ContentSource;
use ripple_core::{RippleError, RippleResult};

/// Checksums of every prefix of a block sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumTable<V> {
    entries: Vec<V>,
}

impl<V: Copy + Eq> ChecksumTable<V> {
    /// Full forward scan: hash each block once and fold with `combine`.
    pub fn rebuild<A, S>(algebra: &A, source: &S) -> RippleResult<Self>
    where
        A: ChecksumAlgebra<Value = V>,
        S: ContentSource + ?Sized,
    {
        let count = source.block_count();
        let mut entries: Vec<V> = Vec::with_capacity(count);
        for index in 0..count {
            let block = algebra.checksum(source.read(index)?);
            let entry = match entries.last() {
                None => block,
                Some(&prev) => algebra.combine(prev, block, source.byte_len(index)?),
            };
            entries.push(entry);
        }
        debug!(blocks = count, "rebuilt checksum table");
        Ok(Self { entries })
    }

    /// Build by hashing each joined prefix directly, for functions without
    /// an algebra. Quadratic in the number of blocks.
    pub fn rebuild_direct<F, S>(function: &F, source: &S) -> RippleResult<Self>
    where
        F: ChecksumFunction<Value = V>,
        S: ContentSource + ?Sized,
    {
        let count = source.block_count();
        let mut prefix = Vec::new();
        let mut entries: Vec<V> = Vec::with_capacity(count);
        for index in 0..count {
            prefix.extend_from_slice(source.read(index)?);
            entries.push(function.checksum(&prefix));
        }
        debug!(blocks = count, "rebuilt checksum table by direct hashing");
        Ok(Self { entries })
    }

    /// Checksum of blocks `0..=index`
    pub fn get(&self, index: usize) -> RippleResult<V> {
        self.entries
            .get(index)
            .copied()
            .ok_or(RippleError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[V] {
        &self.entries
    }

    /// Checksum of the whole sequence, `None` when it has no blocks
    pub fn total(&self) -> Option<V> {
        self.entries.last().copied()
    }

    /// Rebuild from `source` and compare entry by entry.
    ///
    /// This is the explicit consistency check; update strategies never run it
    /// on their own.
    pub fn verify<A, S>(&self, algebra: &A, source: &S) -> RippleResult<()>
    where
        A: ChecksumAlgebra<Value = V>,
        S: ContentSource + ?Sized,
    {
        let expected = Self::rebuild(algebra, source)?;
        self.compare(&expected)
    }

    /// Like [`verify`](Self::verify), against a direct-hash rebuild.
    pub fn verify_direct<F, S>(&self, function: &F, source: &S) -> RippleResult<()>
    where
        F: ChecksumFunction<Value = V>,
        S: ContentSource + ?Sized,
    {
        let expected = Self::rebuild_direct(function, source)?;
        self.compare(&expected)
    }

    fn compare(&self, expected: &Self) -> RippleResult<()> {
        if self.entries.len() != expected.entries.len() {
            return Err(RippleError::LengthMismatch {
                table: self.entries.len(),
                blocks: expected.entries.len(),
            });
        }
        match self
            .entries
            .iter()
            .zip(&expected.entries)
            .position(|(have, want)| have != want)
        {
            Some(index) => {
                debug!(index, "checksum table inconsistent");
                Err(RippleError::InconsistentTable { index })
            }
            None => Ok(()),
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [V] {
        &mut self.entries
    }
}
