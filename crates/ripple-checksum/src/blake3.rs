//! BLAKE3 as a plain checksum function
//!
//! BLAKE3 has no known combine/extract identities, so it implements only
//! [`ChecksumFunction`]. Tables over it can be built with
//! `ChecksumTable::rebuild_direct` and updated with the Trivial strategy;
//! Ripple and Naive need a [`ChecksumAlgebra`](crate::ChecksumAlgebra).

use crate::algebra::ChecksumFunction;

/// BLAKE3 digest of a byte string (32 bytes)
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3;

impl ChecksumFunction for Blake3 {
    type Value = ::blake3::Hash;

    fn checksum(&self, data: &[u8]) -> ::blake3::Hash {
        ::blake3::hash(data)
    }
}
