//! Checksum functions and the CRC-32 combine/extract algebra.
//!
//! For the reflected CRC-32 used by zlib (finalized values):
//! ```text
//! crc(A || B) = x^(8*len(B)) * crc(A) mod P  XOR  crc(B)
//! ```
//! so `combine` and `extract` differ only in which side of the XOR is known.
//! The multiplication by `x^(8*len(B))` is a 32x32 matrix over GF(2). It
//! depends on `len(B)` alone, is built by square-and-multiply, and is cached
//! per length in a [`ShiftCache`]. Neither operation looks at `len(A)` or at
//! any bytes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;

/// A function from byte strings to fixed-width checksum values.
pub trait ChecksumFunction {
    type Value: Copy + Eq + Debug;

    /// Checksum `data` directly.
    fn checksum(&self, data: &[u8]) -> Self::Value;

    /// Checksum of the empty string.
    fn empty(&self) -> Self::Value {
        self.checksum(&[])
    }
}

/// A checksum function whose values compose over concatenation.
///
/// Both operations trust `len_b`. A length that does not match the real
/// byte length of `B` yields a well-defined but wrong value, and there is no
/// way to detect that here.
pub trait ChecksumAlgebra: ChecksumFunction {
    /// `H(A || B)` from `H(A)`, `H(B)` and `len(B)`.
    fn combine(&self, crc_a: Self::Value, crc_b: Self::Value, len_b: u64) -> Self::Value;

    /// `H(B)` from `H(A)`, `H(A || B)` and `len(B)`.
    ///
    /// `crc_ab` must really be the checksum of `A || B` for some `B` of
    /// length `len_b`; an inconsistent pair still returns a value.
    fn extract(&self, crc_a: Self::Value, crc_ab: Self::Value, len_b: u64) -> Self::Value;
}

// ── CRC-32 values ─────────────────────────────────────────────────────────────

/// A finalized CRC-32 (IEEE) checksum, displayed as 8 hex chars
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crc32Value(u32);

impl Crc32Value {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Crc32Value {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Crc32Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:08x}", self.0))
    }
}

impl fmt::Debug for Crc32Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crc32Value({:08x})", self.0)
    }
}

// ── GF(2) matrices ────────────────────────────────────────────────────────────

/// Reflected CRC-32 (IEEE 802.3) polynomial.
const CRC32_POLY: u32 = 0xEDB8_8320;

/// A 32x32 GF(2) matrix stored as 32 columns.
///
/// Column `i` is the image of the basis vector with only bit `i` set.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Gf2Matrix32([u32; 32]);

impl Gf2Matrix32 {
    const fn identity() -> Self {
        let mut m = [0u32; 32];
        let mut i = 0;
        while i < 32 {
            m[i] = 1 << i;
            i += 1;
        }
        Self(m)
    }

    const fn mul_vec(&self, vec: u32) -> u32 {
        let mut result = 0u32;
        let mut i = 0;
        while i < 32 {
            if vec & (1 << i) != 0 {
                result ^= self.0[i];
            }
            i += 1;
        }
        result
    }

    const fn mul_mat(&self, other: &Self) -> Self {
        let mut result = [0u32; 32];
        let mut i = 0;
        while i < 32 {
            result[i] = self.mul_vec(other.0[i]);
            i += 1;
        }
        Self(result)
    }

    const fn square(&self) -> Self {
        self.mul_mat(self)
    }
}

/// Effect on a reflected CRC register of feeding one zero bit.
const fn shift1_matrix(poly: u32) -> Gf2Matrix32 {
    let mut m = [0u32; 32];
    m[0] = poly;
    let mut j = 1;
    while j < 32 {
        m[j] = 1 << (j - 1);
        j += 1;
    }
    Gf2Matrix32(m)
}

/// Effect of feeding one zero byte.
const SHIFT8: Gf2Matrix32 = shift1_matrix(CRC32_POLY).square().square().square();

/// Build the operator for `x^(8*len)` by square-and-multiply.
fn shift_matrix(len: u64) -> Gf2Matrix32 {
    let mut result = Gf2Matrix32::identity();
    let mut power = SHIFT8;
    let mut remaining = len;
    while remaining > 0 {
        if remaining & 1 != 0 {
            result = result.mul_mat(&power);
        }
        remaining >>= 1;
        if remaining > 0 {
            power = power.square();
        }
    }
    result
}

/// Memoized shift operators keyed by byte length.
///
/// Entries are never invalidated: an operator depends only on the length and
/// the polynomial.
#[derive(Default)]
pub struct ShiftCache {
    entries: RwLock<HashMap<u64, Gf2Matrix32>>,
}

impl ShiftCache {
    fn shift(&self, value: u32, len: u64) -> u32 {
        if len == 0 {
            return value;
        }
        if let Some(matrix) = self.entries.read().get(&len) {
            return matrix.mul_vec(value);
        }
        let matrix = shift_matrix(len);
        self.entries.write().insert(len, matrix);
        matrix.mul_vec(value)
    }

    /// Number of distinct lengths cached so far
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl fmt::Debug for ShiftCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShiftCache").field("lengths", &self.len()).finish()
    }
}

// ── CRC-32 algebra ────────────────────────────────────────────────────────────

/// CRC-32 (IEEE, as computed by zlib's `crc32`) with combine/extract.
///
/// Safe to share between threads; the shift cache is internally locked.
#[derive(Debug, Default)]
pub struct Crc32 {
    cache: ShiftCache,
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized shift operators built so far
    pub fn cache(&self) -> &ShiftCache {
        &self.cache
    }
}

impl ChecksumFunction for Crc32 {
    type Value = Crc32Value;

    fn checksum(&self, data: &[u8]) -> Crc32Value {
        Crc32Value(crc32fast::hash(data))
    }

    fn empty(&self) -> Crc32Value {
        Crc32Value(0)
    }
}

impl ChecksumAlgebra for Crc32 {
    fn combine(&self, crc_a: Crc32Value, crc_b: Crc32Value, len_b: u64) -> Crc32Value {
        Crc32Value(self.cache.shift(crc_a.0, len_b) ^ crc_b.0)
    }

    fn extract(&self, crc_a: Crc32Value, crc_ab: Crc32Value, len_b: u64) -> Crc32Value {
        Crc32Value(self.cache.shift(crc_a.0, len_b) ^ crc_ab.0)
    }
}
