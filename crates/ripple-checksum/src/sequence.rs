//! Ordered block sequences and the content-source seam
//!
//! A [`BlockSequence`] owns its blocks; strategies only see it through
//! [`ContentSource`], which separates cheap length queries from content
//! reads. [`CountingSource`] records every content read so callers can check
//! how much raw data a strategy touched.

use bytes::Bytes;
use std::cell::{Cell, RefCell};

use ripple_core::{RippleError, RippleResult};

/// One immutable block of bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    content: Bytes,
}

impl Block {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Block length in bytes
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Ordered blocks, indexed `0..len()`.
///
/// The block count is fixed at construction; blocks can only be replaced in
/// place. Replacing a block does not touch any checksum table; the caller
/// runs an update strategy afterwards.
#[derive(Debug, Clone, Default)]
pub struct BlockSequence {
    blocks: Vec<Block>,
}

impl BlockSequence {
    pub fn new<I, B>(blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            blocks: blocks.into_iter().map(Block::new).collect(),
        }
    }

    /// Split `data` into blocks of `block_size` bytes (the last may be shorter).
    pub fn from_chunks(data: &[u8], block_size: usize) -> RippleResult<Self> {
        if block_size == 0 {
            return Err(RippleError::Config("block size must be at least 1".into()));
        }
        let data = Bytes::copy_from_slice(data);
        let blocks = (0..data.len())
            .step_by(block_size)
            .map(|start| Block {
                content: data.slice(start..(start + block_size).min(data.len())),
            })
            .collect();
        Ok(Self { blocks })
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> RippleResult<&Block> {
        self.blocks.get(index).ok_or(RippleError::IndexOutOfRange {
            index,
            len: self.blocks.len(),
        })
    }

    /// Length of block `index` in bytes
    pub fn byte_len(&self, index: usize) -> RippleResult<u64> {
        self.get(index).map(Block::len)
    }

    /// Sum of all block lengths
    pub fn total_bytes(&self) -> u64 {
        self.blocks.iter().map(Block::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// All block contents joined in order
    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_bytes() as usize);
        for block in &self.blocks {
            out.extend_from_slice(block.content());
        }
        out
    }

    /// Replace block `index` wholesale, returning the previous length.
    pub fn replace(&mut self, index: usize, content: impl Into<Bytes>) -> RippleResult<u64> {
        let len = self.blocks.len();
        let slot = self
            .blocks
            .get_mut(index)
            .ok_or(RippleError::IndexOutOfRange { index, len })?;
        let previous = slot.len();
        *slot = Block::new(content);
        Ok(previous)
    }

    /// Map a byte offset in the joined content to `(block index, offset in block)`.
    pub fn locate(&self, offset: u64) -> RippleResult<(usize, usize)> {
        let mut start = 0u64;
        for (index, block) in self.blocks.iter().enumerate() {
            let end = start + block.len();
            if offset < end {
                return Ok((index, (offset - start) as usize));
            }
            start = end;
        }
        Err(RippleError::OffsetOutOfRange {
            offset,
            total: start,
        })
    }

    /// Overwrite the byte at `offset` by replacing its block with a patched copy.
    ///
    /// Returns the index of the replaced block, which is where the checksum
    /// table must be repaired from.
    pub fn modify_byte(&mut self, offset: u64, byte: u8) -> RippleResult<usize> {
        let (index, within) = self.locate(offset)?;
        let mut patched = self.blocks[index].content().to_vec();
        patched[within] = byte;
        self.replace(index, patched)?;
        Ok(index)
    }
}

/// Supplies block lengths and contents to the update strategies.
pub trait ContentSource {
    /// Number of blocks
    fn block_count(&self) -> usize;

    /// Length of block `index` in bytes, without reading its content
    fn byte_len(&self, index: usize) -> RippleResult<u64>;

    /// Raw content of block `index`
    fn read(&self, index: usize) -> RippleResult<&[u8]>;
}

impl ContentSource for BlockSequence {
    fn block_count(&self) -> usize {
        self.len()
    }

    fn byte_len(&self, index: usize) -> RippleResult<u64> {
        BlockSequence::byte_len(self, index)
    }

    fn read(&self, index: usize) -> RippleResult<&[u8]> {
        self.get(index).map(Block::content)
    }
}

/// A [`ContentSource`] wrapper that records every content read.
///
/// Length queries pass through uncounted.
#[derive(Debug)]
pub struct CountingSource<'a, S: ?Sized> {
    inner: &'a S,
    reads: RefCell<Vec<usize>>,
    bytes_read: Cell<u64>,
}

impl<'a, S: ContentSource + ?Sized> CountingSource<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self {
            inner,
            reads: RefCell::new(Vec::new()),
            bytes_read: Cell::new(0),
        }
    }

    /// Number of content reads so far
    pub fn read_count(&self) -> usize {
        self.reads.borrow().len()
    }

    /// Indices read so far, in call order
    pub fn indices_read(&self) -> Vec<usize> {
        self.reads.borrow().clone()
    }

    /// Total bytes returned by content reads
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.get()
    }

    pub fn reset(&self) {
        self.reads.borrow_mut().clear();
        self.bytes_read.set(0);
    }
}

impl<S: ContentSource + ?Sized> ContentSource for CountingSource<'_, S> {
    fn block_count(&self) -> usize {
        self.inner.block_count()
    }

    fn byte_len(&self, index: usize) -> RippleResult<u64> {
        self.inner.byte_len(index)
    }

    fn read(&self, index: usize) -> RippleResult<&[u8]> {
        let content = self.inner.read(index)?;
        self.reads.borrow_mut().push(index);
        self.bytes_read.set(self.bytes_read.get() + content.len() as u64);
        Ok(content)
    }
}
