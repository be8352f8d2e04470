/// CPU-side storage of one software buffer object

use std::ptr::NonNull;
use strata_gfx::strata::driver::UsageHint;

/// Byte written into storage whose contents became undefined
pub const POISON: u8 = 0xCD;

/// Storage is kept in 16-byte words so mapped pointers suit any vector type
const WORD: usize = std::mem::size_of::<u128>();

/// Active mapping of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftMapping {
    pub offset: u64,
    pub length: u64,
    /// Mapped through a range call
    pub range: bool,
}

#[derive(Debug, Default)]
pub struct SoftBuffer {
    words: Vec<u128>,
    len: usize,
    usage: Option<UsageHint>,
    mapping: Option<SoftMapping>,
}

impl SoftBuffer {
    /// Name without storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the storage, seeded with `data` or poison
    pub fn allocate(&mut self, size: usize, data: Option<&[u8]>, usage: UsageHint) {
        self.words = poisoned_words(size);
        self.len = size;
        self.usage = Some(usage);
        if let Some(data) = data {
            self.bytes_mut().copy_from_slice(data);
        }
    }

    /// Swap in fresh poisoned storage of the same size
    pub fn orphan(&mut self) {
        self.words = poisoned_words(self.len);
    }

    /// Poison `[offset, offset + length)`
    pub fn invalidate(&mut self, offset: usize, length: usize) {
        self.bytes_mut()[offset..offset + length].fill(POISON);
    }

    pub fn is_allocated(&self) -> bool {
        self.usage.is_some()
    }

    pub fn usage(&self) -> Option<UsageHint> {
        self.usage
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn mapping(&self) -> Option<SoftMapping> {
        self.mapping
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn set_mapping(&mut self, mapping: Option<SoftMapping>) {
        self.mapping = mapping;
    }

    pub fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u128, u8>(&self.words)[..self.len]
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut bytemuck::cast_slice_mut::<u128, u8>(&mut self.words)[..len]
    }

    /// Pointer to byte `offset` of the storage
    ///
    /// Valid until the storage is reallocated, orphaned or dropped.
    pub fn pointer(&mut self, offset: usize) -> NonNull<u8> {
        let bytes = bytemuck::cast_slice_mut::<u128, u8>(&mut self.words);
        NonNull::new(bytes[offset..].as_mut_ptr()).unwrap_or(NonNull::dangling())
    }
}

fn poisoned_words(size: usize) -> Vec<u128> {
    vec![u128::from_ne_bytes([POISON; WORD]); size.div_ceil(WORD)]
}

#[cfg(test)]
#[path = "soft_buffer_tests.rs"]
mod tests;
