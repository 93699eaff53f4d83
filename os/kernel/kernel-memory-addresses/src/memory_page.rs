use crate::{MemoryAddress, PAGE_OFFSET_MASK, PAGE_SHIFT, PAGE_SIZE};
use core::fmt;

/// A page base address (lower [`PAGE_SHIFT`] bits are zero).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MemoryPage {
    value: u32,
}

impl MemoryPage {
    /// Create from an address, aligning down to the page boundary.
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: MemoryAddress) -> Self {
        Self {
            value: addr.as_u32() & !PAGE_OFFSET_MASK,
        }
    }

    /// Create from a raw value that must already be aligned.
    /// Panics in debug if unaligned (no runtime cost in release).
    #[inline]
    #[must_use]
    pub const fn new_aligned(addr: MemoryAddress) -> Self {
        debug_assert!(addr.is_page_aligned(), "unaligned page address");
        Self {
            value: addr.as_u32(),
        }
    }

    /// Page with the given page number (`base >> 12`).
    #[inline]
    #[must_use]
    pub const fn from_number(number: u32) -> Self {
        Self {
            value: number << PAGE_SHIFT,
        }
    }

    /// Return the base as `MemoryAddress`.
    #[inline]
    #[must_use]
    pub const fn base(self) -> MemoryAddress {
        MemoryAddress::new(self.value)
    }

    /// Page number, i.e. the base shifted right by [`PAGE_SHIFT`].
    #[inline]
    #[must_use]
    pub const fn number(self) -> u32 {
        self.value >> PAGE_SHIFT
    }

    /// Combine with an in-page offset to form a full address.
    #[inline]
    #[must_use]
    pub const fn join(self, offset: u32) -> MemoryAddress {
        debug_assert!(offset < PAGE_SIZE, "offset must be < page size");
        MemoryAddress::new(self.value | (offset & PAGE_OFFSET_MASK))
    }

    /// The page `n` pages above this one.
    #[inline]
    #[must_use]
    pub const fn add_pages(self, n: u32) -> Self {
        Self {
            value: self.value + n * PAGE_SIZE,
        }
    }
}

impl fmt::Display for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}/4K", self.value)
    }
}

impl fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryPage(0x{:08X})", self.value)
    }
}
