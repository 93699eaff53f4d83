//! Boot-time pool sizing.
//!
//! Everything below `BOOT_PAGE_TABLE_BYTES + LOW_RESERVED_BYTES` is owned by
//! firmware, the kernel image and the loader's page tables. The rest is cut
//! into whole pages and split in half between the kernel and user pools:
//!
//! ```text
//! 0x0000_0000 ┌──────────────────────────┐
//!             │ low 1 MiB                │
//! 0x0010_0000 ├──────────────────────────┤
//!             │ boot page directory +    │
//!             │ 255 page tables          │
//! 0x0020_0000 ├──────────────────────────┤ ← kernel pool (floor(pages / 2))
//!             │                          │
//!             ├──────────────────────────┤ ← user pool (the rest)
//!             │                          │
//!             └──────────────────────────┘
//! ```
//!
//! Each pool is tracked by `pages / 8` bitmap bytes. Frames past the last
//! whole byte, and bytes past the last whole page, are never used.

use kernel_info::memory::{BOOT_PAGE_TABLE_BYTES, KERNEL_HEAP_MAX_PAGES, LOW_RESERVED_BYTES};
use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress};

/// Physical pool placement and bitmap sizes derived from the memory size.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryLayout {
    /// Physical memory reported by the loader, in bytes.
    pub total_bytes: u32,
    pub kernel_pool_base: PhysicalAddress,
    pub kernel_pool_pages: u32,
    pub user_pool_base: PhysicalAddress,
    pub user_pool_pages: u32,
}

impl MemoryLayout {
    /// Bytes below the first pool frame.
    pub const RESERVED_BYTES: u32 = BOOT_PAGE_TABLE_BYTES + LOW_RESERVED_BYTES;

    /// Split `total_bytes` of physical memory into the two pools.
    ///
    /// # Panics
    /// If `total_bytes` does not even cover the reserved region. The kernel
    /// cannot boot on such a machine.
    #[must_use]
    pub const fn from_total(total_bytes: u32) -> Self {
        assert!(
            total_bytes >= Self::RESERVED_BYTES,
            "physical memory smaller than the reserved low region"
        );
        let free_pages = (total_bytes - Self::RESERVED_BYTES) / PAGE_SIZE;
        let kernel_pool_pages = free_pages / 2;
        let user_pool_pages = free_pages - kernel_pool_pages;

        let kernel_pool_base = PhysicalAddress::new(Self::RESERVED_BYTES);
        let user_pool_base =
            PhysicalAddress::new(Self::RESERVED_BYTES + kernel_pool_pages * PAGE_SIZE);

        Self {
            total_bytes,
            kernel_pool_base,
            kernel_pool_pages,
            user_pool_base,
            user_pool_pages,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kernel_pool_bytes(&self) -> u32 {
        self.kernel_pool_pages * PAGE_SIZE
    }

    #[inline]
    #[must_use]
    pub const fn user_pool_bytes(&self) -> u32 {
        self.user_pool_pages * PAGE_SIZE
    }

    #[inline]
    #[must_use]
    pub const fn kernel_bitmap_bytes(&self) -> usize {
        (self.kernel_pool_pages / 8) as usize
    }

    #[inline]
    #[must_use]
    pub const fn user_bitmap_bytes(&self) -> usize {
        (self.user_pool_pages / 8) as usize
    }

    /// The kernel heap tracks as many pages as the kernel pool, but never
    /// reaches into the self-map window.
    #[inline]
    #[must_use]
    pub const fn kernel_vaddr_bitmap_bytes(&self) -> usize {
        let pages = if self.kernel_pool_pages < KERNEL_HEAP_MAX_PAGES {
            self.kernel_pool_pages
        } else {
            KERNEL_HEAP_MAX_PAGES
        };
        (pages / 8) as usize
    }

    /// Storage needed for all three bitmaps (kernel pool, user pool, kernel
    /// virtual space, laid out back to back in that order).
    #[inline]
    #[must_use]
    pub const fn bitmap_bytes(&self) -> usize {
        self.kernel_bitmap_bytes() + self.user_bitmap_bytes() + self.kernel_vaddr_bitmap_bytes()
    }
}
