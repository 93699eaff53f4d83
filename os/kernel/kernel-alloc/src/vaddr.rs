//! Kernel virtual address space.
//!
//! One bit per virtual page of the kernel heap, which starts at
//! [`KERNEL_HEAP_START`](kernel_info::memory::KERNEL_HEAP_START). Requests are
//! served first-fit as contiguous page runs. Reservations are permanent.
//!
//! User address spaces have no allocator yet; see
//! [`MemoryManager::allocate_user_pages`](crate::mm::MemoryManager::allocate_user_pages).

use crate::bitmap::Bitmap;
use kernel_info::memory::SELF_MAP_WINDOW;
use kernel_memory_addresses::{PAGE_SIZE, VirtualAddress, VirtualPage};
use log::{trace, warn};

/// A bitmap-tracked range of virtual pages.
pub struct VirtualSpace<'a> {
    base: VirtualPage,
    bitmap: Bitmap<'a>,
}

impl<'a> VirtualSpace<'a> {
    /// Create a space of `bitmap.len()` pages starting at `base`; `bitmap` is cleared.
    ///
    /// # Panics
    /// If the space would reach into the self-map window.
    pub fn new(base: VirtualPage, mut bitmap: Bitmap<'a>) -> Self {
        let limit = SELF_MAP_WINDOW.as_u32().saturating_sub(base.base().as_u32()) / PAGE_SIZE;
        assert!(
            bitmap.len() <= limit as usize,
            "{} virtual pages from {base} overlap the self-map window",
            bitmap.len()
        );
        bitmap.init();
        Self { base, bitmap }
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> VirtualPage {
        self.base
    }

    /// Number of pages tracked.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.bitmap.len()
    }

    /// Number of pages reserved so far.
    #[inline]
    #[must_use]
    pub fn reserved(&self) -> usize {
        self.bitmap.count_set()
    }

    #[inline]
    #[must_use]
    pub const fn bitmap(&self) -> &Bitmap<'a> {
        &self.bitmap
    }

    /// Bitmap index of `va`, if inside the space.
    fn index_of(&self, va: VirtualAddress) -> Option<usize> {
        let delta = va.as_u32().checked_sub(self.base.base().as_u32())?;
        let index = (delta / PAGE_SIZE) as usize;
        (index < self.capacity()).then_some(index)
    }

    /// Whether `va` lies inside the space.
    #[inline]
    #[must_use]
    pub fn contains(&self, va: VirtualAddress) -> bool {
        self.index_of(va).is_some()
    }

    /// Whether `page` has been handed out. Pages outside the space are not.
    #[must_use]
    pub fn is_reserved(&self, page: VirtualPage) -> bool {
        self.index_of(page.base())
            .is_some_and(|index| self.bitmap.test(index))
    }

    /// Reserve the lowest run of `count` free pages.
    pub fn allocate_pages(&mut self, count: u32) -> Option<VirtualPage> {
        let Some(index) = self.bitmap.scan(count as usize) else {
            warn!(
                "No run of {count} free pages in kernel virtual space ({}/{} reserved)",
                self.reserved(),
                self.capacity()
            );
            return None;
        };
        self.bitmap.set(index, count as usize, true);

        #[allow(clippy::cast_possible_truncation)]
        let start = self.base.add_pages(index as u32);
        trace!("Reserved {count} virtual pages at {start}");
        Some(start)
    }
}
