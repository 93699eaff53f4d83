//! The memory subsystem context.
//!
//! [`MemoryManager`] owns both frame pools, the kernel virtual space and the
//! MMU handle. It is built once at boot and passed by `&mut` to whoever
//! allocates, so a single owner is enforced by the borrow checker. Callers
//! running with interrupts enabled must wrap calls in an interrupt-disabled
//! section.

use crate::bitmap::Bitmap;
use crate::frame_alloc::FramePool;
use crate::layout::MemoryLayout;
use crate::vaddr::VirtualSpace;
use core::fmt;
use kernel_info::boot::TOTAL_MEMORY_BYTES_ADDR;
use kernel_info::memory::{
    KERNEL_HEAP_START, MAX_PAGES_PER_REQUEST, MEM_BITMAP_BASE, MEM_BITMAP_MAX_BYTES,
};
use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress, VirtualAddress};
use kernel_vmem::{AddressSpace, MapError, Mmu, PageEntryBits, PdEntry, PtEntry};
use log::{info, trace, warn};

/// Which physical pool backs an allocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PoolKind {
    Kernel,
    User,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kernel => f.write_str("kernel"),
            Self::User => f.write_str("user"),
        }
    }
}

/// Allocation failures. Exhaustion is final: nothing is ever freed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AllocError {
    #[error("no free virtual address range of the requested size")]
    NoFreeVirtualSpace,
    #[error("no free frame in the {pool} pool")]
    NoFreeFrame { pool: PoolKind },
    #[error("user-space virtual allocation is not supported")]
    UserSpaceUnsupported,
}

impl From<MapError> for AllocError {
    fn from(value: MapError) -> Self {
        match value {
            // Page tables always come from the kernel pool.
            MapError::OutOfMemory(_) => Self::NoFreeFrame {
                pool: PoolKind::Kernel,
            },
        }
    }
}

/// Page-granular allocator: virtual range, physical frames and mappings.
pub struct MemoryManager<'a, M: Mmu> {
    kernel_pool: FramePool<'a>,
    user_pool: FramePool<'a>,
    kernel_vaddr: VirtualSpace<'a>,
    mmu: M,
}

impl<M: Mmu> MemoryManager<'static, M> {
    /// Build the memory subsystem from the loader's hand-off.
    ///
    /// Reads the physical memory size from
    /// [`TOTAL_MEMORY_BYTES_ADDR`] and places the bitmaps at
    /// [`MEM_BITMAP_BASE`].
    ///
    /// # Safety
    /// - Paging must be on with the boot page tables (self-map included).
    /// - The loader must have stored the memory size at `0xB00`.
    /// - The bitmap region must be mapped and not used by anything else.
    ///   Call this at most once.
    ///
    /// # Panics
    /// If the bitmaps would not fit below the main thread's stack page.
    pub unsafe fn from_boot_info(mmu: M) -> Self {
        let total = unsafe { TOTAL_MEMORY_BYTES_ADDR.as_mut_ptr::<u32>().read_volatile() };
        let layout = MemoryLayout::from_total(total);
        let bytes = layout.bitmap_bytes();
        assert!(
            bytes <= MEM_BITMAP_MAX_BYTES as usize,
            "{bytes} bytes of allocator bitmaps exceed the {MEM_BITMAP_MAX_BYTES} reserved at {MEM_BITMAP_BASE}"
        );

        let storage =
            unsafe { core::slice::from_raw_parts_mut(MEM_BITMAP_BASE.as_mut_ptr::<u8>(), bytes) };
        Self::new(&layout, storage, mmu)
    }
}

impl<'a, M: Mmu> MemoryManager<'a, M> {
    /// Build the pools and the kernel virtual space described by `layout`.
    ///
    /// `storage` holds the three bitmaps back to back (kernel pool, user
    /// pool, kernel virtual space) and is cleared.
    ///
    /// # Panics
    /// If `storage` is shorter than [`MemoryLayout::bitmap_bytes`].
    pub fn new(layout: &MemoryLayout, storage: &'a mut [u8], mmu: M) -> Self {
        assert!(
            storage.len() >= layout.bitmap_bytes(),
            "bitmap storage too small: {} < {}",
            storage.len(),
            layout.bitmap_bytes()
        );

        info!(
            "Initializing memory pools for {} bytes of physical memory",
            layout.total_bytes
        );

        let (kernel_bits, rest) = storage.split_at_mut(layout.kernel_bitmap_bytes());
        let (user_bits, rest) = rest.split_at_mut(layout.user_bitmap_bytes());
        let (vaddr_bits, _) = rest.split_at_mut(layout.kernel_vaddr_bitmap_bytes());

        let kernel_pool = FramePool::new(
            "kernel",
            layout.kernel_pool_base,
            layout.kernel_pool_bytes(),
            Bitmap::new(kernel_bits),
        );
        let user_pool = FramePool::new(
            "user",
            layout.user_pool_base,
            layout.user_pool_bytes(),
            Bitmap::new(user_bits),
        );
        let kernel_vaddr = VirtualSpace::new(KERNEL_HEAP_START.page(), Bitmap::new(vaddr_bits));

        info!(
            "Kernel pool at {}, bitmap at {:p}",
            kernel_pool.base(),
            kernel_pool.bitmap().as_ptr()
        );
        info!(
            "User pool at {}, bitmap at {:p}",
            user_pool.base(),
            user_pool.bitmap().as_ptr()
        );
        info!(
            "Kernel heap at {}, {} pages, bitmap at {:p}",
            kernel_vaddr.base(),
            kernel_vaddr.capacity(),
            kernel_vaddr.bitmap().as_ptr()
        );

        Self {
            kernel_pool,
            user_pool,
            kernel_vaddr,
            mmu,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kernel_pool(&self) -> &FramePool<'a> {
        &self.kernel_pool
    }

    #[inline]
    #[must_use]
    pub const fn user_pool(&self) -> &FramePool<'a> {
        &self.user_pool
    }

    #[inline]
    #[must_use]
    pub const fn kernel_vaddr(&self) -> &VirtualSpace<'a> {
        &self.kernel_vaddr
    }

    #[inline]
    #[must_use]
    pub const fn mmu(&self) -> &M {
        &self.mmu
    }

    fn reserve_virtual(
        &mut self,
        pool: PoolKind,
        count: u32,
    ) -> Result<VirtualAddress, AllocError> {
        match pool {
            PoolKind::Kernel => self
                .kernel_vaddr
                .allocate_pages(count)
                .map(VirtualAddress::from)
                .ok_or(AllocError::NoFreeVirtualSpace),
            PoolKind::User => Err(AllocError::UserSpaceUnsupported),
        }
    }

    /// Allocate `count` contiguous virtual pages, each backed by a fresh
    /// frame from `pool`, and return the first address.
    ///
    /// A failure part way through keeps what was already reserved and
    /// mapped for this request. Nothing is ever reclaimed.
    ///
    /// # Errors
    /// - [`AllocError::NoFreeVirtualSpace`] if no run of `count` pages is free.
    /// - [`AllocError::NoFreeFrame`] if `pool` (or the kernel pool, for a new
    ///   page table) runs dry.
    /// - [`AllocError::UserSpaceUnsupported`] for [`PoolKind::User`].
    ///
    /// # Panics
    /// Unless `0 < count < 3840`.
    pub fn allocate_pages(
        &mut self,
        pool: PoolKind,
        count: u32,
    ) -> Result<VirtualAddress, AllocError> {
        assert!(
            count > 0 && count < MAX_PAGES_PER_REQUEST,
            "page count {count} outside 1..{MAX_PAGES_PER_REQUEST}"
        );

        let start = self.reserve_virtual(pool, count)?;
        let aspace = AddressSpace::new(&self.mmu);
        let flags = PageEntryBits::new_user_rw();

        for i in 0..count {
            let page = start.page().add_pages(i);
            let frame = match pool {
                PoolKind::Kernel => self.kernel_pool.allocate_frame(),
                PoolKind::User => self.user_pool.allocate_frame(),
            };
            let Some(frame) = frame else {
                warn!("Allocation of {count} pages stopped at {page}: {pool} pool exhausted");
                return Err(AllocError::NoFreeFrame { pool });
            };
            aspace.map_one(&mut self.kernel_pool, page, frame, flags, flags)?;
        }

        trace!("Allocated {count} {pool} pages at {start}");
        Ok(start)
    }

    /// Allocate `count` zero-filled kernel pages.
    ///
    /// # Errors
    /// See [`allocate_pages`](Self::allocate_pages).
    pub fn allocate_kernel_pages(&mut self, count: u32) -> Result<VirtualAddress, AllocError> {
        let start = self.allocate_pages(PoolKind::Kernel, count)?;
        for i in 0..count {
            // SAFETY: the page was just mapped writable and nobody else knows it yet.
            let bytes: &mut [u8; PAGE_SIZE as usize] =
                unsafe { self.mmu.page_mut(start.page().add_pages(i)) };
            bytes.fill(0);
        }
        Ok(start)
    }

    /// Allocate `count` user pages.
    ///
    /// User address spaces have no virtual allocator yet, so this always
    /// fails once the request size has been checked.
    ///
    /// # Errors
    /// Always [`AllocError::UserSpaceUnsupported`].
    ///
    /// # Panics
    /// Unless `0 < count < 3840`.
    pub fn allocate_user_pages(&mut self, count: u32) -> Result<VirtualAddress, AllocError> {
        self.allocate_pages(PoolKind::User, count)
    }

    /// Copy of the directory entry governing `va`.
    #[must_use]
    pub fn directory_entry_for(&self, va: VirtualAddress) -> PdEntry {
        AddressSpace::new(&self.mmu).directory_entry(va)
    }

    /// Copy of the page-table entry mapping `va`, or `None` when no page
    /// table covers it.
    #[must_use]
    pub fn table_entry_for(&self, va: VirtualAddress) -> Option<PtEntry> {
        AddressSpace::new(&self.mmu).table_entry(va)
    }

    /// Physical address backing `va`, if mapped.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        AddressSpace::new(&self.mmu).translate(va)
    }
}
