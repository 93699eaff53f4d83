//! Physical frame pools.
//!
//! A pool slices a physically contiguous region into 4 KiB frames and tracks
//! them with a [`Bitmap`]. The kernel runs two of them, "kernel" and "user",
//! over disjoint ranges. Frames are never returned.

use crate::bitmap::Bitmap;
use core::fmt;
use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress, PhysicalPage};
use kernel_vmem::FrameAlloc;
use log::{trace, warn};

/// A named physical region handing out single frames, lowest address first.
pub struct FramePool<'a> {
    name: &'static str,
    base: PhysicalAddress,
    size: u32,
    bitmap: Bitmap<'a>,
}

impl<'a> FramePool<'a> {
    /// Create a pool over `[base, base + size)`; `bitmap` is cleared.
    ///
    /// The bitmap may cover fewer frames than `size` holds. Frames past its
    /// capacity are never handed out.
    pub fn new(
        name: &'static str,
        base: PhysicalAddress,
        size: u32,
        mut bitmap: Bitmap<'a>,
    ) -> Self {
        debug_assert!(base.is_page_aligned());
        debug_assert!(bitmap.len() <= (size / PAGE_SIZE) as usize);
        bitmap.init();
        Self {
            name,
            base,
            size,
            bitmap,
        }
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    /// Region size in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of frames tracked by the bitmap.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.bitmap.len()
    }

    /// Number of frames handed out so far.
    #[inline]
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.bitmap.count_set()
    }

    #[inline]
    #[must_use]
    pub const fn bitmap(&self) -> &Bitmap<'a> {
        &self.bitmap
    }

    /// Whether `pa` lies inside this pool's region.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pa: PhysicalAddress) -> bool {
        let pa = pa.as_u32();
        pa >= self.base.as_u32() && pa - self.base.as_u32() < self.size
    }

    /// Take the lowest free frame.
    pub fn allocate_frame(&mut self) -> Option<PhysicalPage> {
        let Some(index) = self.bitmap.scan(1) else {
            warn!("{} pool exhausted ({} frames)", self.name, self.capacity());
            return None;
        };
        self.bitmap.set(index, 1, true);

        #[allow(clippy::cast_possible_truncation)]
        let frame = PhysicalPage::from_addr(self.base + index as u32 * PAGE_SIZE);
        trace!("{} pool: allocated frame {frame}", self.name);
        Some(frame)
    }
}

impl FrameAlloc for FramePool<'_> {
    #[inline]
    fn alloc_4k(&mut self) -> Option<PhysicalPage> {
        self.allocate_frame()
    }
}

impl fmt::Display for FramePool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pool {}..{} ({}/{} frames)",
            self.name,
            self.base,
            PhysicalAddress::new(self.base.as_u32() + self.size),
            self.allocated(),
            self.capacity()
        )
    }
}
