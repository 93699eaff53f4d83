//! # Software MMU
//!
//! A host-side stand-in for the CPU's paging unit: sparse simulated physical
//! RAM made of 4 KiB frames, plus a two-level walk that starts from a root
//! directory exactly like `CR3`. The constructor installs the self-map entry,
//! so code written against the [`self_map`](crate::self_map) window runs
//! unchanged.
//!
//! Frames spring into existence zero-filled on first touch. Use
//! [`SoftMmu::fill_frame`] to simulate stale memory.

use crate::addresses::{PAGE_SIZE, PhysicalAddress, PhysicalPage, VirtualAddress, VirtualPage};
use crate::info::SELF_MAP_INDEX;
use crate::page_table::pd::PdIndex;
use crate::page_table::pt::PtIndex;
use crate::{Mmu, PageEntryBits};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::cell::{RefCell, UnsafeCell};

#[repr(C, align(4096))]
struct Frame([u8; PAGE_SIZE as usize]);

/// Simulated physical memory with a paging walk.
pub struct SoftMmu {
    ram: RefCell<BTreeMap<u32, Box<UnsafeCell<Frame>>>>,
    root: PhysicalPage,
}

impl SoftMmu {
    /// Create RAM with an empty directory at `root` whose last entry maps
    /// the directory itself.
    #[must_use]
    pub fn new(root: PhysicalPage) -> Self {
        let mmu = Self {
            ram: RefCell::new(BTreeMap::new()),
            root,
        };
        let mut self_entry = PageEntryBits::new_user_rw();
        self_entry.set_physical_address(root.base());
        mmu.write_u32(root.join(entry_offset(SELF_MAP_INDEX)), self_entry.into_bits());
        mmu
    }

    /// The frame holding the page directory (what `CR3` would hold).
    #[must_use]
    pub const fn root(&self) -> PhysicalPage {
        self.root
    }

    fn frame_ptr(&self, frame: PhysicalPage) -> *mut u8 {
        let mut ram = self.ram.borrow_mut();
        let cell = ram
            .entry(frame.number())
            .or_insert_with(|| Box::new(UnsafeCell::new(Frame([0; PAGE_SIZE as usize]))));
        cell.get().cast::<u8>()
    }

    /// Read a little-endian `u32` from physical memory.
    #[must_use]
    pub fn read_u32(&self, pa: PhysicalAddress) -> u32 {
        debug_assert_eq!(pa.offset() % 4, 0);
        let base = self.frame_ptr(pa.page());
        // SAFETY: offset is in-frame and 4-byte aligned; frames live as long as `self`.
        unsafe { base.add(pa.offset() as usize).cast::<u32>().read() }
    }

    /// Write a little-endian `u32` to physical memory.
    pub fn write_u32(&self, pa: PhysicalAddress, value: u32) {
        debug_assert_eq!(pa.offset() % 4, 0);
        let base = self.frame_ptr(pa.page());
        // SAFETY: see `read_u32`.
        unsafe { base.add(pa.offset() as usize).cast::<u32>().write(value) }
    }

    /// Overwrite a whole frame with `byte`.
    pub fn fill_frame(&self, frame: PhysicalPage, byte: u8) {
        let base = self.frame_ptr(frame);
        // SAFETY: the frame is exactly one page long.
        unsafe { core::ptr::write_bytes(base, byte, PAGE_SIZE as usize) }
    }

    /// Copy out the contents of a frame.
    #[must_use]
    pub fn frame_bytes(&self, frame: PhysicalPage) -> [u8; PAGE_SIZE as usize] {
        let base = self.frame_ptr(frame);
        let mut out = [0u8; PAGE_SIZE as usize];
        // SAFETY: the frame is exactly one page long and does not overlap `out`.
        unsafe { core::ptr::copy_nonoverlapping(base, out.as_mut_ptr(), out.len()) }
        out
    }

    /// Number of frames that have been touched so far.
    #[must_use]
    pub fn touched_frames(&self) -> usize {
        self.ram.borrow().len()
    }

    /// Resolve `va` the way the CPU does, starting at the root directory.
    #[must_use]
    pub fn walk(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        let pde = PageEntryBits::from_bits(
            self.read_u32(self.root.join(entry_offset(PdIndex::from(va).as_usize()))),
        );
        if !pde.present() {
            return None;
        }
        let pte = PageEntryBits::from_bits(
            self.read_u32(pde.physical_page().join(entry_offset(PtIndex::from(va).as_usize()))),
        );
        if !pte.present() {
            return None;
        }
        Some(pte.physical_page().join(va.offset()))
    }
}

impl Mmu for SoftMmu {
    unsafe fn page_mut<'a, T>(&self, page: VirtualPage) -> &'a mut T {
        assert!(size_of::<T>() <= PAGE_SIZE as usize);
        assert!(align_of::<T>() <= PAGE_SIZE as usize);
        let Some(pa) = self.walk(page.base()) else {
            panic!("page fault at {}", page.base());
        };
        let base = self.frame_ptr(pa.page());
        // SAFETY: the frame is page-sized and page-aligned and outlives the borrow
        // for as long as `self` does; the caller upholds the aliasing contract.
        unsafe { &mut *base.cast::<T>() }
    }
}

#[inline]
const fn entry_offset(index: usize) -> u32 {
    (index * 4) as u32
}
