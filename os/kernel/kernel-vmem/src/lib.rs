//! # Virtual Memory Support
//!
//! Minimal 32-bit x86 (non-PAE) paging helpers for the kernel.
//!
//! ## What you get
//! - An [`address space`](address_space) view of the **active** page directory,
//!   reached through the recursive self-map.
//! - The [`self_map`] window arithmetic (`pde_address` / `pte_address`).
//! - x86 page-table entry bits ([`PageEntryBits`]) as a `u32` bitfield.
//! - 4 KiB-aligned [`PageDirectory`] / [`PageTable`] wrappers and index helpers.
//! - A tiny allocator/memory-access interface ([`FrameAlloc`], [`Mmu`]).
//!
//! ## x86 Virtual Address → Physical Address Walk
//!
//! Each 32-bit virtual address is divided into three fields:
//!
//! ```text
//! | 31‒22 | 21‒12 | 11‒0   |
//! |  PD   |  PT   | Offset |
//! ```
//!
//! The CPU uses the first two fields as **indices** into two levels of
//! tables, each containing 1024 (2¹⁰) entries of 4 bytes.
//!
//! ```text
//!  CR3 → PD  →  PT  →  Physical Page
//!        │      │
//!        │      └───► PTE (Page Table Entry)      → maps 4 KiB page
//!        └──────────► PDE (Page Directory Entry)  → points to a PT
//! ```
//!
//! | Level | Table name | Entry name | Description |
//! |:------|:-----------|:-----------|:------------|
//! | 1 | **PD** (Page Directory) | **PDE** | One per address space, referenced by `CR3`. Each entry covers 4 MiB. |
//! | 2 | **PT** (Page Table) | **PTE** | Each entry maps one 4 KiB physical frame (always a leaf). |
//!
//! ## The self-map
//!
//! The last directory entry (index 1023) points at the directory itself. The
//! walk for any address in the top 4 MiB therefore uses the directory as a
//! page table, which makes every page table visible at
//! `0xFFC0_0000 + pd_index * 4096` and the directory at `0xFFFF_F000`.
//! No physical-to-virtual mapping is needed to edit page tables.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code, clippy::inline_always)]

#[cfg(any(test, feature = "soft-mmu"))]
extern crate alloc;

pub mod address_space;
pub mod addresses;
mod page_entry_bits;
pub mod page_table;
pub mod self_map;
#[cfg(any(test, feature = "soft-mmu"))]
pub mod soft_mmu;

pub use crate::address_space::{AddressSpace, MapError};
use crate::addresses::{PhysicalPage, VirtualPage};
pub use crate::page_entry_bits::PageEntryBits;
pub use crate::page_table::pd::{PageDirectory, PdEntry, PdIndex};
pub use crate::page_table::pt::{PageTable, PtEntry, PtIndex};

/// Re-export constants as info module.
pub use kernel_info::memory as info;

/// Minimal frame allocator used to obtain **physical** 4 KiB frames
/// for page tables.
///
/// The implementation decides where frames come from (bitmap pool, bump
/// cursor in tests, etc.). Frames are never handed back; a release path can
/// be added to this trait without touching its callers.
///
/// Returns `None` on out-of-memory.
pub trait FrameAlloc {
    /// Allocate one 4 KiB *physical* frame.
    fn alloc_4k(&mut self) -> Option<PhysicalPage>;
}

/// Gives typed access to memory at a **virtual** page of the active address
/// space.
///
/// On hardware this is a plain pointer cast ([`ActiveMmu`]); host tests plug
/// in a software walk so the self-map window is resolved like the CPU does.
pub trait Mmu {
    /// Borrow the 4 KiB page at `page` as a `T`.
    ///
    /// # Safety
    /// - `page` must be mapped writable in the active address space.
    /// - `T` must fit in one page and match the bytes there.
    /// - The caller must not hold another reference to the same memory for `'a`.
    unsafe fn page_mut<'a, T>(&self, page: VirtualPage) -> &'a mut T;
}

/// The MMU of the running CPU: virtual addresses are dereferenced directly.
#[derive(Debug, Default, Copy, Clone)]
pub struct ActiveMmu;

impl Mmu for ActiveMmu {
    #[inline]
    unsafe fn page_mut<'a, T>(&self, page: VirtualPage) -> &'a mut T {
        unsafe { &mut *page.base().as_mut_ptr::<T>() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::{PhysicalAddress, VirtualAddress};
    use crate::soft_mmu::SoftMmu;

    /// A trivial **bump** allocator: always hands out the next 4 KiB frame.
    struct BumpAlloc {
        next: u32,
        end: u32,
    }

    impl FrameAlloc for BumpAlloc {
        fn alloc_4k(&mut self) -> Option<PhysicalPage> {
            if self.next + 4096 > self.end {
                return None;
            }
            let p = self.next;
            self.next += 4096;
            Some(PhysicalPage::from_addr(PhysicalAddress::new(p)))
        }
    }

    fn setup() -> (SoftMmu, BumpAlloc) {
        let root = PhysicalPage::from_addr(PhysicalAddress::new(0x0010_0000));
        let alloc = BumpAlloc {
            next: 0x0020_0000,
            end: 0x0020_0000 + 16 * 4096,
        };
        (SoftMmu::new(root), alloc)
    }

    #[test]
    fn map_one_4k_creates_table_and_leaf() {
        let (mmu, mut alloc) = setup();
        let aspace = AddressSpace::new(&mmu);

        let va = VirtualAddress::new(0xC010_0000);
        let frame = PhysicalPage::from_addr(PhysicalAddress::new(0x0030_0000));
        assert!(!aspace.directory_entry(va).is_present());
        assert_eq!(aspace.table_entry(va), None);

        aspace
            .map_one(
                &mut alloc,
                va.page(),
                frame,
                PageEntryBits::new_user_rw(),
                PageEntryBits::new_user_rw(),
            )
            .expect("map_one");

        // The page table came from the allocator.
        let pde = aspace.directory_entry(va);
        assert_eq!(pde.next_table().map(|p| p.base().as_u32()), Some(0x0020_0000));
        assert_eq!(pde.raw() & 0x7, 0x7);

        let (leaf, flags) = aspace.table_entry(va).and_then(PtEntry::page_4k).expect("leaf");
        assert_eq!(leaf, frame);
        assert!(flags.writable() && flags.user_access());

        // The CPU-side walk agrees with the window accessors.
        assert_eq!(mmu.walk(va + 0x123), Some(PhysicalAddress::new(0x0030_0123)));
        assert_eq!(aspace.translate(va + 0x123), Some(PhysicalAddress::new(0x0030_0123)));
        assert_eq!(aspace.translate(VirtualAddress::new(0xC010_1000)), None);
    }

    #[test]
    fn second_page_in_same_slot_reuses_table() {
        let (mmu, mut alloc) = setup();
        let aspace = AddressSpace::new(&mmu);
        let flags = PageEntryBits::new_user_rw();

        for (i, pa) in [(0u32, 0x0030_0000u32), (1, 0x0030_1000)] {
            let va = VirtualAddress::new(0xC010_0000 + i * 4096);
            let frame = PhysicalPage::from_addr(PhysicalAddress::new(pa));
            aspace.map_one(&mut alloc, va.page(), frame, flags, flags).unwrap();
        }

        // One table frame consumed for both pages.
        assert_eq!(alloc.next, 0x0020_1000);
    }

    #[test]
    fn new_table_is_zeroed_even_over_garbage() {
        let (mmu, mut alloc) = setup();
        mmu.fill_frame(PhysicalPage::from_addr(PhysicalAddress::new(0x0020_0000)), 0xFF);
        let aspace = AddressSpace::new(&mmu);
        let flags = PageEntryBits::new_user_rw();

        let va = VirtualAddress::new(0x0840_0000);
        let frame = PhysicalPage::from_addr(PhysicalAddress::new(0x0030_0000));
        aspace.map_one(&mut alloc, va.page(), frame, flags, flags).unwrap();

        // Neighbouring slots in the fresh table are not present.
        for i in 1..1024u32 {
            let other = VirtualAddress::new(0x0840_0000 + i * 4096);
            let pte = aspace.table_entry(other).expect("table present");
            assert_eq!(pte.raw(), 0, "stale bits at index {i}");
        }
    }

    #[test]
    fn out_of_frames_leaves_directory_untouched() {
        let (mmu, _) = setup();
        let mut empty = BumpAlloc { next: 0, end: 0 };
        let aspace = AddressSpace::new(&mmu);
        let flags = PageEntryBits::new_user_rw();

        let va = VirtualAddress::new(0xC010_0000);
        let frame = PhysicalPage::from_addr(PhysicalAddress::new(0x0030_0000));
        let err = aspace
            .map_one(&mut empty, va.page(), frame, flags, flags)
            .unwrap_err();
        assert_eq!(err, MapError::OutOfMemory(va));
        assert!(!aspace.directory_entry(va).is_present());
    }

    #[test]
    #[should_panic(expected = "already mapped")]
    fn double_map_is_fatal() {
        let (mmu, mut alloc) = setup();
        let aspace = AddressSpace::new(&mmu);
        let flags = PageEntryBits::new_user_rw();
        let va = VirtualAddress::new(0xC010_0000);
        let frame = PhysicalPage::from_addr(PhysicalAddress::new(0x0030_0000));
        aspace.map_one(&mut alloc, va.page(), frame, flags, flags).unwrap();
        let _ = aspace.map_one(&mut alloc, va.page(), frame, flags, flags);
    }
}
