//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for raw 32-bit memory addresses and page bases used
//! in the two-level (non-PAE) paging and memory management code.
//!
//! ## Overview
//!
//! This crate defines a minimal set of types that prevent mixing virtual and
//! physical addresses at compile time while remaining zero-cost wrappers around
//! `u32` values.
//!
//! | Concept | Description |
//! |----------|-------------|
//! | [`MemoryAddress`] | A raw 32-bit address, either physical or virtual. |
//! | [`MemoryPage`] | A 4 KiB-aligned base address of a page. |
//!
//! These are then wrapped to distinguish between virtual and physical spaces:
//!
//! | Wrapper | Meaning |
//! |----------|----------|
//! | [`VirtualAddress`] / [`VirtualPage`] | Refer to virtual (page-table translated) memory. |
//! | [`PhysicalAddress`] / [`PhysicalPage`] | Refer to physical memory (frames). |
//!
//! Only 4 KiB pages exist here: the kernel never sets `PS` in a directory
//! entry, so every translation ends at a page-table entry.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0xC010_1234);
//! let (page, off) = va.split();
//! assert_eq!(page.base().as_u32(), 0xC010_1000);
//! assert_eq!(off, 0x234);
//! assert_eq!(page.join(off), va);
//!
//! let pa = PhysicalAddress::new(0x0020_0042);
//! assert_eq!(pa.page().base().as_u32(), 0x0020_0000);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod memory_address;
mod memory_page;
mod physical_address;
mod physical_page;
mod virtual_address;
mod virtual_page;

pub use memory_address::MemoryAddress;
pub use memory_page::MemoryPage;
pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
pub use virtual_address::VirtualAddress;
pub use virtual_page::VirtualPage;

/// Page (and frame) size in bytes.
pub const PAGE_SIZE: u32 = 4096;

/// log2([`PAGE_SIZE`]), i.e. the number of in-page offset bits.
pub const PAGE_SHIFT: u32 = 12;

/// Mask selecting the in-page offset bits.
pub const PAGE_OFFSET_MASK: u32 = PAGE_SIZE - 1;

const _: () = assert!(1 << PAGE_SHIFT == PAGE_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_join() {
        let a = MemoryAddress::new(0x1234_5678);
        let (p, o) = a.split();
        assert_eq!(p.base().as_u32(), 0x1234_5000);
        assert_eq!(o, 0x678);
        assert_eq!(p.join(o), a);
    }

    #[test]
    fn virtual_vs_physical_wrappers() {
        let va = VirtualAddress::new(0xC009_A123);
        let (vp, vo) = va.split();
        assert_eq!(vp.base().as_u32() & PAGE_OFFSET_MASK, 0);
        assert_eq!(vo, 0x123);
        assert_eq!(vp.join(vo), va);

        let pa = PhysicalAddress::new(0x0110_0042);
        let pp = pa.page();
        assert_eq!(pp.base().as_u32(), 0x0110_0000);
        assert_eq!(pa.offset(), 0x42);
    }

    #[test]
    fn alignment_helpers() {
        let a = MemoryAddress::new(0x12345);
        assert_eq!(a.align_down().as_u32(), 0x12000);
        assert_eq!(a.align_up().as_u32(), 0x13000);
        assert_eq!(MemoryAddress::new(0x13000).align_up().as_u32(), 0x13000);
        assert!(!a.is_page_aligned());
        assert!(a.align_down().is_page_aligned());
    }

    #[test]
    fn page_stepping() {
        let vp = VirtualPage::containing_address(VirtualAddress::new(0xC010_0FFF));
        assert_eq!(vp.base().as_u32(), 0xC010_0000);
        assert_eq!(vp.add_pages(3).base().as_u32(), 0xC010_3000);
        assert_eq!(vp.add_pages(1).number() - vp.number(), 1);
    }

    #[test]
    fn aligned_conversion_rejects_unaligned() {
        assert!(PhysicalPage::try_from(PhysicalAddress::new(0x2000)).is_ok());
        assert!(PhysicalPage::try_from(PhysicalAddress::new(0x2004)).is_err());
        assert!(VirtualPage::try_from(VirtualAddress::new(0xFFFF_F000)).is_ok());
        assert!(VirtualPage::try_from(VirtualAddress::new(0xFFFF_F004)).is_err());
    }
}
