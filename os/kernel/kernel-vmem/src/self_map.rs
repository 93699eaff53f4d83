//! # Recursive self-map window
//!
//! Directory entry [`SELF_MAP_INDEX`](crate::info::SELF_MAP_INDEX) points at
//! the page directory itself. For an address in the top 4 MiB the CPU then
//! uses the directory as the page table, so:
//!
//! ```text
//! 0xFFC0_0000 + pd * 0x1000   the page table covering directory slot `pd`
//! 0xFFFF_F000                 the page directory (slot 1023 seen through itself)
//! ```
//!
//! Both functions below are pure arithmetic. They only produce addresses;
//! whether the memory behind them is mapped is the caller's concern (a page
//! table window faults when its directory entry is absent).

use crate::addresses::{VirtualAddress, VirtualPage};
use crate::info::{SELF_MAP_DIRECTORY, SELF_MAP_WINDOW};

/// Virtual address of the directory entry that governs `va`.
///
/// ```rust
/// # use kernel_vmem::addresses::VirtualAddress;
/// # use kernel_vmem::self_map::pde_address;
/// assert_eq!(pde_address(VirtualAddress::new(0xC010_0000)).as_u32(), 0xFFFF_FC00);
/// assert_eq!(pde_address(VirtualAddress::new(0x0000_0000)).as_u32(), 0xFFFF_F000);
/// ```
#[inline]
#[must_use]
pub const fn pde_address(va: VirtualAddress) -> VirtualAddress {
    VirtualAddress::new(SELF_MAP_DIRECTORY.as_u32() + (va.as_u32() >> 22) * 4)
}

/// Virtual address of the page-table entry that maps `va`.
///
/// ```rust
/// # use kernel_vmem::addresses::VirtualAddress;
/// # use kernel_vmem::self_map::pte_address;
/// assert_eq!(pte_address(VirtualAddress::new(0xC010_0000)).as_u32(), 0xFFF0_0400);
/// assert_eq!(pte_address(VirtualAddress::new(0xC010_1FFF)).as_u32(), 0xFFF0_0404);
/// ```
#[inline]
#[must_use]
pub const fn pte_address(va: VirtualAddress) -> VirtualAddress {
    let va = va.as_u32();
    VirtualAddress::new(
        SELF_MAP_WINDOW.as_u32() + ((va & 0xFFC0_0000) >> 10) + ((va >> 12) & 0x3FF) * 4,
    )
}

/// The window page holding the directory.
#[inline]
#[must_use]
pub const fn directory_page(va: VirtualAddress) -> VirtualPage {
    pde_address(va).page()
}

/// The window page holding the page table that covers `va`.
#[inline]
#[must_use]
pub const fn table_page(va: VirtualAddress) -> VirtualPage {
    pte_address(va).page()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_table::split_indices;

    #[test]
    fn offsets_match_indices() {
        for raw in [0u32, 0x0040_0000, 0x0840_3000, 0xC000_0000, 0xC010_5ABC, 0xFFBF_F000] {
            let va = VirtualAddress::new(raw);
            let (pd, pt) = split_indices(va);
            assert_eq!(pde_address(va).offset() as usize, pd.as_usize() * 4);
            assert_eq!(pte_address(va).offset() as usize, pt.as_usize() * 4);
            assert_eq!(
                table_page(va).base().as_u32(),
                0xFFC0_0000 + (pd.as_usize() as u32) * 4096
            );
            assert_eq!(directory_page(va).base().as_u32(), 0xFFFF_F000);
        }
    }

    #[test]
    fn window_of_the_window_is_the_directory() {
        // The table for slot 1023 is the directory itself.
        let top = VirtualAddress::new(0xFFFF_F000);
        assert_eq!(table_page(top).base().as_u32(), 0xFFFF_F000);
        assert_eq!(pte_address(top).as_u32(), 0xFFFF_FFFC);
        assert_eq!(pde_address(top).as_u32(), 0xFFFF_FFFC);
    }
}
