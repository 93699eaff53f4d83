//! # Address Space (x86, self-mapped page directory)
//!
//! Strongly-typed helpers to inspect and extend the **active** address space.
//! Every table is reached through the [`self_map`](crate::self_map) window,
//! so no physical-to-virtual translation is required.
//!
//! ## Highlights
//!
//! - `AddressSpace::map_one` to install one 4 KiB mapping, creating the page
//!   table on demand.
//! - `AddressSpace::directory_entry` / `AddressSpace::table_entry` to read the
//!   raw entries governing an address.
//! - `AddressSpace::translate` to resolve a VA to a PA.
//!
//! ## Design
//!
//! - Non-leaf links are created with caller-provided **non-leaf flags**; leaf
//!   flags come from the mapping call.
//! - A freshly allocated page table is cleared through the window right after
//!   its directory entry is installed, before any entry in it is written.
//! - Directory entries are never removed and leaves are only ever created on
//!   not-present slots, so no TLB maintenance is required here.

use crate::addresses::{PhysicalAddress, PhysicalPage, VirtualAddress, VirtualPage};
use crate::page_table::pd::{PageDirectory, PdEntry, PdIndex};
use crate::page_table::pt::{PageTable, PtEntry, PtIndex};
use crate::{FrameAlloc, Mmu, PageEntryBits, self_map};
use log::debug;

/// Failure to install a mapping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    /// No frame could be obtained for the page table covering this address.
    #[error("out of memory: no frame for the page table covering {0}")]
    OutOfMemory(VirtualAddress),
}

/// Handle to the currently active address space.
pub struct AddressSpace<'m, M: Mmu> {
    mmu: &'m M,
}

impl<'m, M: Mmu> AddressSpace<'m, M> {
    /// View the active address space through `mmu`.
    ///
    /// The active directory is expected to carry the self-map entry.
    #[inline]
    pub const fn new(mmu: &'m M) -> Self {
        Self { mmu }
    }

    #[inline]
    pub const fn mmu(&self) -> &'m M {
        self.mmu
    }

    /// Borrow the page directory through the window.
    #[inline]
    fn directory_mut(&self, va: VirtualAddress) -> &mut PageDirectory {
        // SAFETY: the self-map keeps the directory mapped writable at this page.
        unsafe { self.mmu.page_mut(self_map::directory_page(va)) }
    }

    /// Borrow the page table covering `va` through the window.
    ///
    /// The governing directory entry must be present.
    #[inline]
    fn table_mut(&self, va: VirtualAddress) -> &mut PageTable {
        // SAFETY: with the directory entry present, the window page maps the table.
        unsafe { self.mmu.page_mut(self_map::table_page(va)) }
    }

    /// Copy of the directory entry that governs `va`.
    #[must_use]
    pub fn directory_entry(&self, va: VirtualAddress) -> PdEntry {
        self.directory_mut(va).get(PdIndex::from(va))
    }

    /// Copy of the page-table entry that maps `va`.
    ///
    /// Returns `None` if the directory entry is absent: there is no table to
    /// look into and touching its window would fault.
    #[must_use]
    pub fn table_entry(&self, va: VirtualAddress) -> Option<PtEntry> {
        if !self.directory_entry(va).is_present() {
            return None;
        }
        Some(self.table_mut(va).get(PtIndex::from(va)))
    }

    /// Map **one** 4 KiB page at `page → frame` with `leaf_flags`.
    ///
    /// If no page table covers `page` yet, one frame is taken from `alloc`,
    /// linked with `nonleaf_flags` and zeroed.
    ///
    /// # Errors
    /// - [`MapError::OutOfMemory`] if a page table is needed and `alloc` is
    ///   exhausted. Nothing is modified in that case.
    ///
    /// # Panics
    /// - If `page` is already mapped. Remapping is a logic error.
    pub fn map_one<A: FrameAlloc>(
        &self,
        alloc: &mut A,
        page: VirtualPage,
        frame: PhysicalPage,
        nonleaf_flags: PageEntryBits,
        leaf_flags: PageEntryBits,
    ) -> Result<(), MapError> {
        let va = page.base();
        let pdi = PdIndex::from(va);

        if !self.directory_entry(va).is_present() {
            let table = alloc.alloc_4k().ok_or(MapError::OutOfMemory(va))?;
            self.directory_mut(va)
                .set(pdi, PdEntry::make_table(table, nonleaf_flags));
            self.table_mut(va).zero();
            debug!(
                "Created page table {table} for directory slot {} ({})",
                pdi.as_usize(),
                self_map::pde_address(va)
            );
        }

        let pti = PtIndex::from(va);
        let pt = self.table_mut(va);
        let existing = pt.get(pti);
        assert!(
            !existing.is_present(),
            "page {page} is already mapped (entry {:#010x})",
            existing.raw()
        );
        pt.set(pti, PtEntry::make_4k(frame, leaf_flags));
        Ok(())
    }

    /// Translate a `VirtualAddress` to `PhysicalAddress` if mapped.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        let (frame, _) = self.table_entry(va)?.page_4k()?;
        Some(frame.join(va.offset()))
    }
}
