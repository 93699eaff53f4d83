use crate::addresses::{PhysicalAddress, PhysicalPage};
use bitfield_struct::bitfield;

/// Represents a single 32-bit x86 page directory or page table entry in its
/// raw bitfield form.
///
/// Without PAE, both paging levels share the same layout. Each bit
/// corresponds to a hardware-defined flag or address field as specified by
/// the Intel manuals (Vol. 3A, "32-Bit Paging").
///
/// ### Bit layout
///
/// | Bits      | Name / Mnemonic   | Meaning |
/// |-----------|-------------------|----------|
/// | 0         | `P` (present)     | Valid entry if set |
/// | 1         | `RW`              | Writable if set |
/// | 2         | `US`              | User-mode accessible if set |
/// | 3         | `PWT`             | Write-through caching |
/// | 4         | `PCD`             | Disable caching |
/// | 5         | `A`               | Accessed |
/// | 6         | `D`               | Dirty (PTE only) |
/// | 7         | `PS` / `PAT`      | 4 MiB page in a PDE, PAT in a PTE |
/// | 8         | `G`               | Global (PTE only) |
/// | 9–11      | OS avail          | Reserved for OS use |
/// | 12–31     | `addr`            | Physical frame bits [31:12] |
///
/// ### Example
/// ```rust
/// # use kernel_vmem::addresses::PhysicalAddress;
/// # use kernel_vmem::PageEntryBits;
/// let mut e = PageEntryBits::new();
/// e.set_present(true);
/// e.set_writable(true);
/// e.set_physical_address(PhysicalAddress::new(0x0020_0000));
/// assert!(e.present());
/// assert_eq!(e.into_bits(), 0x0020_0003);
/// ```
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct PageEntryBits {
    /// Present (P, bit 0).
    ///
    /// Set if the entry points to a valid page table (PDE) or a valid page
    /// (PTE). Clear implies a not-present entry; all other bits are then
    /// available to software.
    pub present: bool,

    /// Writable (RW, bit 1).
    pub writable: bool,

    /// User/Supervisor (US, bit 2).
    ///
    /// Set to allow user-mode (CPL 3) access; clear restricts to supervisor
    /// only. Permissions are the intersection of PDE and PTE.
    pub user_access: bool,

    /// Page Write-Through (PWT, bit 3).
    pub write_through: bool,

    /// Page Cache Disable (PCD, bit 4).
    pub cache_disabled: bool,

    /// Accessed (A, bit 5). Set by the CPU on first access through this entry.
    pub accessed: bool,

    /// Dirty (D, bit 6). Set by the CPU on first write through a PTE.
    pub dirty: bool,

    /// Page Size (PS, bit 7) in a PDE; PAT in a PTE.
    ///
    /// The kernel never creates 4 MiB pages, so this stays clear.
    pub large_page: bool,

    /// Global (G, bit 8), PTE only.
    pub global_translation: bool,

    /// OS-available (bits 9..=11). Not interpreted by hardware.
    #[bits(3)]
    pub os_available: u8,

    /// Physical address bits [31:12] (bits 12..=31).
    #[bits(20)]
    phys_addr_bits_31_12: u32,
}

impl PageEntryBits {
    #[inline]
    pub const fn set_physical_address(&mut self, phys: PhysicalAddress) {
        debug_assert!(phys.is_page_aligned());
        self.set_phys_addr_bits_31_12(phys.as_u32() >> 12);
    }

    #[inline]
    #[must_use]
    pub const fn physical_address(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.phys_addr_bits_31_12() << 12)
    }

    #[inline]
    #[must_use]
    pub const fn physical_page(&self) -> PhysicalPage {
        PhysicalPage::from_addr(self.physical_address())
    }

    /// Present, writable and user-accessible.
    ///
    /// These are the flags every allocator mapping and every page-table link
    /// is created with, whichever pool the frame came from.
    #[inline]
    #[must_use]
    pub const fn new_user_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_user_access(true)
    }

    /// Present and writable, supervisor only.
    #[inline]
    #[must_use]
    pub const fn new_kernel_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_user_access(false)
    }
}
