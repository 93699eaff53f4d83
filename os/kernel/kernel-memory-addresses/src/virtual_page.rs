use crate::{MemoryPage, VirtualAddress};
use core::fmt;

/// Virtual memory page base.
///
/// A `VirtualPage` represents the **page-aligned base** of a 4 KiB virtual
/// page. It is a thin wrapper over [`MemoryPage`] with virtual-address intent.
///
/// ### Invariants
/// - The low 12 bits of the base are always zero (page aligned).
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let va = VirtualAddress::new(0xC010_1234);
/// let vp = va.page();
/// assert_eq!(vp.base().as_u32(), 0xC010_1000);
/// assert_eq!(vp.join(va.offset()), va);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualPage(pub(crate) MemoryPage);

impl VirtualPage {
    #[inline]
    #[must_use]
    pub const fn from_page(p: MemoryPage) -> Self {
        Self(p)
    }

    /// Page that contains `addr` (aligns down to page boundary).
    #[inline]
    #[must_use]
    pub const fn containing_address(addr: VirtualAddress) -> Self {
        Self(MemoryPage::from_addr(addr.0))
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> VirtualAddress {
        VirtualAddress(self.0.base())
    }

    #[inline]
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0.number()
    }

    #[inline]
    #[must_use]
    pub const fn join(self, offset: u32) -> VirtualAddress {
        VirtualAddress(self.0.join(offset))
    }

    /// The page `n` pages above this one.
    #[inline]
    #[must_use]
    pub const fn add_pages(self, n: u32) -> Self {
        Self(self.0.add_pages(n))
    }
}

impl fmt::Display for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPage(0x{:08X})", self.0.base().as_u32())
    }
}

impl TryFrom<VirtualAddress> for VirtualPage {
    type Error = ();

    #[inline]
    fn try_from(va: VirtualAddress) -> Result<Self, ()> {
        if va.is_page_aligned() {
            Ok(va.page())
        } else {
            Err(())
        }
    }
}

impl From<MemoryPage> for VirtualPage {
    #[inline]
    fn from(p: MemoryPage) -> Self {
        Self(p)
    }
}
