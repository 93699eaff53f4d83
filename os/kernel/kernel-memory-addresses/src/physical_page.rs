use crate::{MemoryPage, PhysicalAddress};
use core::fmt;

/// Physical memory frame base.
///
/// A `PhysicalPage` represents the **page-aligned base** of a 4 KiB physical
/// frame. It is a thin wrapper over [`MemoryPage`] with physical-address
/// intent.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage(pub(crate) MemoryPage);

impl PhysicalPage {
    #[inline]
    #[must_use]
    pub const fn from_page(p: MemoryPage) -> Self {
        Self(p)
    }

    /// Frame that contains `addr` (aligns down to page boundary).
    #[inline]
    #[must_use]
    pub const fn containing_address(addr: PhysicalAddress) -> Self {
        Self(MemoryPage::from_addr(addr.0))
    }

    /// Frame starting at the page-aligned `addr` (debug-asserted).
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: PhysicalAddress) -> Self {
        Self(MemoryPage::new_aligned(addr.0))
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress(self.0.base())
    }

    #[inline]
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0.number()
    }

    #[inline]
    #[must_use]
    pub const fn join(self, offset: u32) -> PhysicalAddress {
        PhysicalAddress(self.0.join(offset))
    }
}

impl fmt::Display for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage(0x{:08X})", self.0.base().as_u32())
    }
}

impl TryFrom<PhysicalAddress> for PhysicalPage {
    type Error = ();

    #[inline]
    fn try_from(pa: PhysicalAddress) -> Result<Self, ()> {
        if pa.is_page_aligned() {
            Ok(pa.page())
        } else {
            Err(())
        }
    }
}

impl From<MemoryPage> for PhysicalPage {
    #[inline]
    fn from(p: MemoryPage) -> Self {
        Self(p)
    }
}
