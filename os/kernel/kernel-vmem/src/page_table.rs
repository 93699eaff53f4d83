//! # Two-Level Page Tables (32-bit, non-PAE)
//!
//! Each 32-bit virtual address is divided into three fields:
//!
//! ```text
//! | 31‒22 | 21‒12 | 11‒0   |
//! |  PD   |  PT   | Offset |
//! ```
//!
//! - [`pd`]: the Page Directory (1024 PDEs, each pointing at a Page Table).
//! - [`pt`]: the Page Table (1024 PTEs, each mapping one 4 KiB page).

pub mod pd;
pub mod pt;

use crate::addresses::VirtualAddress;
use crate::page_table::pd::PdIndex;
use crate::page_table::pt::PtIndex;

/// Number of entries in a directory or table.
pub const ENTRIES: usize = 1024;

/// Split a virtual address into its directory and table indices.
#[inline]
#[must_use]
pub const fn split_indices(va: VirtualAddress) -> (PdIndex, PtIndex) {
    (PdIndex::from(va), PtIndex::from(va))
}
