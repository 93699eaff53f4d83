//! # Virtual and Physical Memory Addresses
//!
//! Re-exports the typed 32-bit address wrappers so page-table code and its
//! callers agree on one set of types.

pub use kernel_memory_addresses::{
    MemoryAddress, MemoryPage, PAGE_SIZE, PhysicalAddress, PhysicalPage, VirtualAddress,
    VirtualPage,
};
