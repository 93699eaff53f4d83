//! # Kernel Boot Information
//!
//! The loader probes the machine's memory (BIOS `E820`/`E801`/`88h`) before
//! entering protected mode and stores the result at fixed low addresses. Low
//! memory stays identity-mapped after paging is enabled, so the kernel can
//! read these values through their physical address.

use kernel_memory_addresses::VirtualAddress;

/// Location of the total physical memory size in bytes, as a little-endian
/// `u32` written by the loader.
pub const TOTAL_MEMORY_BYTES_ADDR: VirtualAddress = VirtualAddress::new(0x0000_0B00);
