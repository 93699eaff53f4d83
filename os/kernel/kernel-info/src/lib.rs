//! # Kernel Configuration and Boot Interface
//!
//! This crate defines the memory layout constants and boot interface contracts
//! that govern the kernel's initialization and runtime memory management. It
//! is the single source of truth for addresses shared between the loader, the
//! boot-time page tables and the allocator.
//!
//! ## Architecture
//!
//! ### Boot Information ([`boot`])
//! Where the loader leaves the values the kernel reads right after the switch
//! to protected mode with paging enabled (currently: the total amount of
//! physical memory).
//!
//! ### Memory Layout ([`memory`])
//! The kernel's 32-bit virtual memory architecture:
//! * **Address Space Layout**: user/kernel split at 3 GiB
//! * **Boot Page Tables**: the region the loader uses for the initial directory and tables
//! * **Kernel Heap**: where page-granular kernel allocations are placed
//! * **Self-Map Window**: where page tables are visible as ordinary memory
//!
//! ## Virtual Memory Architecture
//!
//! ```text
//! Virtual Address Space Layout (32-bit):
//!
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │         User Space              │
//! 0xC000_0000 ├─────────────────────────────────┤ KERNEL_SPACE_BASE
//!             │  Low 1 MiB (image, bitmaps)     │
//! 0xC010_0000 ├─────────────────────────────────┤ KERNEL_HEAP_START
//!             │         Kernel Heap             │
//!             │   (allocate_kernel_pages)       │
//! 0xFFC0_0000 ├─────────────────────────────────┤ SELF_MAP_WINDOW
//!             │   Page tables (self-mapped)     │
//! 0xFFFF_F000 ├─────────────────────────────────┤ SELF_MAP_DIRECTORY
//!             │   Page directory                │
//! 0xFFFF_FFFF └─────────────────────────────────┘
//! ```
//!
//! ## Physical Memory Layout
//!
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │  Low Memory (< 1 MiB)           │
//!             │  (BIOS, loader, kernel image)   │
//! 0x0010_0000 ├─────────────────────────────────┤
//!             │  Boot page directory + tables   │
//!             │  (256 frames)                   │
//! 0x0020_0000 ├─────────────────────────────────┤
//!             │  Kernel pool  (half)            │
//!             ├─────────────────────────────────┤
//!             │  User pool    (half)            │
//!             └─────────────────────────────────┘
//! ```
//!
//! All layout constants are `const` values with compile-time consistency
//! assertions.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
