//! # Kernel Memory Allocation
//!
//! This crate provides the page-granular memory allocator of the kernel:
//! bitmap-tracked physical frame pools, a bitmap-tracked kernel virtual
//! address space, and the glue that maps one onto the other through the
//! self-mapped page directory.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │            Memory Manager ([`mm`])                  │
//! │    • allocate_pages / allocate_kernel_pages         │
//! │    • zero-fill of kernel pages                      │
//! │    • raw entry lookups for higher layers            │
//! └───────────┬──────────────────────────┬──────────────┘
//!             │                          │
//! ┌───────────▼──────────────┐ ┌─────────▼──────────────┐
//! │ Virtual Space ([`vaddr`])│ │ Frame Pools            │
//! │  • kernel heap pages     │ │ ([`frame_alloc`])      │
//! │  • first-fit page runs   │ │  • "kernel" and "user" │
//! └───────────┬──────────────┘ └─────────┬──────────────┘
//!             │                          │
//! ┌───────────▼──────────────────────────▼──────────────┐
//! │                 Bitmap ([`bitmap`])                 │
//! │    • one bit per page or frame, borrowed storage    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Mappings are installed with `kernel-vmem`'s `AddressSpace`, which takes
//! page-table frames from the kernel pool through the `FrameAlloc` trait.
//!
//! ## Boot
//!
//! [`MemoryManager::from_boot_info`](mm::MemoryManager::from_boot_info)
//! reads the physical memory size left by the loader at `0xB00`, sizes the
//! pools with [`MemoryLayout`](layout::MemoryLayout) and places the three
//! bitmaps at `0xC009_A000`:
//!
//! ```text
//! Physical                                Virtual
//! 0x0000_0000 ┌────────────────┐          0xC000_0000 ┌────────────────┐
//!             │ low 1 MiB      │                      │ low 1 MiB      │
//! 0x0010_0000 ├────────────────┤          0xC009_A000 │  ├ bitmaps     │
//!             │ boot PD + PTs  │          0xC010_0000 ├────────────────┤
//! 0x0020_0000 ├────────────────┤                      │ kernel heap    │
//!             │ kernel pool    │                      │ (vaddr bitmap) │
//!             ├────────────────┤                      ├────────────────┤
//!             │ user pool      │          0xFFC0_0000 │ self-map window│
//!             └────────────────┘                      └────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use kernel_alloc::layout::MemoryLayout;
//! use kernel_alloc::mm::MemoryManager;
//! use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};
//! use kernel_vmem::soft_mmu::SoftMmu;
//!
//! let layout = MemoryLayout::from_total(32 * 1024 * 1024);
//! let mut storage = vec![0u8; layout.bitmap_bytes()];
//! let mmu = SoftMmu::new(PhysicalPage::from_addr(PhysicalAddress::new(0x0010_0000)));
//! let mut mm = MemoryManager::new(&layout, &mut storage, mmu);
//!
//! let va = mm.allocate_kernel_pages(2).unwrap();
//! assert_eq!(va.as_u32(), 0xC010_0000);
//! assert!(mm.translate(va).is_some());
//! ```
//!
//! ## Concurrency
//!
//! Nothing here locks. The [`MemoryManager`](mm::MemoryManager) is a single
//! `&mut` owner; callers keep interrupts disabled around each call.
//!
//! ## Reclamation
//!
//! None. Frames, pages and page tables stay allocated for the lifetime of
//! the system, and a request that fails part way keeps what it already got.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod bitmap;
pub mod frame_alloc;
pub mod layout;
pub mod mm;
pub mod vaddr;

pub use crate::mm::{AllocError, MemoryManager, PoolKind};
