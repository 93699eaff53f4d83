//! # Memory Layout

use kernel_memory_addresses::{PAGE_SIZE, VirtualAddress};

/// First virtual address of kernel space; everything below belongs to user space.
pub const KERNEL_SPACE_BASE: VirtualAddress = VirtualAddress::new(0xC000_0000);

/// Low physical memory owned by firmware, the loader and the kernel image.
///
/// Mapped at both `0x0` and [`KERNEL_SPACE_BASE`] by the boot page tables.
pub const LOW_RESERVED_BYTES: u32 = 0x0010_0000; // 1 MiB

/// Frames used by the loader for the initial page directory and tables:
/// one directory, the table shared by directory entries 0 and 768, and the
/// tables pre-created for entries 769 to 1022.
pub const BOOT_PAGE_TABLE_FRAMES: u32 = 256;

/// Size of the boot page-table region in bytes.
pub const BOOT_PAGE_TABLE_BYTES: u32 = BOOT_PAGE_TABLE_FRAMES * PAGE_SIZE;

/// Start of the kernel heap, i.e. the first virtual address handed out by
/// the kernel virtual address allocator. It skips the low 1 MiB so that heap
/// addresses are logically contiguous with the kernel's mapping of low memory.
pub const KERNEL_HEAP_START: VirtualAddress = VirtualAddress::new(0xC010_0000);

/// Most pages the kernel heap may span. The heap ends where the self-map
/// window begins.
pub const KERNEL_HEAP_MAX_PAGES: u32 =
    (SELF_MAP_WINDOW.as_u32() - KERNEL_HEAP_START.as_u32()) / PAGE_SIZE;

/// Where the allocator bitmaps live: right after the kernel's static image
/// and below the main thread's stack page.
pub const MEM_BITMAP_BASE: VirtualAddress = VirtualAddress::new(0xC009_A000);

/// Top of the region available to the allocator bitmaps. The page at this
/// address holds the main kernel thread's control block and stack.
pub const MEM_BITMAP_END: VirtualAddress = VirtualAddress::new(0xC009_E000);

/// Maximum number of bytes the allocator bitmaps may occupy.
///
/// Four pages of bitmap describe 512 MiB worth of frames.
pub const MEM_BITMAP_MAX_BYTES: u32 = MEM_BITMAP_END.as_u32() - MEM_BITMAP_BASE.as_u32();

/// Directory index whose entry points back at the directory itself.
pub const SELF_MAP_INDEX: usize = 1023;

/// Virtual window in which every page table is visible as a 4 KiB page.
pub const SELF_MAP_WINDOW: VirtualAddress = VirtualAddress::new(0xFFC0_0000);

/// Virtual address at which the page directory itself is visible.
pub const SELF_MAP_DIRECTORY: VirtualAddress = VirtualAddress::new(0xFFFF_F000);

/// Exclusive upper bound for the number of pages in one allocation request.
pub const MAX_PAGES_PER_REQUEST: u32 = 3840;

const _: () = {
    assert!(LOW_RESERVED_BYTES.is_multiple_of(PAGE_SIZE));
    assert!(MEM_BITMAP_BASE.is_page_aligned());
    assert!(MEM_BITMAP_BASE.as_u32() > KERNEL_SPACE_BASE.as_u32());
    assert!(MEM_BITMAP_END.as_u32() <= KERNEL_HEAP_START.as_u32());
    assert!(KERNEL_HEAP_START.as_u32() == KERNEL_SPACE_BASE.as_u32() + LOW_RESERVED_BYTES);
    assert!(SELF_MAP_WINDOW.as_u32() == (SELF_MAP_INDEX as u32) << 22);
    assert!(KERNEL_HEAP_MAX_PAGES.is_multiple_of(8));
    assert!(
        SELF_MAP_DIRECTORY.as_u32() == SELF_MAP_WINDOW.as_u32() + ((SELF_MAP_INDEX as u32) << 12)
    );
};
