//! # Interrupt control
//!
//! On a single processor, disabling interrupts is the only exclusion
//! primitive: nothing can preempt the running thread until they are enabled
//! again. The [`Interrupts`] trait is the seam to that hardware switch;
//! [`CpuInterrupts`] drives the real `IF` flag, tests substitute a model.

/// Interrupt flag state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IntrStatus {
    Off,
    On,
}

impl IntrStatus {
    #[inline]
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Control over the processor's maskable interrupts.
pub trait Interrupts {
    /// Current state.
    fn status(&self) -> IntrStatus;

    /// Enable interrupts, returning the previous state.
    fn enable(&self) -> IntrStatus;

    /// Disable interrupts, returning the previous state.
    fn disable(&self) -> IntrStatus;

    /// Switch to `status`, returning the previous state.
    #[inline]
    fn set_status(&self, status: IntrStatus) -> IntrStatus {
        match status {
            IntrStatus::On => self.enable(),
            IntrStatus::Off => self.disable(),
        }
    }
}

/// RAII guard that disables interrupts on creation and restores them on drop.
///
/// `IrqGuard::new()` records the current state and disables interrupts. On
/// drop it sets the recorded state again: a caller that entered with
/// interrupts off leaves with them off.
///
/// # Examples
///
/// ```no_run
/// use kernel_sync::irq::{CpuInterrupts, Interrupts, IrqGuard};
///
/// let cpu = CpuInterrupts;
/// let before = cpu.status();
/// {
///     let _g = IrqGuard::new(&cpu); // interrupts disabled here
///     // critical section
/// }
/// assert_eq!(cpu.status(), before);
/// ```
#[must_use = "interrupts are restored as soon as the guard is dropped"]
pub struct IrqGuard<'a, I: Interrupts + ?Sized> {
    irq: &'a I,
    /// State when the guard was created.
    previous: IntrStatus,
}

impl<'a, I: Interrupts + ?Sized> IrqGuard<'a, I> {
    /// Disable interrupts and remember the previous state.
    #[inline]
    pub fn new(irq: &'a I) -> Self {
        let previous = irq.disable();
        Self { irq, previous }
    }

    /// State that will be restored on drop.
    #[inline]
    pub const fn previous(&self) -> IntrStatus {
        self.previous
    }
}

impl<I: Interrupts + ?Sized> Drop for IrqGuard<'_, I> {
    fn drop(&mut self) {
        self.irq.set_status(self.previous);
    }
}

/// The `IF` flag of the running x86 processor.
///
/// # Safety & Privilege
///
/// `cli`/`sti` must be legal in the current context (ring 0). Calling from
/// user space faults.
#[derive(Debug, Default, Copy, Clone)]
pub struct CpuInterrupts;

/// `IF`, bit 9 of `EFLAGS`/`RFLAGS`.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const FLAGS_IF: usize = 1 << 9;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl Interrupts for CpuInterrupts {
    #[inline]
    fn status(&self) -> IntrStatus {
        if flags() & FLAGS_IF != 0 {
            IntrStatus::On
        } else {
            IntrStatus::Off
        }
    }

    #[inline]
    fn enable(&self) -> IntrStatus {
        let old = self.status();
        if !old.is_on() {
            sti_enable_interrupts();
        }
        old
    }

    #[inline]
    fn disable(&self) -> IntrStatus {
        let old = self.status();
        if old.is_on() {
            cli_stop_interrupts();
        }
        old
    }
}

/// Disables hardware interrupts (`cli`).
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline]
pub fn cli_stop_interrupts() {
    unsafe { core::arch::asm!("cli", options(nostack, preserves_flags)) }
}

/// Enables hardware interrupts (`sti`).
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline]
pub fn sti_enable_interrupts() {
    unsafe { core::arch::asm!("sti", options(nostack, preserves_flags)) }
}

/// Returns the current `EFLAGS` value (via `pushfd/pop`).
#[cfg(target_arch = "x86")]
#[inline]
#[must_use]
pub fn flags() -> usize {
    let r: usize;
    unsafe { core::arch::asm!("pushfd; pop {}", out(reg) r, options(preserves_flags)) }
    r
}

/// Returns the current `RFLAGS` value (via `pushfq/pop`).
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn flags() -> usize {
    let r: usize;
    unsafe { core::arch::asm!("pushfq; pop {}", out(reg) r, options(preserves_flags)) }
    r
}
