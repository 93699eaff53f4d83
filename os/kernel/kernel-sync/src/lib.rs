//! # Kernel synchronization primitives
//!
//! Blocking primitives for a single-processor kernel. Exclusion comes from
//! disabling interrupts ([`irq`]); waiting comes from the scheduler
//! ([`sched`]). Both are traits so the primitives run unchanged against the
//! real CPU and against a host-side model.
//!
//! - [`Semaphore`]: count plus FIFO wait queue.
//! - [`Lock`]: reentrant lock on top of a binary semaphore.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

pub mod irq;
mod lock;
pub mod sched;
mod semaphore;

pub use irq::{CpuInterrupts, IntrStatus, Interrupts, IrqGuard};
pub use lock::Lock;
pub use sched::{Scheduler, ThreadStatus};
pub use semaphore::Semaphore;
