//! # Scheduler seam
//!
//! The semaphore only needs three things from the scheduler: who is running,
//! a way to suspend that thread, and a way to make another one runnable.

use core::fmt;

/// Why a thread is suspended, as reported to [`Scheduler::block`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ThreadStatus {
    /// Waiting on a semaphore; only an `up` makes it ready again.
    Blocked,
}

/// The uniprocessor scheduler as seen by blocking primitives.
///
/// All three operations are called with interrupts disabled.
pub trait Scheduler {
    /// Opaque thread reference, compared by identity.
    type Thread: Copy + Eq + fmt::Debug;

    /// The thread executing this call.
    fn running_thread(&self) -> Self::Thread;

    /// Suspend the running thread with status `reason` and switch away.
    ///
    /// Returns once another thread has passed it to [`unblock`](Self::unblock)
    /// and the scheduler picked it again.
    fn block(&self, reason: ThreadStatus);

    /// Make a blocked `thread` ready. Does not switch to it.
    fn unblock(&self, thread: Self::Thread);
}
