//! Counting semaphore with a FIFO wait queue.
//!
//! State is only touched with interrupts disabled, which on a single
//! processor makes every operation atomic. A thread that finds the count at
//! zero queues itself and blocks. `up` wakes the oldest waiter, which then
//! competes for the count again.

use crate::irq::{Interrupts, IrqGuard};
use crate::sched::{Scheduler, ThreadStatus};
use alloc::collections::VecDeque;
use core::cell::UnsafeCell;
use log::trace;

struct State<T> {
    value: u32,
    waiters: VecDeque<T>,
}

/// A semaphore whose waiters are threads of type `T`.
pub struct Semaphore<T> {
    state: UnsafeCell<State<T>>,
}

// Safety: state is only accessed with interrupts disabled on one CPU.
unsafe impl<T: Send> Sync for Semaphore<T> {}

impl<T> Semaphore<T> {
    /// Create a semaphore holding `value` units.
    ///
    /// `down` and `up` assume binary use: the count only ever moves between
    /// 0 and 1.
    ///
    /// # Panics
    /// If `value` is greater than 1.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        assert!(value <= 1, "semaphore is binary, initial count must be 0 or 1");
        Self {
            state: UnsafeCell::new(State {
                value,
                waiters: VecDeque::new(),
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State<T>) -> R) -> R {
        // SAFETY: callers hold an `IrqGuard` or only read; no reference escapes `f`.
        f(unsafe { &mut *self.state.get() })
    }

    /// Current count.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.with_state(|s| s.value)
    }

    /// Number of queued threads.
    #[must_use]
    pub fn waiters(&self) -> usize {
        self.with_state(|s| s.waiters.len())
    }
}

impl<T: Copy + Eq + core::fmt::Debug> Semaphore<T> {
    /// Take one unit, blocking while the count is zero.
    ///
    /// # Panics
    /// - If the running thread is already queued on this semaphore.
    /// - If the count is not zero after taking a unit, i.e. the semaphore
    ///   was used as a counting semaphore.
    pub fn down<K>(&self, k: &K)
    where
        K: Scheduler<Thread = T> + Interrupts,
    {
        let _irq = IrqGuard::new(k);

        while self.value() == 0 {
            let current = k.running_thread();
            self.with_state(|s| {
                assert!(
                    !s.waiters.contains(&current),
                    "thread {current:?} is already waiting on this semaphore"
                );
                s.waiters.push_back(current);
            });
            trace!("Thread {current:?} blocks on semaphore");
            k.block(ThreadStatus::Blocked);
        }

        self.with_state(|s| {
            s.value -= 1;
            assert_eq!(s.value, 0, "semaphore count after down");
        });
    }

    /// Return one unit and wake the longest-waiting thread, if any.
    ///
    /// # Panics
    /// If the count is not zero before or one after.
    pub fn up<K>(&self, k: &K)
    where
        K: Scheduler<Thread = T> + Interrupts,
    {
        let _irq = IrqGuard::new(k);

        let woken = self.with_state(|s| {
            assert_eq!(s.value, 0, "semaphore count before up");
            s.waiters.pop_front()
        });
        if let Some(thread) = woken {
            trace!("Waking thread {thread:?}");
            k.unblock(thread);
        }

        self.with_state(|s| {
            s.value += 1;
            assert_eq!(s.value, 1, "semaphore count after up");
        });
    }
}
