//! Reentrant sleeping lock.
//!
//! A binary [`Semaphore`] plus the owning thread and a recursion counter.
//! The holder may acquire again without blocking; it must release as many
//! times as it acquired before anyone else gets the lock.

use crate::irq::Interrupts;
use crate::sched::Scheduler;
use crate::semaphore::Semaphore;
use core::cell::UnsafeCell;
use core::fmt;

struct Owner<T> {
    holder: Option<T>,
    recursion: u32,
}

/// A lock held by threads of type `T`.
pub struct Lock<T> {
    owner: UnsafeCell<Owner<T>>,
    semaphore: Semaphore<T>,
}

// Safety: `owner` is only written by the thread holding `semaphore`.
unsafe impl<T: Send> Sync for Lock<T> {}

impl<T> Default for Lock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lock<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owner: UnsafeCell::new(Owner {
                holder: None,
                recursion: 0,
            }),
            semaphore: Semaphore::new(1),
        }
    }

    fn with_owner<R>(&self, f: impl FnOnce(&mut Owner<T>) -> R) -> R {
        // SAFETY: no reference escapes `f`; see the `Sync` impl.
        f(unsafe { &mut *self.owner.get() })
    }

    /// Times the holder has acquired the lock without releasing it.
    #[must_use]
    pub fn recursion(&self) -> u32 {
        self.with_owner(|o| o.recursion)
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.with_owner(|o| o.holder.is_some())
    }

    /// The underlying binary semaphore.
    #[must_use]
    pub const fn semaphore(&self) -> &Semaphore<T> {
        &self.semaphore
    }
}

impl<T: Copy + Eq + fmt::Debug> Lock<T> {
    #[must_use]
    pub fn holder(&self) -> Option<T> {
        self.with_owner(|o| o.holder)
    }

    /// Acquire the lock, blocking while another thread holds it.
    pub fn acquire<K>(&self, k: &K)
    where
        K: Scheduler<Thread = T> + Interrupts,
    {
        let current = k.running_thread();
        if self.holder() == Some(current) {
            self.with_owner(|o| o.recursion += 1);
            return;
        }

        self.semaphore.down(k);
        self.with_owner(|o| {
            assert_eq!(o.recursion, 0, "fresh lock acquisition with stale recursion");
            o.holder = Some(current);
            o.recursion = 1;
        });
    }

    /// Release one level of the lock.
    ///
    /// # Panics
    /// If the running thread does not hold the lock.
    pub fn release<K>(&self, k: &K)
    where
        K: Scheduler<Thread = T> + Interrupts,
    {
        let current = k.running_thread();
        let still_held = self.with_owner(|o| {
            assert_eq!(
                o.holder,
                Some(current),
                "lock released by {current:?}, which does not hold it"
            );
            if o.recursion > 1 {
                o.recursion -= 1;
                return true;
            }
            assert_eq!(o.recursion, 1);
            o.holder = None;
            o.recursion = 0;
            false
        });

        // The holder is already cleared when a waiter wakes up.
        if !still_held {
            self.semaphore.up(k);
        }
    }
}
