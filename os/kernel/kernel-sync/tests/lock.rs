mod common;

use common::{Body, Cpu, Tid, Trace};
use kernel_sync::Lock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn thread(f: impl FnOnce(&Cpu) + Send + 'static) -> Body {
    Box::new(f)
}

#[test]
fn nested_acquire_needs_matching_releases() {
    let lock = Arc::new(Lock::new());
    let trace = Trace::default();

    let a = {
        let lock = Arc::clone(&lock);
        let trace = trace.clone();
        thread(move |cpu| {
            lock.acquire(cpu);
            lock.acquire(cpu);
            assert_eq!(lock.recursion(), 2);
            assert_eq!(lock.holder(), Some(Tid(0)));

            lock.release(cpu);
            assert_eq!(lock.recursion(), 1);
            assert!(lock.is_held());
            trace.push("A released once");

            // B runs and blocks on the lock.
            cpu.yield_now();
            assert_eq!(lock.semaphore().waiters(), 1);
            assert_eq!(lock.holder(), Some(Tid(0)));

            lock.release(cpu);
            // B is runnable but has not run: the lock is free, not handed over.
            assert_eq!(lock.holder(), None);
            assert_eq!(lock.recursion(), 0);
            trace.push("A released twice");
        })
    };
    let b = {
        let lock = Arc::clone(&lock);
        let trace = trace.clone();
        thread(move |cpu| {
            lock.acquire(cpu);
            trace.push("B acquired");
            assert_eq!(lock.holder(), Some(Tid(1)));
            assert_eq!(lock.recursion(), 1);
            lock.release(cpu);
        })
    };
    Cpu::run(vec![a, b]);

    assert_eq!(
        trace.events(),
        ["A released once", "A released twice", "B acquired"]
    );
    assert!(!lock.is_held());
    assert_eq!(lock.semaphore().value(), 1);
}

#[test]
fn recursive_holders_exclude_each_other() {
    let lock = Arc::new(Lock::new());
    let inside = Arc::new(AtomicUsize::new(0));

    let bodies = (0..3)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let inside = Arc::clone(&inside);
            thread(move |cpu| {
                for depth in 1..=3 {
                    lock.acquire(cpu);
                    assert_eq!(lock.recursion(), depth);
                    if depth == 1 {
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    }
                    cpu.yield_now();
                }
                for depth in (1..=3).rev() {
                    assert_eq!(lock.recursion(), depth);
                    if depth == 1 {
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                    lock.release(cpu);
                    cpu.yield_now();
                }
            })
        })
        .collect();
    Cpu::run(bodies);

    assert!(!lock.is_held());
    assert_eq!(lock.recursion(), 0);
}

#[test]
#[should_panic(expected = "does not hold it")]
fn release_by_other_thread_is_fatal() {
    let lock = Arc::new(Lock::new());

    let owner = {
        let lock = Arc::clone(&lock);
        thread(move |cpu| {
            lock.acquire(cpu);
            cpu.yield_now();
            lock.release(cpu);
        })
    };
    let intruder = {
        let lock = Arc::clone(&lock);
        thread(move |cpu| lock.release(cpu))
    };
    Cpu::run(vec![owner, intruder]);
}
