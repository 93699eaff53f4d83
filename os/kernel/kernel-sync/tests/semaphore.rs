mod common;

use common::{Body, Cpu, Tid, Trace};
use kernel_sync::{IntrStatus, Interrupts, Scheduler, Semaphore};
use std::sync::Arc;

fn thread(f: impl FnOnce(&Cpu) + Send + 'static) -> Body {
    Box::new(f)
}

#[test]
fn binary_semaphore_admits_one_thread_at_a_time() {
    let sem = Arc::new(Semaphore::new(1));
    let trace = Trace::default();

    let bodies = (0..4)
        .map(|i| {
            let sem = Arc::clone(&sem);
            let trace = trace.clone();
            thread(move |cpu| {
                for round in 0..3 {
                    sem.down(cpu);
                    trace.push(format!("enter {i}"));
                    // Give everyone else a chance to pile up on the semaphore.
                    cpu.yield_now();
                    trace.push(format!("leave {i}"));
                    sem.up(cpu);
                    if round % 2 == 0 {
                        cpu.yield_now();
                    }
                }
            })
        })
        .collect();
    Cpu::run(bodies);

    let events = trace.events();
    assert_eq!(events.len(), 4 * 3 * 2);
    for pair in events.chunks(2) {
        let who = pair[0].strip_prefix("enter ").expect("enter first");
        assert_eq!(pair[1], format!("leave {who}"));
    }
    assert_eq!(sem.value(), 1);
    assert_eq!(sem.waiters(), 0);
}

#[test]
fn up_wakes_the_longest_waiter() {
    let sem = Arc::new(Semaphore::new(1));
    let trace = Trace::default();

    let mut bodies = Vec::new();
    {
        let sem = Arc::clone(&sem);
        bodies.push(thread(move |cpu| {
            sem.down(cpu);
            cpu.yield_now();
            // Threads 1, 2 and 3 queued behind us in start order.
            assert_eq!(sem.waiters(), 3);
            assert_eq!(cpu.blocked(), 3);
            sem.up(cpu);
        }));
    }
    for i in 1..4 {
        let sem = Arc::clone(&sem);
        let trace = trace.clone();
        bodies.push(thread(move |cpu| {
            sem.down(cpu);
            trace.push(format!("{i}"));
            sem.up(cpu);
        }));
    }
    Cpu::run(bodies);

    assert_eq!(trace.events(), ["1", "2", "3"]);
}

#[test]
fn woken_thread_competes_again() {
    let sem = Arc::new(Semaphore::new(1));
    let trace = Trace::default();

    let mut bodies = Vec::new();
    {
        let sem = Arc::clone(&sem);
        bodies.push(thread(move |cpu| {
            sem.down(cpu);
            cpu.yield_now();
            // Wake thread 1, then take the count back before it runs.
            sem.up(cpu);
            sem.down(cpu);
            cpu.yield_now();
            // Thread 1 found the count at zero and queued again, behind 2 and 3.
            assert_eq!(sem.waiters(), 3);
            sem.up(cpu);
        }));
    }
    for i in 1..4 {
        let sem = Arc::clone(&sem);
        let trace = trace.clone();
        bodies.push(thread(move |cpu| {
            sem.down(cpu);
            trace.push(format!("{i}"));
            sem.up(cpu);
        }));
    }
    Cpu::run(bodies);

    assert_eq!(trace.events(), ["2", "3", "1"]);
}

#[test]
fn interrupt_state_survives_blocking() {
    let sem = Arc::new(Semaphore::new(1));

    let holder = {
        let sem = Arc::clone(&sem);
        thread(move |cpu| {
            sem.down(cpu);
            cpu.yield_now();
            sem.up(cpu);
        })
    };
    let enabled = {
        let sem = Arc::clone(&sem);
        thread(move |cpu| {
            assert_eq!(cpu.status(), IntrStatus::On);
            sem.down(cpu);
            assert_eq!(cpu.status(), IntrStatus::On);
            sem.up(cpu);
            assert_eq!(cpu.status(), IntrStatus::On);
        })
    };
    let disabled = {
        let sem = Arc::clone(&sem);
        thread(move |cpu| {
            cpu.disable();
            sem.down(cpu);
            assert_eq!(cpu.status(), IntrStatus::Off);
            sem.up(cpu);
            assert_eq!(cpu.status(), IntrStatus::Off);
        })
    };
    Cpu::run(vec![holder, enabled, disabled]);
}

#[test]
fn counting_down_from_zero_waits_for_up() {
    let sem = Arc::new(Semaphore::new(0));
    let trace = Trace::default();

    let waiter = {
        let sem = Arc::clone(&sem);
        let trace = trace.clone();
        thread(move |cpu| {
            sem.down(cpu);
            trace.push(format!("{:?} woke", cpu.running_thread()));
        })
    };
    let signaller = {
        let sem = Arc::clone(&sem);
        let trace = trace.clone();
        thread(move |cpu| {
            trace.push("signal");
            sem.up(cpu);
        })
    };
    Cpu::run(vec![waiter, signaller]);

    let woke = format!("{:?} woke", Tid(0));
    assert_eq!(trace.events(), ["signal", woke.as_str()]);
    assert_eq!(sem.value(), 0);
}

#[test]
#[should_panic(expected = "halted")]
fn missing_up_blocks_forever() {
    let sem = Arc::new(Semaphore::new(0));
    let s = Arc::clone(&sem);
    Cpu::run(vec![thread(move |cpu| s.down(cpu))]);
}
