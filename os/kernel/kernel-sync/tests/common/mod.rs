//! A uniprocessor model for the blocking primitives.
//!
//! Every simulated kernel thread is a `std` thread, but only the one holding
//! the CPU token runs. `block` and `yield_now` hand the token to the next
//! ready thread; `unblock` only queues. Each thread keeps its own interrupt
//! flag, saved and restored on every switch like `EFLAGS` on a context
//! switch. Threads start with interrupts enabled.

#![allow(dead_code)]

use kernel_sync::{IntrStatus, Interrupts, Scheduler, ThreadStatus};
use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Tid(pub usize);

#[derive(Default)]
struct State {
    running: Option<Tid>,
    ready: VecDeque<Tid>,
    blocked: HashSet<Tid>,
    saved_intr: HashMap<Tid, IntrStatus>,
    intr: Option<IntrStatus>,
    halted: bool,
}

pub struct Cpu {
    state: Mutex<State>,
    cv: Condvar,
    first_panic: Mutex<Option<Box<dyn Any + Send>>>,
}

pub type Body = Box<dyn FnOnce(&Cpu) + Send>;

impl Cpu {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `bodies` as threads `Tid(0)`, `Tid(1)`, ... in that start order
    /// until all have finished. The first panic of any thread is re-raised.
    pub fn run(bodies: Vec<Body>) {
        let cpu = Arc::new(Self {
            state: Mutex::new(State::default()),
            cv: Condvar::new(),
            first_panic: Mutex::new(None),
        });
        {
            let mut s = cpu.lock();
            s.ready = (0..bodies.len()).map(Tid).collect();
            s.running = s.ready.pop_front();
        }

        let handles: Vec<_> = bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                let cpu = Arc::clone(&cpu);
                thread::spawn(move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        cpu.wait_for_cpu(Tid(i));
                        body(&cpu);
                    }));
                    if let Err(payload) = result {
                        let mut first = cpu
                            .first_panic
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        if first.is_none() {
                            *first = Some(payload);
                        }
                        drop(first);
                        cpu.exit(Tid(i), true);
                    } else {
                        cpu.exit(Tid(i), false);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("simulated thread escaped its harness");
        }
        let first_panic = cpu
            .first_panic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    fn wait_for_cpu(&self, tid: Tid) {
        let mut s = self.lock();
        loop {
            assert!(!s.halted, "simulated CPU halted while {tid:?} was waiting");
            if s.running == Some(tid) {
                break;
            }
            s = self.cv.wait(s).unwrap_or_else(PoisonError::into_inner);
        }
        s.intr = Some(s.saved_intr.remove(&tid).unwrap_or(IntrStatus::On));
    }

    /// Pass the CPU to the next ready thread. Caller has saved its own state.
    fn switch_away(&self, mut s: MutexGuard<'_, State>) {
        s.running = s.ready.pop_front();
        if s.running.is_none() && !s.blocked.is_empty() {
            s.halted = true;
        }
        drop(s);
        self.cv.notify_all();
    }

    fn exit(&self, tid: Tid, panicked: bool) {
        let mut s = self.lock();
        if panicked {
            s.halted = true;
        }
        if s.running == Some(tid) {
            self.switch_away(s);
        } else {
            drop(s);
            self.cv.notify_all();
        }
    }

    fn current(&self) -> Tid {
        self.lock().running.expect("no thread on the CPU")
    }

    /// Let the next ready thread run; come back after it blocks, yields or exits.
    pub fn yield_now(&self) {
        let tid = self.current();
        {
            let mut s = self.lock();
            let intr = s.intr.unwrap_or(IntrStatus::On);
            s.saved_intr.insert(tid, intr);
            s.ready.push_back(tid);
            self.switch_away(s);
        }
        self.wait_for_cpu(tid);
    }

    /// Threads currently blocked.
    pub fn blocked(&self) -> usize {
        self.lock().blocked.len()
    }
}

impl Interrupts for Cpu {
    fn status(&self) -> IntrStatus {
        self.lock().intr.unwrap_or(IntrStatus::On)
    }

    fn enable(&self) -> IntrStatus {
        self.lock().intr.replace(IntrStatus::On).unwrap_or(IntrStatus::On)
    }

    fn disable(&self) -> IntrStatus {
        self.lock().intr.replace(IntrStatus::Off).unwrap_or(IntrStatus::On)
    }
}

impl Scheduler for Cpu {
    type Thread = Tid;

    fn running_thread(&self) -> Tid {
        self.current()
    }

    fn block(&self, reason: ThreadStatus) {
        assert_eq!(reason, ThreadStatus::Blocked);
        let tid = self.current();
        {
            let mut s = self.lock();
            assert_eq!(s.intr, Some(IntrStatus::Off), "blocking with interrupts on");
            s.saved_intr.insert(tid, IntrStatus::Off);
            s.blocked.insert(tid);
            self.switch_away(s);
        }
        self.wait_for_cpu(tid);
    }

    fn unblock(&self, thread: Tid) {
        let mut s = self.lock();
        assert!(s.blocked.remove(&thread), "{thread:?} was not blocked");
        s.ready.push_back(thread);
    }
}

/// Shared, ordered event log.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
