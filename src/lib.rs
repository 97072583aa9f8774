//! Simulated single-CPU scheduler driven by concurrent worker threads.
//!
//! Each worker thread represents one simulated task. It repeatedly asks the
//! scheduler "may I run now, given I have `R` units of work left and
//! priority `P`?" and blocks until granted the virtual CPU. Four
//! interchangeable disciplines are provided: FCFS, SRTF, PBS and MLFQ.
//!
//! The core is purely reactive: there is no scheduler loop, only caller
//! invocations mutating shared state under a fixed locking discipline. The
//! preferred API is an explicit [`Scheduler`] instance shared behind an
//! `Arc`, which keeps simulations independent and tests deterministic:
//!
//! ```
//! use simsched::{PolicyKind, Scheduler};
//!
//! let sched = Scheduler::new(PolicyKind::Fcfs);
//! let mut t = 0.0;
//! for rem in (0..=3).rev() {
//!     t = sched.schedule_me(t, 7, rem, 1) as f64 + 1.0;
//! }
//! assert_eq!(sched.preemption_count(7), 0);
//! assert_eq!(sched.wait_time(99), -0.1); // unknown id sentinel
//! ```
//!
//! A process-global convenience surface mirroring the classic C-style API
//! (`init_scheduler` / `schedule_me` / `preemption_count` / `wait_time`)
//! is provided for harnesses that expect free functions.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

mod clock;
mod error;
mod policies;
mod ready;
mod sched_core;
mod task;

pub use clock::SimClock;
pub use error::SchedError;
pub use policies::{PolicyKind, SchedPolicy};
pub use ready::ReadyQueues;
pub use sched_core::Scheduler;
pub use task::{Pcb, Residence, TaskHandle, TaskTable};

/// Number of priority levels; priority 1 is the most urgent.
pub const NUM_PRIO: usize = 5;

/// MLFQ time quantum at the highest priority, in ticks.
pub const MLFQ_QUANTUM: u32 = 5;

lazy_static! {
    /// Process-global scheduler instance for the C-style API.
    static ref GLOBAL_SCHEDULER: Mutex<Option<Arc<Scheduler>>> = Mutex::new(None);
}

fn global() -> Option<Arc<Scheduler>> {
    GLOBAL_SCHEDULER.lock().clone()
}

/// Initialize the process-global scheduler with a wire-level policy id
/// (0 = FCFS, 1 = SRTF, 2 = PBS, 3 = MLFQ).
///
/// Must be called exactly once before any global [`schedule_me`] call.
pub fn init_scheduler(policy_id: i32) -> Result<(), SchedError> {
    let kind = PolicyKind::from_id(policy_id)?;
    let mut slot = GLOBAL_SCHEDULER.lock();
    if slot.is_some() {
        return Err(SchedError::AlreadyInitialized);
    }
    *slot = Some(Arc::new(Scheduler::new(kind)));
    Ok(())
}

/// Global-instance counterpart of [`Scheduler::schedule_me`].
///
/// # Panics
/// If [`init_scheduler`] has not been called; using the entry point before
/// initialization is a harness bug, not a recoverable condition.
pub fn schedule_me(current_time: f64, tid: i32, remaining_work: i32, priority: i32) -> i32 {
    match global() {
        Some(sched) => sched.schedule_me(current_time, tid, remaining_work, priority),
        None => panic!("{}", SchedError::NotInitialized),
    }
}

/// Global-instance counterpart of [`Scheduler::preemption_count`].
///
/// Returns the unknown-id sentinel (-1) when the scheduler has not been
/// initialized, matching the "never seen" semantics.
pub fn preemption_count(tid: i32) -> i32 {
    global().map(|s| s.preemption_count(tid)).unwrap_or(-1)
}

/// Global-instance counterpart of [`Scheduler::wait_time`].
///
/// Returns the unknown-id sentinel (-0.1) when the scheduler has not been
/// initialized.
pub fn wait_time(tid: i32) -> f64 {
    global().map(|s| s.wait_time(tid)).unwrap_or(-0.1)
}
