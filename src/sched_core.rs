/*
 * Scheduler Core - Mechanism Layer
 *
 * This module implements Scheduler, the mechanism that:
 * 1. Holds the active scheduling policy (Box<dyn SchedPolicy>)
 * 2. Owns the task arena, the ready buckets and the parked store
 * 3. Maintains the single running slot via the rendezvous
 * 4. Runs the schedule_me entry-point state machine
 * 5. Answers non-destructive statistics queries
 *
 * LOCKING DISCIPLINE:
 * ==================
 *
 * Two lock domains plus a leaf:
 *
 * - core:       Mutex<CoreState> guarding the arena, ready buckets and
 *               parked store as one unit (cross-bucket answers must be
 *               consistent, so exclusion is over the whole structure)
 * - rendezvous: Mutex<Rendezvous> + Condvar guarding the running slot
 * - clock:      leaf mutex inside SimClock, never held across the others
 *
 * Fixed nesting order: core before rendezvous, always. Waiters block on
 * the rendezvous lock only, so a thread parked in schedule_me never holds
 * the core lock and every structural mutation can complete.
 *
 * RENDEZVOUS:
 * ==========
 *
 * The running slot is a designation over the ready structure: the
 * candidate is the head of the first non-empty bucket, recomputed by
 * refresh() after every insert, removal and demotion. Whenever the
 * candidate changes identity the previous record is charged one
 * preemption, unless it had no work left (a finished record that was
 * deliberately removed was not preempted) or the mutation already
 * accounted for it (demotion). Every refresh notifies all waiters; each
 * waiter re-checks "am I the running record" before proceeding.
 */

use parking_lot::{Condvar, Mutex};

use crate::clock::SimClock;
use crate::error::SchedError;
use crate::policies::{self, PolicyKind, SchedPolicy};
use crate::ready::ReadyQueues;
use crate::task::{Residence, TaskHandle, TaskTable};
use crate::NUM_PRIO;

/// Structural state: everything the policy engine shapes.
///
/// Guarded as a single unit so "who is now highest priority" is always
/// consistent with the bucket contents.
#[derive(Debug)]
struct CoreState {
    /// Every record ever observed, addressed by handle.
    table: TaskTable,

    /// Policy-shaped buckets of records eligible to run.
    ready: ReadyQueues,

    /// Records that finished; stats stay queryable here.
    parked: Vec<TaskHandle>,

    /// Number of CPU grants completed (one per schedule_me return).
    dispatches: u64,
}

/// The single running slot.
#[derive(Debug)]
struct Rendezvous {
    running: Option<TaskHandle>,
}

/// Simulated single-CPU scheduler.
///
/// Construct one per simulation with [`Scheduler::new`]; worker threads
/// share it behind an `Arc` and call [`Scheduler::schedule_me`] to obtain
/// the virtual CPU. The discipline is fixed at construction.
pub struct Scheduler {
    /// The active scheduling policy (chosen once, never swapped).
    policy: Box<dyn SchedPolicy>,

    /// Monotonic simulated time.
    clock: SimClock,

    core: Mutex<CoreState>,

    rendezvous: Mutex<Rendezvous>,

    /// Signaled by every refresh(); paired with the rendezvous mutex.
    granted: Condvar,
}

impl Scheduler {
    /// Create a scheduler running the given discipline.
    pub fn new(kind: PolicyKind) -> Self {
        let policy = policies::make_policy(kind);
        log::info!("[sched] initialized with policy {}", policy.name());

        let ready = ReadyQueues::new(policy.bucket_count());
        Self {
            policy,
            clock: SimClock::new(),
            core: Mutex::new(CoreState {
                table: TaskTable::new(),
                ready,
                parked: Vec::new(),
                dispatches: 0,
            }),
            rendezvous: Mutex::new(Rendezvous { running: None }),
            granted: Condvar::new(),
        }
    }

    /// Create a scheduler from a wire-level policy id (0..=3).
    ///
    /// Fails fast on an out-of-range id.
    pub fn from_policy_id(id: i32) -> Result<Self, SchedError> {
        Ok(Self::new(PolicyKind::from_id(id)?))
    }

    /// Name of the active discipline.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    // ========================================================================
    // ENTRY POINT
    // ========================================================================

    /// Request a turn on the virtual CPU.
    ///
    /// The calling thread reports its own simulated state: `current_time`
    /// at which it arrives, its stable `tid`, how many work units it has
    /// left, and its priority (PBS reads it on every call; the other
    /// disciplines only at first sight or on re-arrival). The call blocks
    /// until this task's record becomes the running record, then updates
    /// wait-time and quantum accounting. `remaining_work == 0` retires the
    /// record into the parked store.
    ///
    /// # Returns
    /// The simulated time at which this dispatch completed, in whole ticks.
    pub fn schedule_me(
        &self,
        current_time: f64,
        tid: i32,
        remaining_work: i32,
        priority: i32,
    ) -> i32 {
        self.clock.advance(current_time);

        let handle = self.arrive(current_time, tid, remaining_work, priority);
        self.wait_for_cpu(handle);
        self.account_grant(handle)
    }

    /// ARRIVING/QUEUED phases: resolve the caller's record, place it in the
    /// ready structure if it is not already running, and run MLFQ demotion
    /// if the previous quantum is exhausted.
    fn arrive(&self, current_time: f64, tid: i32, remaining_work: i32, priority: i32) -> TaskHandle {
        let mut guard = self.core.lock();
        let core = &mut *guard;

        let handle = match core.table.lookup(tid) {
            Some(handle) if self.is_running(handle) => {
                // Still holds the CPU: update the burst in place, no
                // structural change.
                core.table.get_mut(handle).remaining_work = remaining_work;
                handle
            }
            Some(handle) => match core.table.get(handle).residence {
                Residence::Parked => {
                    self.unpark(core, handle);
                    let prio = policies::clamp_priority(priority);
                    let pcb = core.table.get_mut(handle);
                    pcb.arrival_time = current_time;
                    pcb.remaining_work = remaining_work;
                    pcb.priority = prio;
                    pcb.residence = Residence::Ready;
                    log::debug!("[sched] tid {tid} re-arrived at t={current_time}");
                    self.policy.enqueue(&mut core.table, &mut core.ready, handle);
                    self.refresh(core, None);
                    handle
                }
                Residence::Ready => {
                    // Preempted between calls: the record is already queued,
                    // just refresh the reported burst and wait.
                    core.table.get_mut(handle).remaining_work = remaining_work;
                    handle
                }
            },
            None => {
                let prio = policies::clamp_priority(priority);
                let handle = core.table.create(tid, current_time, remaining_work, prio);
                log::debug!("[sched] new task tid {tid} at t={current_time} (work {remaining_work}, prio {prio})");
                self.policy.enqueue(&mut core.table, &mut core.ready, handle);
                self.refresh(core, None);
                handle
            }
        };

        // MLFQ: a record that used up its last quantum must requeue one
        // level down before it is reconsidered.
        if self.policy.uses_quantum() {
            let pcb = core.table.get(handle);
            if pcb.quantum_remaining == 0
                && pcb.remaining_work > 0
                && pcb.residence == Residence::Ready
            {
                self.demote(core, handle);
            }
        }

        handle
    }

    /// Block until this record is the running record.
    ///
    /// The single suspension point in the whole core. Holds only the
    /// rendezvous lock; the condvar releases it while parked, and every
    /// refresh() wakes all waiters for a re-check.
    fn wait_for_cpu(&self, handle: TaskHandle) {
        let mut rdv = self.rendezvous.lock();
        while rdv.running != Some(handle) {
            self.granted.wait(&mut rdv);
        }
    }

    /// RUNNING/DONE phases: quantum and wait accounting, then removal if
    /// the task reported no work left.
    fn account_grant(&self, handle: TaskHandle) -> i32 {
        let mut guard = self.core.lock();
        let core = &mut *guard;

        if self.policy.uses_quantum() {
            let pcb = core.table.get_mut(handle);
            pcb.quantum_remaining = pcb.quantum_remaining.saturating_sub(1);
        }

        let now = self.clock.now();
        let pcb = core.table.get_mut(handle);
        let waited = now - pcb.arrival_time;
        if waited > 0.0 {
            pcb.accumulated_wait += waited;
        }
        // Re-anchor so the same interval is never counted twice.
        pcb.arrival_time = now;

        core.dispatches += 1;

        if pcb.remaining_work == 0 {
            self.remove_running(core, handle);
        }

        now as i32
    }

    // ========================================================================
    // STRUCTURAL MUTATIONS
    // ========================================================================

    /// Recompute the running candidate after a structural mutation.
    ///
    /// Charges the previous record one preemption when the candidate
    /// changes identity, unless the previous record had no work left or is
    /// `skip` (a demotion that already counted itself). Wakes all waiters
    /// on any change.
    fn refresh(&self, core: &mut CoreState, skip: Option<TaskHandle>) {
        let candidate = core.ready.head();
        let mut rdv = self.rendezvous.lock();

        if rdv.running == candidate {
            return;
        }

        if let Some(prev) = rdv.running {
            let pcb = core.table.get(prev);
            if pcb.remaining_work > 0 && Some(prev) != skip {
                core.table.get_mut(prev).preemption_count += 1;
                log::debug!(
                    "[sched] tid {} preempted (count {})",
                    core.table.get(prev).tid,
                    core.table.get(prev).preemption_count
                );
            }
        }

        rdv.running = candidate;
        self.granted.notify_all();
    }

    /// Detach a finished record from the ready structure and park it.
    fn remove_running(&self, core: &mut CoreState, handle: TaskHandle) {
        let bucket = self.policy.bucket_of(&core.table, handle);
        core.ready.unlink(bucket, handle);

        let pcb = core.table.get_mut(handle);
        pcb.residence = Residence::Parked;
        log::debug!("[sched] tid {} finished, parked", pcb.tid);
        core.parked.push(handle);

        self.refresh(core, Some(handle));
    }

    /// MLFQ demotion: one level down, fresh quantum, one preemption.
    ///
    /// At the bottom bucket the priority stays put and the record simply
    /// rotates to the tail, which yields FIFO round-robin among the
    /// longest-running tasks.
    fn demote(&self, core: &mut CoreState, handle: TaskHandle) {
        let bucket = self.policy.bucket_of(&core.table, handle);
        core.ready.unlink(bucket, handle);

        let pcb = core.table.get_mut(handle);
        if pcb.priority < NUM_PRIO {
            pcb.priority += 1;
        }
        pcb.quantum_remaining = crate::MLFQ_QUANTUM;
        pcb.preemption_count += 1;
        let new_bucket = pcb.priority - 1;
        log::debug!("[mlfq] tid {} demoted to priority {}", pcb.tid, pcb.priority);
        core.ready.push_back(new_bucket, handle);

        self.refresh(core, Some(handle));
    }

    /// Pull a record out of the parked store.
    ///
    /// # Panics
    /// If the record is not parked: its residence field disagrees with the
    /// store contents, which is a core bug.
    fn unpark(&self, core: &mut CoreState, handle: TaskHandle) {
        match core.parked.iter().position(|&h| h == handle) {
            Some(pos) => {
                core.parked.swap_remove(pos);
            }
            None => panic!("scheduler invariant violated: handle {handle:?} marked parked but absent from parked store"),
        }
    }

    /// Whether a record currently holds the running slot.
    ///
    /// Caller holds the core lock; taking the rendezvous lock here follows
    /// the fixed nesting order.
    fn is_running(&self, handle: TaskHandle) -> bool {
        self.rendezvous.lock().running == Some(handle)
    }

    // ========================================================================
    // STATISTICS QUERIES
    // ========================================================================

    /// Preemption count for a task, if the id has been seen.
    ///
    /// Non-destructive: the record stays wherever it currently lives.
    pub fn try_preemption_count(&self, tid: i32) -> Option<u32> {
        let core = self.core.lock();
        core.table
            .lookup(tid)
            .map(|h| core.table.get(h).preemption_count)
    }

    /// Preemption count with the wire-level sentinel: -1 for an unknown id.
    pub fn preemption_count(&self, tid: i32) -> i32 {
        self.try_preemption_count(tid)
            .map(|n| n as i32)
            .unwrap_or(-1)
    }

    /// Accumulated wait time for a task, if the id has been seen.
    pub fn try_wait_time(&self, tid: i32) -> Option<f64> {
        let core = self.core.lock();
        core.table
            .lookup(tid)
            .map(|h| core.table.get(h).accumulated_wait)
    }

    /// Wait time with the wire-level sentinel: -0.1 for an unknown id.
    pub fn wait_time(&self, tid: i32) -> f64 {
        self.try_wait_time(tid).unwrap_or(-0.1)
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Task id currently holding the virtual CPU, if any.
    pub fn running_tid(&self) -> Option<i32> {
        let core = self.core.lock();
        let rdv = self.rendezvous.lock();
        rdv.running.map(|h| core.table.get(h).tid)
    }

    /// Number of task ids ever observed.
    pub fn known_tasks(&self) -> usize {
        self.core.lock().table.len()
    }

    /// Number of CPU grants completed so far.
    pub fn dispatch_count(&self) -> u64 {
        self.core.lock().dispatches
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("policy", &self.policy.name())
            .field("now", &self.clock.now())
            .finish()
    }
}
