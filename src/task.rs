/*
 * Task Record Store
 *
 * This module defines the per-task bookkeeping record (PCB) and the arena
 * that owns every record the scheduler has ever seen.
 *
 * Records live in a grow-only arena and are addressed by stable
 * `TaskHandle`s. Queues and stores hold handles, never the records
 * themselves, so a record keeps its identity across every
 * insert/remove/demote cycle and historical statistics queries always
 * resolve, even after the task has finished.
 */

use std::collections::HashMap;

use crate::NUM_PRIO;

/// Stable handle into the task arena.
///
/// Handles are never invalidated: records are created once per task id and
/// never deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub(crate) usize);

impl TaskHandle {
    /// Get the handle as a usize for indexing.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which store currently holds a record.
///
/// A record is a member of exactly one store at any time. The running slot
/// is a designation over the ready structure's head, not a third container:
/// the running record stays at its queue position until it finishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Residence {
    /// Eligible to run; the record sits in one of the ready buckets.
    Ready,
    /// Finished (or otherwise set aside); stats remain queryable.
    Parked,
}

/// Per-task bookkeeping record.
///
/// One exists per task id ever observed. Counters (`accumulated_wait`,
/// `preemption_count`) are only ever incremented for the lifetime of the
/// record.
#[derive(Debug, Clone)]
pub struct Pcb {
    /// Caller-supplied task identifier (equality key).
    pub tid: i32,

    /// Current scheduling priority, `1..=NUM_PRIO`; 1 is most urgent.
    pub priority: usize,

    /// Caller-reported remaining work; 0 signals completion.
    pub remaining_work: i32,

    /// Simulated time at which the record most recently entered the ready
    /// structure (re-anchored at every CPU grant).
    pub arrival_time: f64,

    /// Total simulated time spent waiting, across the whole lifetime.
    pub accumulated_wait: f64,

    /// Times this record lost the CPU while still having work left.
    pub preemption_count: u32,

    /// MLFQ only: ticks left before forced demotion.
    pub quantum_remaining: u32,

    /// Which store currently holds the record.
    pub residence: Residence,
}

/// Arena of task records, indexed by `TaskHandle`.
///
/// The arena grows for every new task id and never shrinks. It also owns
/// the id-to-handle map used by the entry point and the statistics queries.
#[derive(Debug)]
pub struct TaskTable {
    records: Vec<Pcb>,
    by_tid: HashMap<i32, TaskHandle>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            by_tid: HashMap::new(),
        }
    }

    /// Look up the handle for a task id, if the id has been seen before.
    pub fn lookup(&self, tid: i32) -> Option<TaskHandle> {
        self.by_tid.get(&tid).copied()
    }

    /// Create a fresh record for a never-before-seen task id.
    ///
    /// Counters start at zero and `quantum_remaining` starts at 0; the
    /// policy's enqueue rule resets the quantum where it applies.
    ///
    /// # Panics
    /// If a record for `tid` already exists (core bug, not caller misuse).
    pub fn create(
        &mut self,
        tid: i32,
        arrival_time: f64,
        remaining_work: i32,
        priority: usize,
    ) -> TaskHandle {
        if self.by_tid.contains_key(&tid) {
            panic!("scheduler invariant violated: duplicate record for tid {tid}");
        }
        debug_assert!((1..=NUM_PRIO).contains(&priority));

        let handle = TaskHandle(self.records.len());
        self.records.push(Pcb {
            tid,
            priority,
            remaining_work,
            arrival_time,
            accumulated_wait: 0.0,
            preemption_count: 0,
            quantum_remaining: 0,
            residence: Residence::Ready,
        });
        self.by_tid.insert(tid, handle);
        handle
    }

    /// Borrow a record.
    ///
    /// # Panics
    /// On a stale handle, which indicates a core bug.
    pub fn get(&self, handle: TaskHandle) -> &Pcb {
        match self.records.get(handle.0) {
            Some(pcb) => pcb,
            None => panic!("scheduler invariant violated: stale task handle {handle:?}"),
        }
    }

    /// Mutably borrow a record.
    ///
    /// # Panics
    /// On a stale handle, which indicates a core bug.
    pub fn get_mut(&mut self, handle: TaskHandle) -> &mut Pcb {
        match self.records.get_mut(handle.0) {
            Some(pcb) => pcb,
            None => panic!("scheduler invariant violated: stale task handle {handle:?}"),
        }
    }

    /// Number of task ids ever observed.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over every handle ever created.
    pub fn handles(&self) -> impl Iterator<Item = TaskHandle> + '_ {
        (0..self.records.len()).map(TaskHandle)
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}
