/*
 * Scheduling Policy Engine
 *
 * This module separates scheduling policy from mechanism:
 *
 * - SchedPolicy: the policy interface the four disciplines implement
 * - PolicyKind: the discipline selector, chosen once at initialization
 *
 * The scheduler core (mechanism) holds a Box<dyn SchedPolicy> and asks it
 * where each arriving record belongs. Policies only shape the ready
 * structure; the rendezvous, the clock and all counter accounting stay in
 * the mechanism, so swapping disciplines never touches the core.
 */

use std::collections::VecDeque;

use crate::NUM_PRIO;
use crate::error::SchedError;
use crate::ready::ReadyQueues;
use crate::task::{TaskHandle, TaskTable};

mod fcfs;
mod mlfq;
mod pbs;
mod srtf;

pub use fcfs::Fcfs;
pub use mlfq::Mlfq;
pub use pbs::Pbs;
pub use srtf::Srtf;

/// The four interchangeable scheduling disciplines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// First-Come-First-Served: strict arrival order.
    Fcfs,
    /// Shortest-Remaining-Time-First: least work left runs first.
    Srtf,
    /// Priority-Based Scheduling: caller-supplied priority buckets.
    Pbs,
    /// Multi-Level Feedback Queue: quantum-driven demotion.
    Mlfq,
}

impl PolicyKind {
    /// Decode the wire-level policy id used by `init_scheduler`.
    ///
    /// Fails fast on out-of-range ids; misconfiguration is caught at
    /// initialization, never mid-run.
    pub fn from_id(id: i32) -> Result<Self, SchedError> {
        match id {
            0 => Ok(PolicyKind::Fcfs),
            1 => Ok(PolicyKind::Srtf),
            2 => Ok(PolicyKind::Pbs),
            3 => Ok(PolicyKind::Mlfq),
            other => Err(SchedError::UnknownPolicy(other)),
        }
    }

    /// The wire-level id for this discipline.
    pub fn id(self) -> i32 {
        match self {
            PolicyKind::Fcfs => 0,
            PolicyKind::Srtf => 1,
            PolicyKind::Pbs => 2,
            PolicyKind::Mlfq => 3,
        }
    }
}

/// Scheduling policy trait.
///
/// Each discipline decides how many buckets the ready structure needs,
/// where an arriving record is placed, and which bucket currently holds a
/// queued record. Policies never touch the rendezvous or the counters.
pub trait SchedPolicy: Send + Sync {
    /// Policy name for logging.
    fn name(&self) -> &'static str;

    /// Number of ready buckets this discipline uses (1 or NUM_PRIO).
    fn bucket_count(&self) -> usize;

    /// Place a record into the ready structure per the discipline's
    /// insertion rule. The record's fields (priority, remaining work) have
    /// already been refreshed from the triggering call.
    fn enqueue(&self, table: &mut TaskTable, ready: &mut ReadyQueues, handle: TaskHandle);

    /// Which bucket currently holds a queued record.
    ///
    /// Single-bucket disciplines always answer 0; the bucketed disciplines
    /// derive it from the record's current priority.
    fn bucket_of(&self, _table: &TaskTable, _handle: TaskHandle) -> usize {
        0
    }

    /// Whether this discipline runs quantum accounting and demotion.
    fn uses_quantum(&self) -> bool {
        false
    }
}

/// Build the policy engine for a discipline.
pub fn make_policy(kind: PolicyKind) -> Box<dyn SchedPolicy> {
    match kind {
        PolicyKind::Fcfs => Box::new(Fcfs),
        PolicyKind::Srtf => Box::new(Srtf),
        PolicyKind::Pbs => Box::new(Pbs),
        PolicyKind::Mlfq => Box::new(Mlfq),
    }
}

/// Clamp a caller-supplied priority into `1..=NUM_PRIO`.
///
/// An out-of-range priority is caller sloppiness, not a core bug, so it is
/// repaired with a warning instead of aborting; indexing buckets with the
/// raw value would walk off the array.
pub(crate) fn clamp_priority(tprio: i32) -> usize {
    if tprio < 1 {
        log::warn!("[policy] priority {tprio} below range, clamping to 1");
        1
    } else if tprio as usize > NUM_PRIO {
        log::warn!("[policy] priority {tprio} above range, clamping to {NUM_PRIO}");
        NUM_PRIO
    } else {
        tprio as usize
    }
}

/// Insertion point for an ordered bucket, ascending by remaining work.
///
/// Strict comparison keeps earlier-arriving records ahead of later ones
/// with equal remaining work.
pub(crate) fn ordered_position(
    table: &TaskTable,
    bucket: &VecDeque<TaskHandle>,
    remaining_work: i32,
) -> usize {
    bucket
        .iter()
        .position(|&h| table.get(h).remaining_work > remaining_work)
        .unwrap_or(bucket.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_id_round_trip() {
        for id in 0..=3 {
            assert_eq!(PolicyKind::from_id(id).unwrap().id(), id);
        }
    }

    #[test]
    fn test_unknown_policy_id_is_rejected() {
        assert_eq!(PolicyKind::from_id(4), Err(SchedError::UnknownPolicy(4)));
        assert_eq!(PolicyKind::from_id(-1), Err(SchedError::UnknownPolicy(-1)));
    }

    #[test]
    fn test_priority_clamping() {
        assert_eq!(clamp_priority(0), 1);
        assert_eq!(clamp_priority(3), 3);
        assert_eq!(clamp_priority(99), NUM_PRIO);
    }

    #[test]
    fn test_ordered_position_keeps_earlier_ties_ahead() {
        let mut table = TaskTable::new();
        let a = table.create(1, 0.0, 4, 1);
        let b = table.create(2, 0.0, 4, 1);
        let mut bucket = VecDeque::new();
        bucket.push_back(a);
        bucket.push_back(b);

        // Equal remaining work lands behind both existing records.
        assert_eq!(ordered_position(&table, &bucket, 4), 2);
        // Strictly shorter work goes to the front.
        assert_eq!(ordered_position(&table, &bucket, 1), 0);
    }
}
