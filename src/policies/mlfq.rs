/*
 * Multi-Level Feedback Queue Policy
 *
 * NUM_PRIO buckets. Every (re)insertion lands at the tail of the most
 * urgent bucket with a fresh time quantum, regardless of where the record
 * sat before it was parked. Demotion itself lives in the mechanism: when a
 * record exhausts its quantum, the core unlinks it from its bucket and
 * re-appends it one level down (see Scheduler::demote).
 */

use super::SchedPolicy;
use crate::{MLFQ_QUANTUM, NUM_PRIO};
use crate::ready::ReadyQueues;
use crate::task::{TaskHandle, TaskTable};

pub struct Mlfq;

impl SchedPolicy for Mlfq {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn bucket_count(&self) -> usize {
        NUM_PRIO
    }

    fn enqueue(&self, table: &mut TaskTable, ready: &mut ReadyQueues, handle: TaskHandle) {
        let pcb = table.get_mut(handle);
        pcb.priority = 1;
        pcb.quantum_remaining = MLFQ_QUANTUM;
        ready.push_back(0, handle);
    }

    fn bucket_of(&self, table: &TaskTable, handle: TaskHandle) -> usize {
        table.get(handle).priority - 1
    }

    fn uses_quantum(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinsertion_resets_priority_and_quantum() {
        let policy = Mlfq;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let h = table.create(1, 0.0, 10, 1);
        // Simulate a record that was previously demoted, then parked.
        table.get_mut(h).priority = 4;
        table.get_mut(h).quantum_remaining = 0;

        policy.enqueue(&mut table, &mut ready, h);

        let pcb = table.get(h);
        assert_eq!(pcb.priority, 1);
        assert_eq!(pcb.quantum_remaining, MLFQ_QUANTUM);
        assert_eq!(ready.bucket(0).front(), Some(&h));
    }

    #[test]
    fn test_appends_at_tail_of_top_bucket() {
        let policy = Mlfq;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let a = table.create(1, 0.0, 1, 1);
        let b = table.create(2, 0.0, 99, 1);
        policy.enqueue(&mut table, &mut ready, a);
        policy.enqueue(&mut table, &mut ready, b);

        // FIFO within the bucket; remaining work is irrelevant.
        assert_eq!(ready.head(), Some(a));
    }
}
