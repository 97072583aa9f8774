/*
 * Priority-Based Scheduling Policy
 *
 * NUM_PRIO buckets; a record lands in the bucket of its priority, sorted
 * ascending by remaining work within the bucket. The priority used is
 * whatever the caller supplied on the triggering call (the entry point
 * writes it into the record before enqueueing), so a task can change its
 * own priority between bursts.
 */

use super::{SchedPolicy, ordered_position};
use crate::NUM_PRIO;
use crate::ready::ReadyQueues;
use crate::task::{TaskHandle, TaskTable};

pub struct Pbs;

impl SchedPolicy for Pbs {
    fn name(&self) -> &'static str {
        "PBS"
    }

    fn bucket_count(&self) -> usize {
        NUM_PRIO
    }

    fn enqueue(&self, table: &mut TaskTable, ready: &mut ReadyQueues, handle: TaskHandle) {
        let pcb = table.get(handle);
        let bucket = pcb.priority - 1;
        let position = ordered_position(table, ready.bucket(bucket), pcb.remaining_work);
        ready.insert_at(bucket, position, handle);
    }

    fn bucket_of(&self, table: &TaskTable, handle: TaskHandle) -> usize {
        table.get(handle).priority - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgent_bucket_wins() {
        let policy = Pbs;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let low = table.create(1, 0.0, 1, 4);
        let high = table.create(2, 0.0, 9, 1);
        policy.enqueue(&mut table, &mut ready, low);
        policy.enqueue(&mut table, &mut ready, high);

        // Priority 1 beats priority 4 regardless of remaining work.
        assert_eq!(ready.head(), Some(high));
        assert_eq!(policy.bucket_of(&table, low), 3);
        assert_eq!(policy.bucket_of(&table, high), 0);
    }

    #[test]
    fn test_sorted_by_remaining_within_bucket() {
        let policy = Pbs;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let slow = table.create(1, 0.0, 8, 2);
        let fast = table.create(2, 0.0, 2, 2);
        policy.enqueue(&mut table, &mut ready, slow);
        policy.enqueue(&mut table, &mut ready, fast);

        assert_eq!(ready.head(), Some(fast));
    }
}
