/*
 * First-Come-First-Served Policy
 *
 * Single bucket, strict arrival order. Records are appended at the tail
 * and never reordered, so the running head can only change when it
 * finishes and is removed.
 */

use super::SchedPolicy;
use crate::ready::ReadyQueues;
use crate::task::{TaskHandle, TaskTable};

pub struct Fcfs;

impl SchedPolicy for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn bucket_count(&self) -> usize {
        1
    }

    fn enqueue(&self, _table: &mut TaskTable, ready: &mut ReadyQueues, handle: TaskHandle) {
        ready.push_back(0, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_order_is_preserved() {
        let policy = Fcfs;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let a = table.create(1, 0.0, 9, 1);
        let b = table.create(2, 0.0, 1, 1);
        policy.enqueue(&mut table, &mut ready, a);
        policy.enqueue(&mut table, &mut ready, b);

        // Shorter work does not jump the queue under FCFS.
        assert_eq!(ready.head(), Some(a));
        assert_eq!(ready.bucket(0)[1], b);
    }
}
