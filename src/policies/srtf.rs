/*
 * Shortest-Remaining-Time-First Policy
 *
 * Single bucket kept sorted ascending by remaining work. An arriving
 * record with less work than the current head displaces it, which the
 * rendezvous observes as a preemption of the previously running record.
 */

use super::{SchedPolicy, ordered_position};
use crate::ready::ReadyQueues;
use crate::task::{TaskHandle, TaskTable};

pub struct Srtf;

impl SchedPolicy for Srtf {
    fn name(&self) -> &'static str {
        "SRTF"
    }

    fn bucket_count(&self) -> usize {
        1
    }

    fn enqueue(&self, table: &mut TaskTable, ready: &mut ReadyQueues, handle: TaskHandle) {
        let remaining = table.get(handle).remaining_work;
        let position = ordered_position(table, ready.bucket(0), remaining);
        ready.insert_at(0, position, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorter_job_displaces_head() {
        let policy = Srtf;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let long = table.create(1, 0.0, 5, 1);
        policy.enqueue(&mut table, &mut ready, long);
        assert_eq!(ready.head(), Some(long));

        let short = table.create(2, 0.0, 1, 1);
        policy.enqueue(&mut table, &mut ready, short);
        assert_eq!(ready.head(), Some(short));
    }

    #[test]
    fn test_ties_keep_earlier_arrival_ahead() {
        let policy = Srtf;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        let first = table.create(1, 0.0, 3, 1);
        let second = table.create(2, 1.0, 3, 1);
        policy.enqueue(&mut table, &mut ready, first);
        policy.enqueue(&mut table, &mut ready, second);

        assert_eq!(ready.head(), Some(first));
    }

    #[test]
    fn test_bucket_stays_sorted() {
        let policy = Srtf;
        let mut table = TaskTable::new();
        let mut ready = ReadyQueues::new(policy.bucket_count());

        for (tid, rem) in [(1, 7), (2, 2), (3, 5), (4, 9)] {
            let h = table.create(tid, 0.0, rem, 1);
            policy.enqueue(&mut table, &mut ready, h);
        }

        let work: Vec<i32> = ready
            .bucket(0)
            .iter()
            .map(|&h| table.get(h).remaining_work)
            .collect();
        assert_eq!(work, vec![2, 5, 7, 9]);
    }
}
