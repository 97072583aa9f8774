/*
 * Ready Structure
 *
 * This module implements the policy-dependent ready queues: a single bucket
 * for FCFS/SRTF, an array of NUM_PRIO buckets for PBS/MLFQ. Buckets hold
 * task handles, never records, so moving a task between buckets can never
 * dangle or double-free.
 *
 * Selection convention: bucket 0 corresponds to priority 1 and is the MOST
 * urgent. The running candidate is the head of the first non-empty bucket
 * scanning from bucket 0 upward.
 *
 * Mutual exclusion is provided by the caller over the whole structure, not
 * per bucket, so cross-bucket answers ("who is now highest priority?") stay
 * consistent with every mutation.
 */

use std::collections::VecDeque;

use crate::task::TaskHandle;

/// Ordered ready queues holding handles of records eligible to run.
#[derive(Debug)]
pub struct ReadyQueues {
    buckets: Vec<VecDeque<TaskHandle>>,
}

impl ReadyQueues {
    /// Create an empty structure with the given number of buckets.
    pub fn new(bucket_count: usize) -> Self {
        Self {
            buckets: (0..bucket_count).map(|_| VecDeque::new()).collect(),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Append a handle at the tail of a bucket.
    pub fn push_back(&mut self, bucket: usize, handle: TaskHandle) {
        self.bucket_mut(bucket).push_back(handle);
    }

    /// Insert a handle at a specific position within a bucket.
    ///
    /// Used by the ordered disciplines (SRTF, PBS) after they compute the
    /// insertion point. Position 0 displaces the current head, which is how
    /// a shorter job preempts the running record.
    pub fn insert_at(&mut self, bucket: usize, position: usize, handle: TaskHandle) {
        let queue = self.bucket_mut(bucket);
        if position > queue.len() {
            panic!(
                "scheduler invariant violated: insert position {position} past end of bucket {bucket}"
            );
        }
        queue.insert(position, handle);
    }

    /// Detach a handle from a bucket, wherever it sits.
    ///
    /// # Panics
    /// If the handle is not in the bucket: the caller believed the record
    /// was ready when it was not, which is a core bug.
    pub fn unlink(&mut self, bucket: usize, handle: TaskHandle) {
        let queue = self.bucket_mut(bucket);
        match queue.iter().position(|&h| h == handle) {
            Some(pos) => {
                let _ = queue.remove(pos);
            }
            None => panic!(
                "scheduler invariant violated: handle {handle:?} not found in bucket {bucket}"
            ),
        }
    }

    /// The current running candidate: head of the first non-empty bucket,
    /// scanning from most urgent (bucket 0) to least.
    pub fn head(&self) -> Option<TaskHandle> {
        self.buckets
            .iter()
            .find_map(|bucket| bucket.front().copied())
    }

    /// Read-only view of one bucket, in queue order.
    pub fn bucket(&self, bucket: usize) -> &VecDeque<TaskHandle> {
        match self.buckets.get(bucket) {
            Some(queue) => queue,
            None => panic!("scheduler invariant violated: bucket index {bucket} out of range"),
        }
    }

    /// Whether any bucket holds a handle.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    /// Total number of queued handles across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    /// Whether a handle is queued anywhere in the structure.
    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.buckets
            .iter()
            .any(|bucket| bucket.iter().any(|&h| h == handle))
    }

    fn bucket_mut(&mut self, bucket: usize) -> &mut VecDeque<TaskHandle> {
        match self.buckets.get_mut(bucket) {
            Some(queue) => queue,
            None => panic!("scheduler invariant violated: bucket index {bucket} out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_structure_has_no_head() {
        let queues = ReadyQueues::new(5);
        assert!(queues.is_empty());
        assert_eq!(queues.head(), None);
    }

    #[test]
    fn test_head_prefers_most_urgent_bucket() {
        let mut queues = ReadyQueues::new(5);
        queues.push_back(3, TaskHandle(0));
        queues.push_back(1, TaskHandle(1));
        queues.push_back(4, TaskHandle(2));

        // Bucket 1 (priority 2) beats buckets 3 and 4.
        assert_eq!(queues.head(), Some(TaskHandle(1)));

        queues.push_back(0, TaskHandle(3));
        assert_eq!(queues.head(), Some(TaskHandle(3)));
    }

    #[test]
    fn test_insert_at_front_displaces_head() {
        let mut queues = ReadyQueues::new(1);
        queues.push_back(0, TaskHandle(0));
        queues.insert_at(0, 0, TaskHandle(1));
        assert_eq!(queues.head(), Some(TaskHandle(1)));
        assert_eq!(queues.len(), 2);
    }

    #[test]
    fn test_unlink_from_middle() {
        let mut queues = ReadyQueues::new(1);
        for i in 0..3 {
            queues.push_back(0, TaskHandle(i));
        }
        queues.unlink(0, TaskHandle(1));
        assert_eq!(queues.head(), Some(TaskHandle(0)));
        assert_eq!(queues.len(), 2);
        assert!(!queues.contains(TaskHandle(1)));
    }

    #[test]
    #[should_panic(expected = "not found in bucket")]
    fn test_unlink_missing_handle_is_fatal() {
        let mut queues = ReadyQueues::new(1);
        queues.unlink(0, TaskHandle(9));
    }
}
