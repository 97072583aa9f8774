/*
 * Scheduler Error Definitions
 *
 * Caller-facing failures only. Structural invariant violations are core
 * bugs and abort with a diagnostic instead of surfacing here; unknown-id
 * statistics queries are not errors and are reported via sentinel values.
 */

use thiserror::Error;

/// Errors surfaced to callers of the scheduler API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedError {
    /// `init_scheduler` was called with an out-of-range policy id.
    #[error("unknown scheduling policy id {0} (expected 0..=3)")]
    UnknownPolicy(i32),

    /// The process-global scheduler was initialized twice.
    #[error("scheduler already initialized; re-initialization mid-run is undefined")]
    AlreadyInitialized,

    /// The process-global scheduler was used before `init_scheduler`.
    #[error("scheduler not initialized; call init_scheduler first")]
    NotInitialized,
}
