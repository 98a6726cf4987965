mod error;
mod in_memory;

pub use error::StoreError;
pub use in_memory::InMemoryEventStore;

use std::time::Duration;

use crate::event::{DomainEvent, NewEvent};

/// Durable home of domain events.
///
/// The table is append-mostly: rows are created by committing
/// transactions and mutated only by the delivery path (claim bookkeeping
/// and the single `false → true` publish flip). Nothing here deletes
/// rows; retention is someone else's job.
pub trait EventStore: Send + Sync {
    /// Append a batch of events atomically, assigning ascending ids.
    ///
    /// All-or-nothing: either every event in the batch becomes visible to
    /// readers at once, or none do. Returns the assigned ids in batch
    /// order.
    fn append(&self, events: Vec<NewEvent>) -> Result<Vec<u64>, StoreError>;

    /// All rows not yet published, oldest first.
    fn unpublished(&self) -> Result<Vec<DomainEvent>, StoreError>;

    /// Atomically fetch-and-mark up to `max` unpublished rows for
    /// delivery, oldest first.
    ///
    /// A claimed row is invisible to other claimants until its lease
    /// expires or it is released, so two concurrent delivery passes work
    /// disjoint sets. Claiming counts as a delivery attempt.
    fn claim_unpublished(
        &self,
        worker_id: &str,
        max: usize,
        lease: Duration,
    ) -> Result<Vec<DomainEvent>, StoreError>;

    /// Conditionally flip a row to published, setting `published_at` in
    /// the same step and dropping any claim.
    ///
    /// Returns `false` without touching the row when it is already
    /// published, so a racing writer's attempt is a no-op rather than a
    /// second flip.
    fn mark_published(&self, id: u64) -> Result<bool, StoreError>;

    /// Return a claimed row to the unpublished pool after a failed
    /// delivery, recording the error for diagnostics.
    fn release(&self, id: u64, error: Option<&str>) -> Result<(), StoreError>;

    /// Look up a single row by id.
    fn get(&self, id: u64) -> Result<Option<DomainEvent>, StoreError>;
}
