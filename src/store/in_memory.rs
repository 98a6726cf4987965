use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use crate::event::{DomainEvent, NewEvent};

use super::{EventStore, StoreError};

/// Claim bookkeeping lives next to the row, not on the event record
/// itself: the lease is store-internal state.
struct StoredEvent {
    event: DomainEvent,
    locked_by: Option<String>,
    locked_until: Option<SystemTime>,
}

impl StoredEvent {
    /// A row is claimable when unpublished and not held under an
    /// unexpired lease.
    fn claimable(&self, now: SystemTime) -> bool {
        if self.event.is_published {
            return false;
        }
        self.locked_until.map(|until| until <= now).unwrap_or(true)
    }
}

/// In-memory event store for testing and single-process deployments.
///
/// Cloning creates another handle to the same storage (thread-safe via
/// `Arc<RwLock<...>>`), so a pipeline and a delivery worker can share one
/// store across threads.
#[derive(Clone)]
pub struct InMemoryEventStore {
    rows: Arc<RwLock<Vec<StoredEvent>>>,
    seq: Arc<AtomicU64>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Total number of rows, published or not.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All published rows, oldest first (test and diagnostics helper).
    pub fn published(&self) -> Result<Vec<DomainEvent>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(rows
            .iter()
            .filter(|row| row.event.is_published)
            .map(|row| row.event.clone())
            .collect())
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&self, events: Vec<NewEvent>) -> Result<Vec<u64>, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::LockPoisoned("append"))?;

        let mut ids = Vec::with_capacity(events.len());
        for event in events {
            let id = self.seq.fetch_add(1, Ordering::Relaxed);
            ids.push(id);
            rows.push(StoredEvent {
                event: DomainEvent {
                    id,
                    message: event.message,
                    user_id: event.user_id,
                    event_type: event.event_type,
                    event_data: event.event_data,
                    occurred_at: event.occurred_at,
                    is_published: false,
                    published_at: None,
                    attempts: 0,
                    last_error: None,
                },
                locked_by: None,
                locked_until: None,
            });
        }

        Ok(ids)
    }

    fn unpublished(&self) -> Result<Vec<DomainEvent>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(rows
            .iter()
            .filter(|row| !row.event.is_published)
            .map(|row| row.event.clone())
            .collect())
    }

    fn claim_unpublished(
        &self,
        worker_id: &str,
        max: usize,
        lease: Duration,
    ) -> Result<Vec<DomainEvent>, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::LockPoisoned("claim"))?;
        let now = SystemTime::now();
        let mut claimed = Vec::new();

        for row in rows.iter_mut() {
            if claimed.len() >= max {
                break;
            }
            if !row.claimable(now) {
                continue;
            }

            row.locked_by = Some(worker_id.to_string());
            row.locked_until = Some(now.checked_add(lease).unwrap_or(now));
            row.event.attempts = row.event.attempts.saturating_add(1);
            row.event.last_error = None;
            claimed.push(row.event.clone());
        }

        Ok(claimed)
    }

    fn mark_published(&self, id: u64) -> Result<bool, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::LockPoisoned("mark published"))?;
        let row = rows
            .iter_mut()
            .find(|row| row.event.id == id)
            .ok_or(StoreError::UnknownEvent(id))?;

        if row.event.is_published {
            return Ok(false);
        }

        row.event.is_published = true;
        row.event.published_at = Some(SystemTime::now());
        row.event.last_error = None;
        row.locked_by = None;
        row.locked_until = None;
        Ok(true)
    }

    fn release(&self, id: u64, error: Option<&str>) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::LockPoisoned("release"))?;
        let row = rows
            .iter_mut()
            .find(|row| row.event.id == id)
            .ok_or(StoreError::UnknownEvent(id))?;

        row.locked_by = None;
        row.locked_until = None;
        if !row.event.is_published {
            row.event.last_error = error.map(|value| value.to_string());
        }
        Ok(())
    }

    fn get(&self, id: u64) -> Result<Option<DomainEvent>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(rows
            .iter()
            .find(|row| row.event.id == id)
            .map(|row| row.event.clone()))
    }
}
