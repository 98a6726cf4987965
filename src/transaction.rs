use tracing::debug;

use crate::event::NewEvent;
use crate::store::{EventStore, StoreError};

/// A unit of work over the event store.
///
/// Events recorded here are staged in call order and handed to the store
/// as one atomic append at `commit()` — nothing is visible to the
/// publisher before that point. Dropping the transaction (or calling
/// `rollback()`) discards the whole batch, which is how a failed command
/// takes its event rows down with it.
pub struct Transaction<'a, S: EventStore + ?Sized> {
    store: &'a S,
    staged: Vec<NewEvent>,
}

impl<'a, S: EventStore + ?Sized> Transaction<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    /// Stage one event. Callable any number of times per transaction.
    pub fn record(&mut self, event: NewEvent) {
        self.staged.push(event);
    }

    /// Events staged so far, in call order.
    pub fn staged(&self) -> &[NewEvent] {
        &self.staged
    }

    /// Commit the staged batch atomically. Ids are assigned here, in
    /// staging order, so events from one transaction deliver in the order
    /// they were recorded.
    pub fn commit(self) -> Result<Vec<u64>, StoreError> {
        let Transaction { store, staged } = self;
        if staged.is_empty() {
            return Ok(Vec::new());
        }
        store.append(staged)
    }

    /// Discard the staged batch. Equivalent to dropping the transaction,
    /// but says so out loud in the log.
    pub fn rollback(self) {
        if !self.staged.is_empty() {
            debug!(
                discarded = self.staged.len(),
                "transaction rolled back, staged events discarded"
            );
        }
    }
}
