use std::fmt;

use crate::event::NewEvent;
use crate::store::{EventStore, StoreError};
use crate::transaction::Transaction;

/// Whether an operation mutates state.
///
/// Declared statically by each request type; the pipeline branches on it
/// once per execution, with no runtime type probing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Command,
    Query,
}

/// A request executed through the pipeline.
///
/// Commands run inside a transaction the pipeline opens for them; queries
/// bypass transaction handling entirely. The error type must absorb
/// `StoreError` so a commit failure can surface through the same channel
/// as the handler's own errors.
pub trait Operation<S: EventStore + ?Sized> {
    type Output;
    type Error: From<StoreError> + fmt::Display;

    const KIND: OperationKind;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<Self::Output, Self::Error>;
}

/// Execution context handed to an operation.
///
/// Commands get the ambient transaction and may record domain events into
/// it; queries get a read-only view of the store.
pub struct OperationContext<'a, S: EventStore + ?Sized> {
    store: &'a S,
    tx: Option<Transaction<'a, S>>,
}

impl<'a, S: EventStore + ?Sized> OperationContext<'a, S> {
    pub(crate) fn transactional(store: &'a S) -> Self {
        Self {
            store,
            tx: Some(Transaction::new(store)),
        }
    }

    pub(crate) fn read_only(store: &'a S) -> Self {
        Self { store, tx: None }
    }

    /// Direct read access to the event store.
    pub fn store(&self) -> &S {
        self.store
    }

    /// Record a domain event in the ambient transaction.
    ///
    /// The event shares the transaction's fate: it becomes visible only
    /// if the whole operation commits. Callable any number of times per
    /// operation (one business action may emit several notifications).
    pub fn record(&mut self, event: NewEvent) -> Result<(), RecordError> {
        match &mut self.tx {
            Some(tx) => {
                tx.record(event);
                Ok(())
            }
            None => Err(RecordError::ReadOnly),
        }
    }

    pub(crate) fn into_transaction(self) -> Option<Transaction<'a, S>> {
        self.tx
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Queries have no transaction to record into.
    ReadOnly,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::ReadOnly => {
                write!(f, "domain events can only be recorded inside a command transaction")
            }
        }
    }
}

impl std::error::Error for RecordError {}
