use std::any::type_name;

use tracing::{debug, error};

use crate::store::EventStore;

use super::operation::{Operation, OperationContext, OperationKind};
use super::trigger::DeliveryTrigger;

/// The request pipeline: transaction handling for commands, pass-through
/// for queries, and the post-commit delivery trigger for both.
///
/// The commit/rollback decision is made solely on the handler's
/// `Ok`/`Err`; nothing a caller does after `execute` returns can split a
/// commit from its events.
pub struct Pipeline<S> {
    store: S,
    trigger: DeliveryTrigger,
}

impl<S: EventStore> Pipeline<S> {
    pub fn new(store: S, trigger: DeliveryTrigger) -> Self {
        Self { store, trigger }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one operation through the pipeline.
    ///
    /// Commands are wrapped in a transaction: committed on success,
    /// rolled back on any error with the handler's error returned
    /// unchanged. Queries skip the transaction. After either kind
    /// completes successfully the delivery trigger runs; its failures
    /// never reach the caller.
    pub fn execute<O: Operation<S>>(&self, operation: &O) -> Result<O::Output, O::Error> {
        let result = match O::KIND {
            OperationKind::Command => self.execute_command(operation),
            OperationKind::Query => {
                let mut ctx = OperationContext::read_only(&self.store);
                operation.execute(&mut ctx)
            }
        };

        if result.is_ok() {
            self.trigger.notify(type_name::<O>());
        }

        result
    }

    fn execute_command<O: Operation<S>>(&self, operation: &O) -> Result<O::Output, O::Error> {
        let name = type_name::<O>();
        debug!(operation = name, "beginning transaction");

        let mut ctx = OperationContext::transactional(&self.store);
        match operation.execute(&mut ctx) {
            Ok(output) => {
                if let Some(tx) = ctx.into_transaction() {
                    let ids = tx.commit()?;
                    debug!(operation = name, events = ids.len(), "transaction committed");
                }
                Ok(output)
            }
            Err(err) => {
                error!(operation = name, error = %err, "operation failed, rolling back");
                if let Some(tx) = ctx.into_transaction() {
                    tx.rollback();
                }
                Err(err)
            }
        }
    }
}
