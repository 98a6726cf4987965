//! Transactional outbox pipeline: record domain events in the same
//! transaction as the business change they describe, then deliver each
//! one at-least-once to its owning user through a pluggable notification
//! channel — triggered right after each request (push) or by a scheduled
//! sweep (poll).

mod channel;
mod config;
mod event;
mod pipeline;
mod publisher;
mod runtime;
mod store;
mod transaction;
mod worker;

#[cfg(feature = "emitter")]
pub use channel::EmitterChannel;
pub use channel::{ChannelError, LogChannel, NotificationChannel};
pub use config::{OutboxSettings, ParseModeError, ProcessingMode, SCHEDULED_JOB_NAME};
pub use event::{DomainEvent, NewEvent, Notification};
pub use pipeline::{
    signal_channel, DeliveryTrigger, Operation, OperationContext, OperationKind, Pipeline,
    RecordError, SignalReceiver, SignalSender, Wakeup,
};
pub use publisher::{DomainEventPublisher, PublishStats};
pub use runtime::OutboxRuntime;
pub use store::{EventStore, InMemoryEventStore, StoreError};
pub use transaction::Transaction;
pub use worker::{DeliveryWorker, WorkerStats};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
