//! End-to-end walkthrough: a command records a domain event inside its
//! transaction, the push trigger wakes the delivery worker, and the
//! notification lands on the owning user's channel.
//!
//! Run with: `cargo run --example annotation_pipeline`

use std::fmt;
use std::thread;
use std::time::Duration;

use outboxed_rust::{
    EventStore, InMemoryEventStore, LogChannel, NewEvent, Operation, OperationContext,
    OperationKind, OutboxRuntime, OutboxSettings, ProcessingMode, RecordError, StoreError,
};

#[derive(Debug)]
enum DemoError {
    Store(StoreError),
    Record(RecordError),
}

impl From<StoreError> for DemoError {
    fn from(err: StoreError) -> Self {
        DemoError::Store(err)
    }
}

impl From<RecordError> for DemoError {
    fn from(err: RecordError) -> Self {
        DemoError::Record(err)
    }
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoError::Store(err) => write!(f, "{}", err),
            DemoError::Record(err) => write!(f, "{}", err),
        }
    }
}

struct AssignLabel {
    label: String,
    video: String,
    labeler: String,
}

impl<S: EventStore> Operation<S> for AssignLabel {
    type Output = ();
    type Error = DemoError;
    const KIND: OperationKind = OperationKind::Command;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<(), DemoError> {
        ctx.record(NewEvent::create(
            format!("Label {} assigned on {}", self.label, self.video),
            &self.labeler,
        ))?;
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let store = InMemoryEventStore::new();
    let settings = OutboxSettings::new()
        .with_mode(ProcessingMode::Pipeline)
        .with_safety_net(true);
    let runtime = OutboxRuntime::start(&settings, store, LogChannel::new());

    runtime
        .execute(&AssignLabel {
            label: "Running".to_string(),
            video: "video-7".to_string(),
            labeler: "labeler-42".to_string(),
        })
        .expect("command failed");

    // Give the delivery worker a moment to pick up the wakeup.
    thread::sleep(Duration::from_millis(200));

    let stats = runtime.shutdown();
    println!(
        "delivery worker: {} passes, {} published, {} failed",
        stats.passes, stats.published, stats.failed
    );
}
