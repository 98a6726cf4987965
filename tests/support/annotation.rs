//! A slice of the video-annotation domain, just enough to drive the
//! pipeline from realistic command handlers.

use std::fmt;

use serde::{Deserialize, Serialize};

use outboxed_rust::{
    EventStore, NewEvent, Operation, OperationContext, OperationKind, RecordError, StoreError,
};

#[derive(Debug, PartialEq)]
pub enum AnnotationError {
    Store(StoreError),
    Record(RecordError),
    Serialize(String),
    EmptyLabel,
    Simulated,
}

impl From<StoreError> for AnnotationError {
    fn from(err: StoreError) -> Self {
        AnnotationError::Store(err)
    }
}

impl From<RecordError> for AnnotationError {
    fn from(err: RecordError) -> Self {
        AnnotationError::Record(err)
    }
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationError::Store(err) => write!(f, "{}", err),
            AnnotationError::Record(err) => write!(f, "{}", err),
            AnnotationError::Serialize(msg) => write!(f, "payload serialization failed: {}", msg),
            AnnotationError::EmptyLabel => write!(f, "label name must not be empty"),
            AnnotationError::Simulated => write!(f, "simulated handler failure"),
        }
    }
}

impl std::error::Error for AnnotationError {}

/// Assign a label to a video; notifies the labeler.
pub struct AssignLabel {
    pub label: String,
    pub video: String,
    pub labeler: String,
}

impl<S: EventStore> Operation<S> for AssignLabel {
    type Output = ();
    type Error = AnnotationError;
    const KIND: OperationKind = OperationKind::Command;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<(), AnnotationError> {
        if self.label.is_empty() {
            return Err(AnnotationError::EmptyLabel);
        }
        ctx.record(NewEvent::create(
            format!("Label {} assigned on {}", self.label, self.video),
            &self.labeler,
        ))?;
        Ok(())
    }
}

/// Like `AssignLabel`, but the handler fails after recording: the
/// rollback path in one command.
pub struct AssignLabelThenFail {
    pub label: String,
    pub video: String,
    pub labeler: String,
}

impl<S: EventStore> Operation<S> for AssignLabelThenFail {
    type Output = ();
    type Error = AnnotationError;
    const KIND: OperationKind = OperationKind::Command;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<(), AnnotationError> {
        ctx.record(NewEvent::create(
            format!("Label {} assigned on {}", self.label, self.video),
            &self.labeler,
        ))?;
        Err(AnnotationError::Simulated)
    }
}

/// Completing an assignment emits two notifications to the same labeler.
pub struct CompleteAssignment {
    pub assignment: String,
    pub labeler: String,
}

impl<S: EventStore> Operation<S> for CompleteAssignment {
    type Output = ();
    type Error = AnnotationError;
    const KIND: OperationKind = OperationKind::Command;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<(), AnnotationError> {
        ctx.record(NewEvent::create(
            format!("Assignment {} completed", self.assignment),
            &self.labeler,
        ))?;
        ctx.record(NewEvent::create(
            "Completed assignment count changed",
            &self.labeler,
        ))?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ReportPayload {
    pub project_id: u32,
    pub report_id: u32,
}

/// Generating a report emits a typed event with a structured payload.
pub struct GenerateReport {
    pub project_id: u32,
    pub report_id: u32,
    pub requested_by: String,
}

impl<S: EventStore> Operation<S> for GenerateReport {
    type Output = ();
    type Error = AnnotationError;
    const KIND: OperationKind = OperationKind::Command;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<(), AnnotationError> {
        let event = NewEvent::typed(
            format!("Report {} is ready", self.report_id),
            &self.requested_by,
            "ReportGenerated",
            &ReportPayload {
                project_id: self.project_id,
                report_id: self.report_id,
            },
        )
        .map_err(|err| AnnotationError::Serialize(err.to_string()))?;
        ctx.record(event)?;
        Ok(())
    }
}

/// How many notifications are still waiting for delivery.
pub struct PendingNotifications;

impl<S: EventStore> Operation<S> for PendingNotifications {
    type Output = usize;
    type Error = AnnotationError;
    const KIND: OperationKind = OperationKind::Query;

    fn execute(&self, ctx: &mut OperationContext<'_, S>) -> Result<usize, AnnotationError> {
        Ok(ctx.store().unpublished()?.len())
    }
}
