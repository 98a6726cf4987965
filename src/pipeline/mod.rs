mod operation;
#[allow(clippy::module_inception)]
mod pipeline;
mod trigger;

pub use operation::{Operation, OperationContext, OperationKind, RecordError};
pub use pipeline::Pipeline;
pub use trigger::{signal_channel, DeliveryTrigger, SignalReceiver, SignalSender, Wakeup};
