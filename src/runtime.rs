use tracing::info;

use crate::channel::NotificationChannel;
use crate::config::{OutboxSettings, ProcessingMode, SCHEDULED_JOB_NAME};
use crate::pipeline::{signal_channel, DeliveryTrigger, Operation, Pipeline};
use crate::publisher::DomainEventPublisher;
use crate::store::EventStore;
use crate::worker::{DeliveryWorker, WorkerStats};

/// Wires the pipeline, publisher and delivery worker for the configured
/// mode.
///
/// `Cron` registers the recurring sweep and leaves the trigger inert;
/// `Pipeline` connects the trigger to a signaled worker, optionally with
/// the sweep as a safety net. Both modes share the same publisher and
/// store; only what calls `publish_pending` differs.
pub struct OutboxRuntime<S> {
    pipeline: Pipeline<S>,
    worker: DeliveryWorker,
}

impl<S: EventStore + Clone + 'static> OutboxRuntime<S> {
    pub fn start<C>(settings: &OutboxSettings, store: S, channel: C) -> Self
    where
        C: NotificationChannel + 'static,
    {
        let publisher = DomainEventPublisher::new(store.clone(), channel)
            .with_batch_size(settings.batch_size)
            .with_lease(settings.lease());

        let (trigger, worker) = match settings.mode {
            ProcessingMode::Cron => {
                info!(
                    job = SCHEDULED_JOB_NAME,
                    interval_secs = settings.sweep_interval_secs,
                    "registering scheduled delivery job"
                );
                let worker =
                    DeliveryWorker::spawn_scheduled(publisher, settings.sweep_interval());
                (DeliveryTrigger::scheduled(), worker)
            }
            ProcessingMode::Pipeline => {
                let (signal_tx, signal_rx) = signal_channel(settings.signal_buffer);
                let sweep = if settings.pipeline_safety_net {
                    Some(settings.sweep_interval())
                } else {
                    None
                };
                let worker = DeliveryWorker::spawn_signaled(publisher, signal_rx, sweep);
                (DeliveryTrigger::push(signal_tx), worker)
            }
        };

        Self {
            pipeline: Pipeline::new(store, trigger),
            worker,
        }
    }

    pub fn pipeline(&self) -> &Pipeline<S> {
        &self.pipeline
    }

    /// Run one operation through the pipeline.
    pub fn execute<O: Operation<S>>(&self, operation: &O) -> Result<O::Output, O::Error> {
        self.pipeline.execute(operation)
    }

    /// Stop the delivery worker and return its accumulated stats.
    pub fn shutdown(self) -> WorkerStats {
        let OutboxRuntime { pipeline, worker } = self;
        // Dropping the pipeline first disconnects the trigger, so the
        // worker cannot be re-woken while it drains.
        drop(pipeline);
        worker.stop()
    }
}
