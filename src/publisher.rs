use std::time::Duration;

use tracing::{info, warn};

use crate::channel::NotificationChannel;
use crate::store::{EventStore, StoreError};

/// Result of one delivery pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    pub published: usize,
    pub failed: usize,
}

/// Delivers committed domain events to the notification channel.
///
/// Each pass claims a batch of unpublished rows (oldest first) and
/// attempts every one of them: a failed send releases its row for a later
/// pass and moves on, so one stuck notification never blocks the rest.
/// Delivery is at-least-once; the conditional publish flip plus the claim
/// lease keep duplicates rare but not impossible.
pub struct DomainEventPublisher<S, C> {
    store: S,
    channel: C,
    worker_id: String,
    batch_size: usize,
    lease: Duration,
}

impl<S, C> DomainEventPublisher<S, C> {
    pub fn new(store: S, channel: C) -> Self {
        Self {
            store,
            channel,
            worker_id: format!("publisher-{}", std::process::id()),
            batch_size: 100,
            lease: Duration::from_secs(60),
        }
    }

    /// Set the worker ID (used for claim tracking).
    pub fn with_worker_id(mut self, id: impl Into<String>) -> Self {
        self.worker_id = id.into();
        self
    }

    /// Set the maximum number of events claimed per pass.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the claim lease duration.
    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}

impl<S: EventStore, C: NotificationChannel> DomainEventPublisher<S, C> {
    /// Claim and deliver one batch of unpublished events, oldest first.
    ///
    /// Rows beyond the batch size wait for the next invocation. Failed
    /// rows are released with their error and retried on a later pass
    /// with no backoff; nothing here ever un-publishes a row.
    pub fn publish_pending(&self) -> Result<PublishStats, StoreError> {
        let claimed = self
            .store
            .claim_unpublished(&self.worker_id, self.batch_size, self.lease)?;

        if claimed.is_empty() {
            return Ok(PublishStats::default());
        }

        info!(count = claimed.len(), "publishing domain events");
        let mut stats = PublishStats::default();

        for event in claimed {
            let notification = event.notification();
            match self.channel.send(&event.user_id, &notification) {
                Ok(()) => match self.store.mark_published(event.id) {
                    // false means a racing pass already confirmed it;
                    // either way the row is done.
                    Ok(_) => stats.published += 1,
                    Err(err) => {
                        warn!(
                            event_id = event.id,
                            error = %err,
                            "delivered but could not mark published, releasing for retry"
                        );
                        self.store.release(event.id, Some(&err.to_string()))?;
                        stats.failed += 1;
                    }
                },
                Err(err) => {
                    warn!(
                        event_id = event.id,
                        user_id = %event.user_id,
                        error = %err,
                        "delivery failed, leaving event for a later pass"
                    );
                    self.store.release(event.id, Some(&err.to_string()))?;
                    stats.failed += 1;
                }
            }
        }

        if stats.published > 0 {
            info!(published = stats.published, "published domain events");
        }
        if stats.failed > 0 {
            warn!(
                failed = stats.failed,
                "domain events left unpublished, will retry on next pass"
            );
        }

        Ok(stats)
    }
}
