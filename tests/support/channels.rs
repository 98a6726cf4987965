//! Notification-channel doubles for delivery tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use outboxed_rust::{ChannelError, Notification, NotificationChannel};

/// Records every send for later assertions.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<(String, Notification)>>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, notification)| notification.message.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn count_for(&self, user_id: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _)| user == user_id)
            .count()
    }
}

impl NotificationChannel for RecordingChannel {
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), notification.clone()));
        Ok(())
    }
}

/// Fails the first `n` sends, then delegates to the recorder.
pub struct FlakyChannel {
    failures_left: AtomicUsize,
    pub inner: RecordingChannel,
}

impl FlakyChannel {
    pub fn failing_first(n: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(n),
            inner: RecordingChannel::new(),
        }
    }
}

impl NotificationChannel for FlakyChannel {
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ChannelError::ConnectionFailed("simulated outage".to_string()));
        }
        self.inner.send(user_id, notification)
    }
}

/// Sleeps before every successful send, to widen race windows.
pub struct SlowChannel {
    delay: Duration,
    pub inner: RecordingChannel,
}

impl SlowChannel {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: RecordingChannel::new(),
        }
    }
}

impl NotificationChannel for SlowChannel {
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError> {
        std::thread::sleep(self.delay);
        self.inner.send(user_id, notification)
    }
}

/// Rejects everything addressed to one user; everyone else goes through.
pub struct BlockedUserChannel {
    blocked: String,
    pub inner: RecordingChannel,
}

impl BlockedUserChannel {
    pub fn blocking(user_id: impl Into<String>) -> Self {
        Self {
            blocked: user_id.into(),
            inner: RecordingChannel::new(),
        }
    }
}

impl NotificationChannel for BlockedUserChannel {
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError> {
        if user_id == self.blocked {
            return Err(ChannelError::Rejected(format!(
                "user {} unreachable",
                user_id
            )));
        }
        self.inner.send(user_id, notification)
    }
}
