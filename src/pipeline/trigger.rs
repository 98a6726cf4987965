use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use tracing::warn;

use crate::config::ProcessingMode;

/// Wakeup token for the delivery worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wakeup;

/// Create the bounded wakeup queue connecting the pipeline to the
/// delivery worker.
pub fn signal_channel(buffer: usize) -> (SignalSender, SignalReceiver) {
    let (tx, rx) = sync_channel(buffer);
    (SignalSender { tx }, SignalReceiver { rx })
}

#[derive(Clone)]
pub struct SignalSender {
    tx: SyncSender<Wakeup>,
}

pub struct SignalReceiver {
    rx: Receiver<Wakeup>,
}

impl SignalReceiver {
    /// Wait for the next wakeup, up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Wakeup, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Swallow any queued wakeups so a burst of requests collapses into a
    /// single delivery pass.
    pub fn drain(&self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

/// Post-commit hook that wakes the delivery worker.
///
/// Best-effort by contract: a full buffer or a stopped worker is logged
/// and otherwise ignored, so notification plumbing can never turn a
/// successful request into a failed one.
pub struct DeliveryTrigger {
    mode: ProcessingMode,
    signal: Option<SignalSender>,
}

impl DeliveryTrigger {
    /// Push-mode trigger: wakes the worker after each successful
    /// operation.
    pub fn push(signal: SignalSender) -> Self {
        Self {
            mode: ProcessingMode::Pipeline,
            signal: Some(signal),
        }
    }

    /// Poll-mode trigger: delivery happens only on the scheduled sweep,
    /// so `notify` is a no-op.
    pub fn scheduled() -> Self {
        Self {
            mode: ProcessingMode::Cron,
            signal: None,
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Signal that committed events may be waiting. Never blocks, never
    /// fails.
    pub fn notify(&self, operation: &str) {
        if !self.mode.is_pipeline() {
            return;
        }
        let Some(signal) = &self.signal else {
            return;
        };

        match signal.tx.try_send(Wakeup) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(operation, "delivery wakeup buffer full, dropping signal");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(operation, "delivery worker gone, dropping signal");
            }
        }
    }
}
