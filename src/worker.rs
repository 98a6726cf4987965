//! Background delivery worker.
//!
//! One thread owns the publisher and runs delivery passes, either on a
//! fixed schedule (poll mode) or when the pipeline signals that a request
//! just committed (push mode, with an optional scheduled safety net).

use std::sync::mpsc::{channel, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::channel::NotificationChannel;
use crate::pipeline::SignalReceiver;
use crate::publisher::{DomainEventPublisher, PublishStats};
use crate::store::EventStore;

/// Statistics accumulated by the delivery worker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Completed delivery passes.
    pub passes: usize,
    pub published: usize,
    pub failed: usize,
}

impl WorkerStats {
    fn absorb(&mut self, pass: PublishStats) {
        self.passes += 1;
        self.published += pass.published;
        self.failed += pass.failed;
    }
}

/// How often the signaled worker checks for a stop request while idle.
const IDLE_TICK: Duration = Duration::from_millis(50);

/// A background thread that drains unpublished events through the
/// publisher.
///
/// ## Example
///
/// ```ignore
/// let store = InMemoryEventStore::new();
/// let publisher = DomainEventPublisher::new(store.clone(), LogChannel::new());
///
/// // Poll mode: one sweep every interval.
/// let worker = DeliveryWorker::spawn_scheduled(publisher, Duration::from_secs(10));
///
/// // ... handle requests ...
///
/// let stats = worker.stop();
/// println!("published {} events", stats.published);
/// ```
pub struct DeliveryWorker {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<WorkerStats>>,
}

impl DeliveryWorker {
    /// Spawn a worker that runs one delivery pass every `interval`.
    ///
    /// This is the scheduled sweep: a single thread, so ticks cannot
    /// overlap; a slow pass delays the next tick rather than racing it.
    pub fn spawn_scheduled<S, C>(
        publisher: DomainEventPublisher<S, C>,
        interval: Duration,
    ) -> Self
    where
        S: EventStore + 'static,
        C: NotificationChannel + 'static,
    {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = WorkerStats::default();

            loop {
                match stop_rx.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                match publisher.publish_pending() {
                    Ok(pass) => stats.absorb(pass),
                    Err(err) => warn!(error = %err, "scheduled delivery pass failed"),
                }
            }

            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Spawn a worker that runs a delivery pass whenever the pipeline
    /// signals a committed request.
    ///
    /// Queued wakeups are coalesced into a single pass. With `sweep` set,
    /// the worker also runs a scheduled pass at that cadence as a safety
    /// net, so events whose wakeup was dropped wait at most one sweep.
    pub fn spawn_signaled<S, C>(
        publisher: DomainEventPublisher<S, C>,
        wakeups: SignalReceiver,
        sweep: Option<Duration>,
    ) -> Self
    where
        S: EventStore + 'static,
        C: NotificationChannel + 'static,
    {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = WorkerStats::default();
            let mut last_sweep = Instant::now();
            let mut signals_open = true;

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                let mut run = false;

                if signals_open {
                    match wakeups.recv_timeout(IDLE_TICK) {
                        Ok(_) => {
                            let extra = wakeups.drain();
                            if extra > 0 {
                                debug!(coalesced = extra + 1, "coalescing delivery wakeups");
                            }
                            run = true;
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => {
                            signals_open = false;
                        }
                    }
                } else {
                    if sweep.is_none() {
                        // No signal source and no schedule left.
                        break;
                    }
                    thread::sleep(IDLE_TICK);
                }

                if let Some(sweep) = sweep {
                    if last_sweep.elapsed() >= sweep {
                        run = true;
                    }
                }

                if run {
                    match publisher.publish_pending() {
                        Ok(pass) => stats.absorb(pass),
                        Err(err) => warn!(error = %err, "triggered delivery pass failed"),
                    }
                    last_sweep = Instant::now();
                }
            }

            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the worker to stop and wait for it to finish.
    /// Returns the worker statistics.
    pub fn stop(mut self) -> WorkerStats {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            WorkerStats::default()
        }
    }

    /// Signal the worker to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for DeliveryWorker {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        // Don't join on drop - let the thread finish naturally
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::channel::LogChannel;
    use crate::event::NewEvent;
    use crate::pipeline::signal_channel;
    use crate::store::InMemoryEventStore;

    fn buffered_publisher(
        store: InMemoryEventStore,
    ) -> (
        DomainEventPublisher<InMemoryEventStore, LogChannel>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let publisher =
            DomainEventPublisher::new(store, LogChannel::with_buffer(buffer.clone()));
        (publisher, buffer)
    }

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn scheduled_worker_sweeps_on_interval() {
        let store = InMemoryEventStore::new();
        let (publisher, buffer) = buffered_publisher(store.clone());

        let worker = DeliveryWorker::spawn_scheduled(publisher, Duration::from_millis(20));

        store.append(vec![NewEvent::create("swept", "u1")]).unwrap();
        assert!(wait_until(Duration::from_millis(500), || {
            !buffer.lock().unwrap().is_empty()
        }));

        let stats = worker.stop();
        assert!(stats.passes >= 1);
        assert_eq!(stats.published, 1);
        assert!(store.unpublished().unwrap().is_empty());
    }

    #[test]
    fn signaled_worker_runs_on_wakeup() {
        let store = InMemoryEventStore::new();
        let (publisher, buffer) = buffered_publisher(store.clone());
        let (signal_tx, signal_rx) = signal_channel(8);

        let worker = DeliveryWorker::spawn_signaled(publisher, signal_rx, None);

        store.append(vec![NewEvent::create("pushed", "u1")]).unwrap();
        crate::pipeline::DeliveryTrigger::push(signal_tx).notify("test");

        assert!(wait_until(Duration::from_millis(500), || {
            !buffer.lock().unwrap().is_empty()
        }));

        let stats = worker.stop();
        assert_eq!(stats.published, 1);
    }

    #[test]
    fn safety_net_sweep_recovers_without_signals() {
        let store = InMemoryEventStore::new();
        let (publisher, buffer) = buffered_publisher(store.clone());
        let (signal_tx, signal_rx) = signal_channel(8);

        // Never send a wakeup; only the sweep can deliver.
        let worker =
            DeliveryWorker::spawn_signaled(publisher, signal_rx, Some(Duration::from_millis(50)));

        store.append(vec![NewEvent::create("recovered", "u1")]).unwrap();
        assert!(wait_until(Duration::from_millis(500), || {
            !buffer.lock().unwrap().is_empty()
        }));

        drop(signal_tx);
        let stats = worker.stop();
        assert_eq!(stats.published, 1);
    }

    #[test]
    fn stop_returns_accumulated_stats() {
        let store = InMemoryEventStore::new();
        store.append(vec![NewEvent::create("counted", "u1")]).unwrap();
        let (publisher, _buffer) = buffered_publisher(store);

        let worker = DeliveryWorker::spawn_scheduled(publisher, Duration::from_millis(10));
        thread::sleep(Duration::from_millis(100));
        let stats = worker.stop();

        assert!(stats.passes >= 1);
        assert_eq!(stats.published, 1);
        assert_eq!(stats.failed, 0);
    }
}
