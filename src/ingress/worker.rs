//! Background thread draining one subscription into a consumer.

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info};

use super::{process, Consumer, Disposition};
use crate::bus::Subscriber;

/// Statistics from an ingress worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngressStats {
    /// Messages applied and acknowledged.
    pub acked: usize,
    /// Messages negatively acknowledged.
    pub nacked: usize,
    /// Poll cycles completed.
    pub polls: usize,
    /// Polls that failed at the bus.
    pub bus_errors: usize,
}

impl IngressStats {
    pub fn received(&self) -> usize {
        self.acked + self.nacked
    }
}

/// A background thread that polls a subscription and hands every message to
/// a [`Consumer`].
///
/// Several workers may poll clones of the same subscription; they then
/// compete for messages.
///
/// ## Example
///
/// ```ignore
/// use storefront_sync::bus::{InMemoryQueue, Subscribable};
/// use storefront_sync::ingress::{IngressWorker, StockConsumer};
/// use storefront_sync::replica::StockReplica;
/// use std::time::Duration;
///
/// let queue = InMemoryQueue::new();
/// let stock = StockReplica::new();
///
/// let worker = IngressWorker::spawn(
///     StockConsumer::upserts(stock.clone()),
///     queue.subscribe("product-updated"),
///     Duration::from_millis(10),
/// );
///
/// // ... publish product events ...
///
/// let stats = worker.stop();
/// println!("applied {} messages", stats.acked);
/// ```
pub struct IngressWorker {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<IngressStats>>,
}

impl IngressWorker {
    /// Spawn a worker. Each poll waits at most `poll_interval` for a message.
    pub fn spawn<C, S>(consumer: C, subscription: S, poll_interval: Duration) -> Self
    where
        C: Consumer + 'static,
        S: Subscriber + 'static,
    {
        let (stop_tx, stop_rx) = channel();
        let timeout_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX);

        let handle = thread::spawn(move || {
            let mut stats = IngressStats::default();
            info!(consumer = consumer.name(), "ingress worker started");

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                match subscription.poll(timeout_ms) {
                    Ok(Some(event)) => match process(&consumer, &subscription, &event) {
                        Disposition::Ack => stats.acked += 1,
                        Disposition::Nack(_) => stats.nacked += 1,
                    },
                    Ok(None) => {}
                    Err(err) => {
                        stats.bus_errors += 1;
                        error!(consumer = consumer.name(), error = %err, "poll failed");
                        thread::sleep(poll_interval);
                    }
                }
            }

            info!(
                consumer = consumer.name(),
                acked = stats.acked,
                nacked = stats.nacked,
                "ingress worker stopped"
            );
            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the worker to stop and wait for it to finish.
    pub fn stop(mut self) -> IngressStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => IngressStats::default(),
        }
    }

    /// Signal the worker to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for IngressWorker {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Event, InMemoryQueue, Publisher, Subscribable};
    use crate::ingress::IngressError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct Counting(Arc<AtomicUsize>);

    impl Consumer for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn handle(&self, event: &Event) -> Result<(), IngressError> {
            if event.event_type == "Bad" {
                return Err(IngressError::Rejected("bad".into()));
            }
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn wait_for(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !cond() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn worker_drains_and_reports() {
        let queue = InMemoryQueue::new();
        let consumer = Counting::default();
        let worker = IngressWorker::spawn(
            consumer.clone(),
            queue.subscribe("work"),
            Duration::from_millis(5),
        );

        for i in 0..5 {
            queue
                .publish("work", Event::new(format!("ok-{}", i), "Good", vec![]))
                .unwrap();
        }
        queue.publish("work", Event::new("bad", "Bad", vec![])).unwrap();

        wait_for(|| queue.acknowledged().len() == 5 && queue.dead_letters().len() == 1);
        let stats = worker.stop();

        assert_eq!(consumer.0.load(Ordering::SeqCst), 5);
        assert_eq!(stats.acked, 5);
        assert_eq!(stats.nacked, 1);
        assert_eq!(stats.received(), 6);
        assert!(stats.polls >= 6);
    }

    #[test]
    fn competing_workers_share_one_subscription() {
        let queue = InMemoryQueue::new();
        let consumer = Counting::default();
        let subscription = queue.subscribe("work");
        let workers: Vec<_> = (0..3)
            .map(|_| {
                IngressWorker::spawn(consumer.clone(), subscription.clone(), Duration::from_millis(5))
            })
            .collect();

        for i in 0..30 {
            queue
                .publish("work", Event::new(format!("m-{}", i), "Good", vec![]))
                .unwrap();
        }

        wait_for(|| queue.acknowledged().len() == 30);
        let total: usize = workers.into_iter().map(|w| w.stop().acked).sum();

        assert_eq!(total, 30);
        assert_eq!(consumer.0.load(Ordering::SeqCst), 30);
    }
}
