//! # SubscriberSet: one worker per subscriber
//!
//! [`SubscriberSet`] gives each [`Subscribe`] implementation its own bus
//! [`Subscription`](crate::events::Subscription) and a worker task draining it.
//!
//! ## What it guarantees
//! - Per-subscriber FIFO (publish order).
//! - Panics inside subscribers are caught and logged (isolation); the worker
//!   keeps going with the next event.
//! - A slow subscriber only delays itself.
//!
//! ## What it does **not** guarantee
//! - No ordering across different subscribers.
//! - Events still queued when the stop token fires are not delivered.
//!
//! ## Diagram
//! ```text
//!    Bus::publish(&ResourceEvent)
//!        │
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Subscribe;
use crate::events::Bus;

/// Composite fan-out with per-subscriber queues and worker tasks.
pub struct SubscriberSet {
    names: Vec<&'static str>,
    workers: Vec<JoinHandle<()>>,
    stop: CancellationToken,
}

impl SubscriberSet {
    /// Subscribes every entry to `bus` and spawns one worker each.
    ///
    /// Workers exit when `stop` fires or the bus is dropped.
    /// Must be called within a tokio runtime when `subs` is non-empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: &Bus, stop: CancellationToken) -> Self {
        let mut names = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let mut queue = bus.subscribe();
            let stop = stop.clone();
            names.push(sub.name());

            let handle = tokio::spawn(async move {
                loop {
                    let ev = tokio::select! {
                        biased;
                        _ = stop.cancelled() => break,
                        ev = queue.recv() => match ev {
                            Some(ev) => ev,
                            None => break,
                        },
                    };

                    let fut = sub.on_event(&ev);
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::warn!(
                            subscriber = sub.name(),
                            resource = ev.resource_name(),
                            instance = ev.resource_id(),
                            "subscriber panicked: {}",
                            panic_message(panic_err.as_ref()),
                        );
                    }
                }
            });
            workers.push(handle);
        }

        Self {
            names,
            workers,
            stop,
        }
    }

    /// Graceful shutdown: stop all workers and await their completion.
    pub async fn shutdown(self) {
        self.stop.cancel();
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// Names of the registered subscribers, in registration order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    use super::*;
    use crate::events::ResourceEvent;
    use crate::resources::Resource;

    fn event(name: &str) -> ResourceEvent {
        let r = Resource::new(name).into_ref();
        let snap = Arc::new(r.initial_snapshot());
        ResourceEvent::new(r.id(), r, snap)
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        notify: Notify,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &ResourceEvent) {
            self.seen.lock().push(ev.resource_name().to_owned());
            self.notify.notify_one();
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker(AtomicUsize);

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, ev: &ResourceEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
            if ev.resource_name() == "boom" {
                panic!("boom");
            }
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_survives_panics() {
        let bus = Bus::new();
        let recorder = Arc::new(Recorder::default());
        let panicker = Arc::new(Panicker(AtomicUsize::new(0)));
        let set = SubscriberSet::new(
            vec![recorder.clone() as Arc<dyn Subscribe>, panicker.clone() as _],
            &bus,
            CancellationToken::new(),
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.names()[0], "recorder");

        for name in ["a", "boom", "b"] {
            bus.publish(&event(name));
        }
        while recorder.seen.lock().len() < 3 {
            recorder.notify.notified().await;
        }
        assert_eq!(*recorder.seen.lock(), ["a", "boom", "b"]);
        while panicker.0.load(Ordering::SeqCst) < 3 {
            tokio::task::yield_now().await;
        }

        set.shutdown().await;
        assert_eq!(bus.subscriber_count(), 0);
    }
}
