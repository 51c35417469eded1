//! # Event bus: replay-free, order-preserving fan-out.
//!
//! [`Bus`] delivers every published [`ResourceEvent`] to every subscriber that
//! was registered at publish time. Each subscriber owns an unbounded queue, so
//! one slow reader never delays the publisher or other readers.
//!
//! ## Architecture
//! ```text
//! Publishers (many):              Subscribers (many):
//!   publish_update ──┐       ┌──► [queue S1] ──► Subscription 1 / WatchStream
//!   publish_update ──┼─► Bus ┼──► [queue S2] ──► Subscription 2
//!   publish_update ──┘       └──► [queue SN] ──► SubscriberSet worker
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` pushes into each queue and returns.
//! - **No replay**: a subscription only sees events published after it was created.
//! - **Per-subscriber FIFO**: each queue preserves publish order.
//! - **No lag**: queues are unbounded; resource-state events are low-frequency.
//! - **Cleanup**: dropping or closing a [`Subscription`] removes its queue; queues
//!   whose receiver vanished or whose cancel token fired are pruned on the next
//!   publish or count, without waiting for the reader to poll.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::event::ResourceEvent;

/// One subscriber's sending half plus the token that ends it, if any.
struct Queue {
    tx: mpsc::UnboundedSender<ResourceEvent>,
    cancel: Option<CancellationToken>,
}

impl Queue {
    fn is_live(&self) -> bool {
        !self.tx.is_closed()
            && !self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    queues: HashMap<u64, Queue>,
}

impl Registry {
    fn prune(&mut self) {
        self.queues.retain(|_, q| q.is_live());
    }
}

/// Multicast channel for resource events.
///
/// Cloneable; clones share the same subscriber set.
#[derive(Clone, Default)]
pub struct Bus {
    registry: Arc<Mutex<Registry>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `ev` to every active subscriber.
    pub fn publish(&self, ev: &ResourceEvent) {
        let mut reg = self.registry.lock();
        reg.queues.retain(|_, q| q.is_live() && q.tx.send(ev.clone()).is_ok());
    }

    /// Creates an independent subscription starting from "now".
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_until(None)
    }

    /// Like [`subscribe`](Self::subscribe), but the slot is released as soon
    /// as `cancel` fires, whether or not the subscription is still polled.
    pub fn subscribe_until(&self, cancel: Option<CancellationToken>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut reg = self.registry.lock();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.queues.insert(id, Queue { tx, cancel });

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of live subscriptions.
    ///
    /// Cancelled or closed subscriptions are released before counting.
    pub fn subscriber_count(&self) -> usize {
        let mut reg = self.registry.lock();
        reg.prune();
        reg.queues.len()
    }
}

/// One subscriber's ordered queue of events.
///
/// Implements [`Stream`]; the stream ends after [`close`](Self::close) once the
/// already queued events are drained, or when the bus is dropped.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<ResourceEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Waits for the next event.
    pub async fn recv(&mut self) -> Option<ResourceEvent> {
        self.rx.recv().await
    }

    /// Returns a queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ResourceEvent> {
        self.rx.try_recv().ok()
    }

    /// Stops further delivery and releases the subscriber slot.
    pub fn close(&mut self) {
        self.detach();
        self.rx.close();
    }

    fn detach(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().queues.remove(&self.id);
        }
    }

    pub(crate) fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<ResourceEvent>> {
        self.rx.poll_recv(cx)
    }
}

impl Stream for Subscription {
    type Item = ResourceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
