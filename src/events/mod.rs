//! Resource events: types, multicast bus and watch streams.
//!
//! This module groups the event **data model** and the **bus** used to fan
//! out every committed snapshot to watchers.
//!
//! ## Contents
//! - [`ResourceEvent`] committed snapshot plus identity and resource handle
//! - [`Bus`] replay-free multicast with one unbounded queue per subscriber
//! - [`Subscription`] a single subscriber's queue
//! - [`WatchStream`] cancellable `Stream` over a subscription
//!
//! ## Quick reference
//! - **Publisher**: `ResourceNotifier::publish_update` (under the resource's lock).
//! - **Consumers**: `ResourceNotifier::watch()` callers and `SubscriberSet` workers.

mod bus;
mod event;
mod watch;

pub use bus::{Bus, Subscription};
pub use event::ResourceEvent;
pub use watch::WatchStream;
