//! # Push-style event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that
//! drives registered subscribers from the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   publish_update ──► Bus ──► per-subscriber queue ──► worker ──► Subscribe::on_event(&ResourceEvent)
//!                       │
//!                       └──► WatchStream (pull-style watchers)
//! ```

mod set;
mod subscribe;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;
