//! # statevisor
//!
//! **Statevisor** tracks the latest state of a dynamic set of named resources,
//! broadcasts every state change to any number of watchers in publish order,
//! and lets callers wait until a resource reaches one of a set of states.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   publish_update(resource, |snapshot| ...)        watch()            wait_for_resource(name, states)
//!              │                                      ▲                        │        ▲
//!              ▼                                      │                        ▼        │
//! ┌───────────────────────────────────────────────────┼────────────────────────────────┼───┐
//! │  ResourceNotifier                                 │                                │   │
//! │                                                   │                                │   │
//! │  SnapshotStore ── slot(name) ─┐                   │                                │   │
//! │   (one lock per name)         ▼                   │                                │   │
//! │                 ┌──────────────────────────┐      │                                │   │
//! │                 │ Slot                     │      │                                │   │
//! │                 │  snapshots by ResourceId │      │                                │   │
//! │                 │  WaitList ───────────────┼──────┼──── resolves ──────────────────┘   │
//! │                 └────────────┬─────────────┘      │                                    │
//! │                              │ ResourceEvent      │                                    │
//! │                              ▼                    │                                    │
//! │                 Bus (one unbounded queue per subscriber)                               │
//! │                   ├──► WatchStream ───────────────┘                                    │
//! │                   └──► SubscriberSet workers ──► Subscribe::on_event                   │
//! │                                                                                        │
//! │  Lifetime (shutdown token) ──► cancels every pending wait                              │
//! └────────────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Publish
//! ```text
//! lock slot(name)
//!   ├─ old = current snapshot (or the resource's initial snapshot)
//!   ├─ new = transform(old)          error → unlock, return error, nothing changed
//!   ├─ store new
//!   ├─ Bus::publish(event)           every active watcher, in order
//!   └─ WaitList::notify(event)       matching waiters resolved
//! unlock
//! log: debug on state-label change, trace on every publish
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Publishing**    | Pure snapshot transforms, atomic per resource.               | [`ResourceNotifier`], [`ResourceSnapshot`]  |
//! | **Watching**      | Replay-free, ordered fan-out to every watcher.               | [`WatchStream`], [`Bus`]                    |
//! | **Waiting**       | Case-insensitive target states, no missed wakeups.           | [`WaitForResource`], [`TargetStates`]       |
//! | **Subscribers**   | Push-style observers with panic isolation.                   | [`Subscribe`], [`SubscriberSet`]            |
//! | **Shutdown**      | Process-wide signal cancelling every wait.                   | [`Lifetime`]                                |
//! | **Errors**        | Typed wait errors.                                           | [`WaitError`]                               |
//! | **Configuration** | Default wait targets.                                        | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use futures::StreamExt;
//! use statevisor::{KnownStates, Lifetime, Resource, ResourceNotifier};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let notifier = ResourceNotifier::new(Lifetime::new());
//!     let db = Resource::new("db").with_kind("Container").into_ref();
//!
//!     let mut events = notifier.watch(None);
//!     let ready = notifier.wait_for_resource("DB", None::<&str>, None);
//!
//!     notifier
//!         .publish_update(&db, |s| s.with_state(KnownStates::STARTING))
//!         .await;
//!     notifier
//!         .publish_update(&db, |s| s.with_state(KnownStates::RUNNING))
//!         .await;
//!
//!     assert_eq!(ready.await?, "Running");
//!
//!     let first = events.next().await.expect("event");
//!     assert_eq!(first.state_text(), Some("Starting"));
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod resources;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Commit, Config, Lifetime, NotifierBuilder, ResourceNotifier, SnapshotStore, TargetStates,
    WaitForResource, WaitList,
};
pub use error::WaitError;
pub use events::{Bus, ResourceEvent, Subscription, WatchStream};
pub use resources::{
    EnvVar, InitialState, KnownStates, Property, Resource, ResourceId, ResourceRef,
    ResourceSnapshot, ResourceState,
};
pub use subscribers::{Subscribe, SubscriberSet};
