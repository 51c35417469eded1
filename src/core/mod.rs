//! Notifier core: snapshot storage, waits and orchestration.
//!
//! The only entry point most callers need is [`ResourceNotifier`]; the
//! building blocks are public for embedding and testing.
//!
//! Internal modules:
//! - [`store`]: per-name slots holding snapshots and waiters;
//! - [`waiters`]: target-state matching, waiter registration and the wait future;
//! - [`notifier`]: publish/watch/wait orchestration and the logging policy;
//! - [`lifetime`]: host shutdown signal;
//! - [`builder`]: notifier construction.

mod builder;
mod config;
mod lifetime;
mod notifier;
mod store;
mod waiters;

pub use builder::NotifierBuilder;
pub use config::Config;
pub use lifetime::Lifetime;
pub use notifier::ResourceNotifier;
pub use store::{Commit, SnapshotStore};
pub use waiters::{TargetStates, WaitForResource, WaitList};
