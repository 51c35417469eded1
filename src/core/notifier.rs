//! # ResourceNotifier: publish, watch and wait on resource state.
//!
//! The [`ResourceNotifier`] owns the [`SnapshotStore`], the event [`Bus`], the
//! waiters registered in the store's slots and the host [`Lifetime`].
//!
//! ## Publish path
//! ```text
//! publish_update(resource, transform)
//!   └─ SnapshotStore::update          (slot lock for resource.name held ──┐)
//!        ├─ transform(old) ─► new       (error → return, nothing changed) │
//!        ├─ store new                                                      │
//!        ├─ Bus::publish(ResourceEvent) ─► every watcher queue             │
//!        ├─ WaitList::notify(event)     ─► matching waiters resolved       │
//!        └─ logging policy:                                                │
//!             ├─ debug: "Resource {name}/{id} changed state: [old ->] new" │
//!             └─ trace: "Resource {name}/{id} update published: {snap}"    │
//!                                                          (lock released ┘)
//! ```
//!
//! Commit, broadcast, waiter checks and log lines for one resource name happen
//! under one lock, so watchers, waiters and the log observe the same
//! per-identity order. Different resources publish concurrently.
//!
//! The debug line is written only when the state label changes (ignoring
//! case) to a non-blank value; the trace line is written for every publish.

use std::convert::Infallible;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::builder::NotifierBuilder;
use super::config::Config;
use super::lifetime::Lifetime;
use super::store::{Commit, SnapshotStore};
use super::waiters::{TargetStates, WaitForResource};
use crate::events::{Bus, ResourceEvent, WatchStream};
use crate::resources::{ResourceId, ResourceRef, ResourceSnapshot, eq_ignore_case};
use crate::subscribers::SubscriberSet;

/// Tracks resource snapshots and notifies watchers and waiters of every change.
pub struct ResourceNotifier {
    cfg: Config,
    store: SnapshotStore,
    bus: Bus,
    lifetime: Lifetime,
    subs: Mutex<Option<SubscriberSet>>,
}

impl ResourceNotifier {
    /// Creates a notifier with default configuration bound to `lifetime`.
    pub fn new(lifetime: Lifetime) -> Self {
        Self::builder(Config::default()).with_lifetime(lifetime).build()
    }

    /// Returns a builder for custom configuration and subscribers.
    pub fn builder(cfg: Config) -> NotifierBuilder {
        NotifierBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: Config,
        bus: Bus,
        lifetime: Lifetime,
        subs: Option<SubscriberSet>,
    ) -> Self {
        Self {
            cfg,
            store: SnapshotStore::new(),
            bus,
            lifetime,
            subs: Mutex::new(subs),
        }
    }

    /// Publishes an update for the resource's own instance.
    pub async fn publish_update<F>(&self, resource: &ResourceRef, transform: F)
    where
        F: FnOnce(ResourceSnapshot) -> ResourceSnapshot,
    {
        self.commit(resource, resource.id(), |s| Ok::<_, Infallible>(transform(s)))
            .unwrap_or_else(|never| match never {});
    }

    /// Publishes an update for the replica `replica_id` of `resource`.
    pub async fn publish_replica_update<F>(
        &self,
        resource: &ResourceRef,
        replica_id: &str,
        transform: F,
    ) where
        F: FnOnce(ResourceSnapshot) -> ResourceSnapshot,
    {
        self.commit(resource, resource.replica_id(replica_id), |s| {
            Ok::<_, Infallible>(transform(s))
        })
        .unwrap_or_else(|never| match never {});
    }

    /// Publishes an update computed by a fallible transform.
    ///
    /// `replica_id = None` targets the resource's own instance.
    ///
    /// ### Errors
    /// Returns the transform's error unchanged. In that case nothing is stored,
    /// broadcast or resolved.
    pub async fn try_publish_update<F, E>(
        &self,
        resource: &ResourceRef,
        replica_id: Option<&str>,
        transform: F,
    ) -> Result<(), E>
    where
        F: FnOnce(ResourceSnapshot) -> Result<ResourceSnapshot, E>,
    {
        let id = match replica_id {
            Some(replica) => resource.replica_id(replica),
            None => resource.id(),
        };
        self.commit(resource, id, transform)
    }

    fn commit<F, E>(&self, resource: &ResourceRef, id: ResourceId, transform: F) -> Result<(), E>
    where
        F: FnOnce(ResourceSnapshot) -> Result<ResourceSnapshot, E>,
    {
        self.store.update(resource, &id, transform, |waiters, commit| {
            let ev = ResourceEvent::new(id.clone(), Arc::clone(resource), Arc::clone(&commit.new));
            self.bus.publish(&ev);
            waiters.notify(&ev);
            log_publish(&id, commit);
        })?;
        Ok(())
    }

    /// Streams every event published from now on, for all resources.
    ///
    /// The stream ends when `cancel` fires; dropping it unsubscribes. A fired
    /// token releases the subscriber slot even if the stream is never polled again.
    pub fn watch(&self, cancel: Option<CancellationToken>) -> WatchStream {
        WatchStream::new(self.bus.subscribe_until(cancel.clone()), cancel)
    }

    /// Waits until a resource called `name` (case-insensitive) reaches one of `targets`.
    ///
    /// `targets` may be a single state, several states, or `None` for the
    /// configured default (`Running`). The wait is registered before this
    /// method returns; if the resource is already in a target state the
    /// returned future is immediately ready.
    ///
    /// The future fails with [`WaitError::Canceled`](crate::WaitError::Canceled)
    /// when `cancel` or the lifetime's shutdown signal fires first.
    pub fn wait_for_resource(
        &self,
        name: &str,
        targets: impl Into<TargetStates>,
        cancel: Option<CancellationToken>,
    ) -> WaitForResource {
        let targets = targets.into().or_defaults(&self.cfg.default_targets());
        WaitForResource::register(
            &self.store.slot(name),
            name,
            targets,
            self.lifetime.stopping_token(),
            cancel,
        )
    }

    /// Current snapshot of `id`, if an update was ever published for it.
    pub fn current(&self, id: &ResourceId) -> Option<Arc<ResourceSnapshot>> {
        self.store.get(id)
    }

    /// Current snapshot of the resource's own instance, or its initial snapshot.
    pub fn snapshot(&self, resource: &ResourceRef) -> Arc<ResourceSnapshot> {
        self.store.get_or_create(resource, &resource.id())
    }

    /// Number of active watchers (streams and subscriber workers).
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Stops subscriber workers registered on the builder and awaits them.
    pub async fn shutdown(&self) {
        let subs = self.subs.lock().take();
        if let Some(subs) = subs {
            subs.shutdown().await;
        }
    }
}

/// State-label change worth a debug line.
#[derive(Debug, PartialEq, Eq)]
enum StateChange<'a> {
    First(&'a str),
    Transition { old: &'a str, new: &'a str },
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Logs only when the new label is non-blank and differs from the previous one
/// (ignoring case, as state labels do everywhere else).
fn state_change<'a>(old: Option<&'a str>, new: Option<&'a str>) -> Option<StateChange<'a>> {
    let new = new.filter(|s| !is_blank(s))?;
    if old.is_some_and(|old| eq_ignore_case(old, new)) {
        return None;
    }
    Some(match old.filter(|s| !is_blank(s)) {
        Some(old) => StateChange::Transition { old, new },
        None => StateChange::First(new),
    })
}

fn log_publish(id: &ResourceId, commit: &Commit) {
    let (name, instance) = (id.name(), id.instance());

    match state_change(commit.old.state_text(), commit.new.state_text()) {
        Some(StateChange::Transition { old, new }) => tracing::debug!(
            resource = name,
            instance,
            "Resource {}/{} changed state: {} -> {}",
            name,
            instance,
            old,
            new
        ),
        Some(StateChange::First(new)) => tracing::debug!(
            resource = name,
            instance,
            "Resource {}/{} changed state: {}",
            name,
            instance,
            new
        ),
        None => {}
    }

    tracing::trace!(
        resource = name,
        instance,
        "Resource {}/{} update published: {:?}",
        name,
        instance,
        commit.new
    );
}

impl std::fmt::Debug for ResourceNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceNotifier")
            .field("cfg", &self.cfg)
            .field("resources", &self.store.len())
            .field("subscribers", &self.bus.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_blank_state_logs_new_only() {
        let first = Some(StateChange::First("SomeState"));
        assert_eq!(state_change(None, Some("SomeState")), first);
        assert_eq!(state_change(Some(" "), Some("SomeState")), first);
    }

    #[test]
    fn changed_state_logs_transition() {
        assert_eq!(
            state_change(Some("SomeState"), Some("NewState")),
            Some(StateChange::Transition {
                old: "SomeState",
                new: "NewState"
            })
        );
    }

    #[test]
    fn repeats_and_blank_targets_are_silent() {
        assert_eq!(state_change(Some("SomeState"), Some("SomeState")), None);
        assert_eq!(state_change(Some("SomeState"), None), None);
        assert_eq!(state_change(Some("SomeState"), Some("")), None);
        assert_eq!(state_change(Some("SomeState"), Some("   ")), None);
    }

    #[test]
    fn case_only_changes_are_silent() {
        assert_eq!(state_change(Some("running"), Some("Running")), None);
        assert_eq!(state_change(Some("RUNNING"), Some("running")), None);
    }
}
