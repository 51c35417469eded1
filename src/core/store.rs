//! # Snapshot store with per-resource locking.
//!
//! Holds the current snapshot of every known [`ResourceId`] and the waiters
//! registered against each resource name.
//!
//! ## Architecture
//! ```text
//! SnapshotStore
//!   └─ RwLock<HashMap<folded name, Arc<Mutex<Slot>>>>     (held only to find/insert a slot)
//!         └─ Slot
//!              ├─ BTreeMap<ResourceId, Arc<ResourceSnapshot>>   (every instance of the name)
//!              └─ WaitList                                      (waiters on the name)
//! ```
//!
//! ## Rules
//! - Slots are created lazily and never removed.
//! - An absent identity reads as the resource's initial snapshot; reading never inserts.
//! - `update` runs transform → commit → `on_commit` under the slot lock, so a
//!   publish and the waiter checks it triggers form one atomic step per name.
//! - Updates to different names lock different slots and never contend.
//! - The transform runs before anything is written: if it fails (or panics)
//!   the slot is left as it was.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::waiters::{TargetStates, WaitList};
use crate::resources::{Resource, ResourceId, ResourceSnapshot, fold_name};

/// Result of a committed update.
#[derive(Debug, Clone)]
pub struct Commit {
    /// Snapshot before the update (the initial snapshot on first publish).
    pub old: Arc<ResourceSnapshot>,
    /// Snapshot after the update.
    pub new: Arc<ResourceSnapshot>,
}

/// Everything tracked for one resource name.
#[derive(Default)]
pub(crate) struct Slot {
    snapshots: BTreeMap<ResourceId, Arc<ResourceSnapshot>>,
    pub(crate) waiters: WaitList,
}

impl Slot {
    /// First state among this name's instances that matches `targets`.
    ///
    /// Primary instances are checked before replicas.
    pub(crate) fn matching_state(&self, targets: &TargetStates) -> Option<String> {
        let (primary, replicas): (Vec<_>, Vec<_>) =
            self.snapshots.iter().partition(|(id, _)| id.is_primary());

        primary
            .into_iter()
            .chain(replicas)
            .filter_map(|(_, snap)| snap.state_text())
            .find(|state| targets.matches(state))
            .map(str::to_owned)
    }
}

/// Current snapshot per identity, sharded by resource name.
#[derive(Default)]
pub struct SnapshotStore {
    slots: RwLock<HashMap<String, Arc<Mutex<Slot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `name` (case-insensitive), creating it if absent.
    pub(crate) fn slot(&self, name: &str) -> Arc<Mutex<Slot>> {
        let key = fold_name(name);
        if let Some(slot) = self.slots.read().get(&key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(key).or_default())
    }

    fn existing_slot(&self, name: &str) -> Option<Arc<Mutex<Slot>>> {
        self.slots.read().get(&fold_name(name)).cloned()
    }

    /// Current snapshot of `id`, if anything was ever published for it.
    pub fn get(&self, id: &ResourceId) -> Option<Arc<ResourceSnapshot>> {
        let slot = self.existing_slot(id.name())?;
        let guard = slot.lock();
        guard.snapshots.get(id).cloned()
    }

    /// Current snapshot of `id`, or the resource's initial snapshot.
    ///
    /// Does not insert anything.
    pub fn get_or_create(&self, resource: &Resource, id: &ResourceId) -> Arc<ResourceSnapshot> {
        self.get(id).unwrap_or_else(|| Arc::new(resource.initial_snapshot()))
    }

    /// Atomically replaces the snapshot of `id` with `transform(current)`.
    ///
    /// `on_commit` runs right after the new snapshot is stored, still under the
    /// slot lock, and receives the name's wait list.
    ///
    /// ### Errors
    /// Returns the transform's error unchanged; nothing is stored and
    /// `on_commit` is not called.
    pub fn update<F, E, C, R>(
        &self,
        resource: &Resource,
        id: &ResourceId,
        transform: F,
        on_commit: C,
    ) -> Result<(Commit, R), E>
    where
        F: FnOnce(ResourceSnapshot) -> Result<ResourceSnapshot, E>,
        C: FnOnce(&mut WaitList, &Commit) -> R,
    {
        let slot = self.slot(id.name());
        let mut guard = slot.lock();

        let old = guard
            .snapshots
            .get(id)
            .cloned()
            .unwrap_or_else(|| Arc::new(resource.initial_snapshot()));
        let new = Arc::new(transform(ResourceSnapshot::clone(&old))?);

        guard.snapshots.insert(id.clone(), Arc::clone(&new));
        let commit = Commit { old, new };
        let out = on_commit(&mut guard.waiters, &commit);
        Ok((commit, out))
    }

    /// Number of identities with a stored snapshot.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .map(|slot| slot.lock().snapshots.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    fn set_state(
        state: &'static str,
    ) -> impl FnOnce(ResourceSnapshot) -> Result<ResourceSnapshot, Infallible> {
        move |s| Ok(s.with_state(state))
    }

    #[test]
    fn absent_identity_reads_initial_without_inserting() {
        let store = SnapshotStore::new();
        let r = Resource::new("db").with_kind("Container");

        let snap = store.get_or_create(&r, &r.id());
        assert_eq!(snap.resource_type, "Container");
        assert!(store.get(&r.id()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn update_returns_old_and_new() {
        let store = SnapshotStore::new();
        let r = Resource::new("db");

        let (first, ()) = store.update(&r, &r.id(), set_state("Starting"), |_, _| ()).unwrap();
        assert_eq!(first.old.state_text(), None);
        assert_eq!(first.new.state_text(), Some("Starting"));

        let (second, ()) = store.update(&r, &r.id(), set_state("Running"), |_, _| ()).unwrap();
        assert_eq!(second.old.state_text(), Some("Starting"));
        assert!(Arc::ptr_eq(&second.old, &first.new));
        assert_eq!(store.get(&r.id()).unwrap().state_text(), Some("Running"));
    }

    #[test]
    fn failed_transform_leaves_store_untouched() {
        let store = SnapshotStore::new();
        let r = Resource::new("db");
        store.update(&r, &r.id(), set_state("Running"), |_, _| ()).unwrap();

        let mut hook_ran = false;
        let err = store
            .update(&r, &r.id(), |_| Err("boom"), |_, _| hook_ran = true)
            .unwrap_err();

        assert_eq!(err, "boom");
        assert!(!hook_ran);
        assert_eq!(store.get(&r.id()).unwrap().state_text(), Some("Running"));
    }

    #[test]
    fn replicas_are_tracked_separately() {
        let store = SnapshotStore::new();
        let r = Resource::new("web");
        store.update(&r, &r.id(), set_state("Running"), |_, _| ()).unwrap();
        store.update(&r, &r.replica_id("web-1"), set_state("Starting"), |_, _| ()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&r.id()).unwrap().state_text(), Some("Running"));
        assert_eq!(store.get(&r.replica_id("web-1")).unwrap().state_text(), Some("Starting"));
    }

    #[test]
    fn slots_are_shared_across_name_casing() {
        let store = SnapshotStore::new();
        let a = store.slot("myResource1");
        let b = store.slot("MYreSouRCe1");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &store.slot("other")));
    }

    #[test]
    fn matching_state_prefers_primary() {
        let store = SnapshotStore::new();
        let r = Resource::new("web");
        store.update(&r, &r.replica_id("a"), set_state("Running"), |_, _| ()).unwrap();
        store.update(&r, &r.id(), set_state("running"), |_, _| ()).unwrap();

        let slot = store.slot("web");
        let found = slot.lock().matching_state(&TargetStates::from("RUNNING"));
        assert_eq!(found.as_deref(), Some("running"));
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store = Arc::new(SnapshotStore::new());
        let r = Arc::new(Resource::new("counter"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let r = Arc::clone(&r);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update(
                                &r,
                                &r.id(),
                                |s| Ok::<_, Infallible>(s.with_property("tick", "1")),
                                |_, _| (),
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.get(&r.id()).unwrap().properties.len(), 800);
    }
}
