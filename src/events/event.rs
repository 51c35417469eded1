//! # Resource state-change events.
//!
//! A [`ResourceEvent`] is emitted for every committed update: it carries the
//! identity that changed, the resource handle the update was published for,
//! and the snapshot that resulted from the update.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Events for one resource name are assigned their `seq` under
//! that resource's lock, so for a single identity `seq` order equals commit
//! order. Across different resources `seq` only says which event was built
//! first, not which one a watcher will observe first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::resources::{ResourceId, ResourceRef, ResourceSnapshot};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Immutable notification of one committed snapshot.
///
/// Cheap to clone: every field is reference-counted or `Copy`.
#[derive(Clone, Debug)]
pub struct ResourceEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock time of the commit.
    pub at: SystemTime,
    /// Identity whose snapshot changed.
    pub id: ResourceId,
    /// Handle the update was published for.
    pub resource: ResourceRef,
    /// Snapshot after the update.
    pub snapshot: Arc<ResourceSnapshot>,
}

impl ResourceEvent {
    pub(crate) fn new(
        id: ResourceId,
        resource: ResourceRef,
        snapshot: Arc<ResourceSnapshot>,
    ) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            id,
            resource,
            snapshot,
        }
    }

    /// Instance id of the identity that changed.
    #[inline]
    pub fn resource_id(&self) -> &str {
        self.id.instance()
    }

    /// Resource name.
    #[inline]
    pub fn resource_name(&self) -> &str {
        self.id.name()
    }

    /// State label of the resulting snapshot.
    #[inline]
    pub fn state_text(&self) -> Option<&str> {
        self.snapshot.state_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resource;

    #[test]
    fn sequence_increases() {
        let r = Resource::new("a").into_ref();
        let snap = Arc::new(r.initial_snapshot());
        let first = ResourceEvent::new(r.id(), Arc::clone(&r), Arc::clone(&snap));
        let second = ResourceEvent::new(r.replica_id("a-1"), Arc::clone(&r), snap);

        assert!(second.seq > first.seq);
        assert_eq!(first.resource_id(), "a");
        assert_eq!(second.resource_id(), "a-1");
        assert_eq!(second.resource_name(), "a");
        assert!(Arc::ptr_eq(&first.resource, &second.resource));
    }
}
