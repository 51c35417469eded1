//! # Wait registry: resolve "wait until resource reaches state S" requests.
//!
//! A waiter is registered against a resource **name** with a set of target
//! state labels. Registration and the check of the current snapshot happen
//! under the same slot lock that `publish_update` holds while committing, so a
//! publish can never slip between "check" and "start listening".
//!
//! ## Resolution
//! ```text
//! wait_for_resource(name, targets)
//!   lock slot(name)
//!     ├─ current state ∈ targets ─► Ready(state)            (no event needed)
//!     └─ otherwise ──────────────► push Waiter{targets, tx}
//!   unlock
//!
//! publish_update (under the same slot lock)
//!   └─ WaitList::notify(event)
//!        └─ event state ∈ waiter.targets ─► tx.send(state), waiter removed
//!
//! cancel (caller token or shutdown) / future dropped
//!   └─ WaitGuard::drop ─► lock slot, remove waiter
//! ```
//!
//! ## Rules
//! - State labels compare case-insensitively; the resolved value is the label as published.
//! - Each waiter resolves at most once and is removed when it does.
//! - Cancellation always removes the waiter; nothing is left behind.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::store::Slot;
use crate::error::WaitError;
use crate::events::ResourceEvent;
use crate::resources::eq_ignore_case;

/// Set of acceptable state labels for a wait.
///
/// An empty set means "use the notifier's default" (`Running` unless configured otherwise).
///
/// ## Example
/// ```rust
/// use statevisor::TargetStates;
///
/// let targets = TargetStates::from(["SomeState", "SomeOtherState"]);
/// assert!(targets.matches("someotherstate"));
/// assert!(TargetStates::from(None).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetStates(Vec<String>);

impl TargetStates {
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(states.into_iter().map(Into::into).collect())
    }

    /// True if `state` equals one of the targets, ignoring case.
    pub fn matches(&self, state: &str) -> bool {
        self.0.iter().any(|t| eq_ignore_case(t, state))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Replaces an empty set with `defaults`.
    pub(crate) fn or_defaults(self, defaults: &[String]) -> Self {
        if self.is_empty() {
            Self(defaults.to_vec())
        } else {
            self
        }
    }
}

impl From<&str> for TargetStates {
    fn from(state: &str) -> Self {
        Self(vec![state.to_owned()])
    }
}

impl From<String> for TargetStates {
    fn from(state: String) -> Self {
        Self(vec![state])
    }
}

impl From<Option<&str>> for TargetStates {
    fn from(state: Option<&str>) -> Self {
        state.map(Self::from).unwrap_or_default()
    }
}

impl From<&[&str]> for TargetStates {
    fn from(states: &[&str]) -> Self {
        Self::new(states.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for TargetStates {
    fn from(states: [&str; N]) -> Self {
        Self::new(states)
    }
}

impl From<Vec<&str>> for TargetStates {
    fn from(states: Vec<&str>) -> Self {
        Self::new(states)
    }
}

impl From<Vec<String>> for TargetStates {
    fn from(states: Vec<String>) -> Self {
        Self(states)
    }
}

/// One pending wait.
struct Waiter {
    id: u64,
    targets: TargetStates,
    tx: oneshot::Sender<String>,
}

/// Pending waits for one resource name.
#[derive(Default)]
pub struct WaitList {
    next_id: u64,
    waiters: Vec<Waiter>,
}

impl WaitList {
    fn push(&mut self, targets: TargetStates, tx: oneshot::Sender<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.waiters.push(Waiter { id, targets, tx });
        id
    }

    /// Resolves every waiter whose targets contain the event's state.
    ///
    /// Returns the number of waiters resolved. Waiters whose future is gone
    /// are dropped along the way.
    pub fn notify(&mut self, ev: &ResourceEvent) -> usize {
        let Some(state) = ev.state_text() else {
            self.waiters.retain(|w| !w.tx.is_closed());
            return 0;
        };

        let (hits, pending): (Vec<Waiter>, Vec<Waiter>) = std::mem::take(&mut self.waiters)
            .into_iter()
            .partition(|w| w.targets.matches(state));
        self.waiters = pending;
        self.waiters.retain(|w| !w.tx.is_closed());

        hits.into_iter()
            .map(|w| w.tx.send(state.to_owned()).is_ok())
            .filter(|sent| *sent)
            .count()
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.waiters.len();
        self.waiters.retain(|w| w.id != id);
        self.waiters.len() != before
    }

    /// Number of pending waiters.
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

/// Removes a waiter from its slot when the wait ends for any reason.
struct WaitGuard {
    slot: Arc<Mutex<Slot>>,
    id: u64,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.slot.lock().waiters.remove(self.id);
    }
}

/// Outcome of registering a wait.
enum Registration {
    Ready(String),
    Pending(oneshot::Receiver<String>, WaitGuard),
}

/// Checks the current state and registers a waiter as one atomic step.
fn register(slot: &Arc<Mutex<Slot>>, targets: TargetStates) -> Registration {
    let mut guard = slot.lock();
    if let Some(state) = guard.matching_state(&targets) {
        return Registration::Ready(state);
    }

    let (tx, rx) = oneshot::channel();
    let id = guard.waiters.push(targets, tx);
    Registration::Pending(
        rx,
        WaitGuard {
            slot: Arc::clone(slot),
            id,
        },
    )
}

/// Future returned by [`ResourceNotifier::wait_for_resource`](crate::ResourceNotifier::wait_for_resource).
///
/// The wait is registered when this value is created, not when it is first
/// polled: a publish that happens between creating the future and awaiting it
/// is never missed. Dropping the future deregisters the wait.
///
/// Resolves to the matched state label, or [`WaitError::Canceled`] when the
/// caller's token or the shutdown signal fires first.
#[must_use = "futures do nothing unless awaited; dropping this cancels the wait"]
pub struct WaitForResource {
    inner: Pin<Box<dyn Future<Output = Result<String, WaitError>> + Send>>,
}

impl WaitForResource {
    pub(crate) fn register(
        slot: &Arc<Mutex<Slot>>,
        resource: &str,
        targets: TargetStates,
        shutdown: CancellationToken,
        caller: Option<CancellationToken>,
    ) -> Self {
        let (rx, guard) = match register(slot, targets) {
            Registration::Ready(state) => {
                return Self {
                    inner: Box::pin(std::future::ready(Ok(state))),
                };
            }
            Registration::Pending(rx, guard) => (rx, guard),
        };

        let resource = resource.to_owned();
        let inner = async move {
            let _guard = guard;
            let caller_cancelled = async {
                match &caller {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                res = rx => res.map_err(|_| WaitError::Canceled { resource }),
                _ = shutdown.cancelled() => Err(WaitError::Canceled { resource }),
                _ = caller_cancelled => Err(WaitError::Canceled { resource }),
            }
        };

        Self {
            inner: Box::pin(inner),
        }
    }
}

impl Future for WaitForResource {
    type Output = Result<String, WaitError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;
    use crate::resources::Resource;

    fn event(state: Option<&str>) -> ResourceEvent {
        let r = Resource::new("db").into_ref();
        let mut snap = r.initial_snapshot();
        if let Some(state) = state {
            snap = snap.with_state(state);
        }
        ResourceEvent::new(r.id(), r, Arc::new(snap))
    }

    fn pending(slot: &Arc<Mutex<Slot>>, targets: impl Into<TargetStates>) -> WaitForResource {
        WaitForResource::register(slot, "db", targets.into(), CancellationToken::new(), None)
    }

    #[test]
    fn target_conversions() {
        assert_eq!(TargetStates::from("A").iter().collect::<Vec<_>>(), ["A"]);
        assert!(TargetStates::from(None::<&str>).is_empty());
        assert_eq!(TargetStates::from(vec!["A", "B"]).iter().count(), 2);
        let defaults = vec!["Running".to_owned()];
        assert!(TargetStates::default().or_defaults(&defaults).matches("running"));
        assert!(!TargetStates::from("X").or_defaults(&defaults).matches("running"));
    }

    #[tokio::test]
    async fn notify_resolves_matching_waiters_only() {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let a = pending(&slot, "SomeState");
        let b = pending(&slot, ["Other", "somestate"]);
        let c = pending(&slot, "Never");
        assert_eq!(slot.lock().waiters.len(), 3);

        let resolved = slot.lock().waiters.notify(&event(Some("SomeState")));
        assert_eq!(resolved, 2);
        assert_eq!(slot.lock().waiters.len(), 1);

        assert_eq!(a.await.unwrap(), "SomeState");
        assert_eq!(b.await.unwrap(), "SomeState");
        drop(c);
        assert!(slot.lock().waiters.is_empty());
    }

    #[tokio::test]
    async fn stateless_event_resolves_nothing() {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let mut wait = pending(&slot, "Running");

        assert_eq!(slot.lock().waiters.notify(&event(None)), 0);
        assert!((&mut wait).now_or_never().is_none());
        assert_eq!(slot.lock().waiters.len(), 1);
    }

    #[tokio::test]
    async fn caller_token_cancels_and_deregisters() {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let token = CancellationToken::new();
        let wait = WaitForResource::register(
            &slot,
            "db",
            "Running".into(),
            CancellationToken::new(),
            Some(token.clone()),
        );

        token.cancel();
        let err = wait.await.unwrap_err();
        assert!(matches!(err, WaitError::Canceled { ref resource } if resource == "db"));
        assert!(slot.lock().waiters.is_empty());
    }

    #[tokio::test]
    async fn shutdown_token_cancels() {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let shutdown = CancellationToken::new();
        let wait = WaitForResource::register(&slot, "db", "Running".into(), shutdown.clone(), None);

        shutdown.cancel();
        assert!(wait.await.is_err());
        assert!(slot.lock().waiters.is_empty());
    }
}
