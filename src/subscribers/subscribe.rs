//! # Core subscriber trait
//!
//! `Subscribe` is the push-style alternative to `ResourceNotifier::watch()`:
//! implementations are registered on the builder and driven by a dedicated
//! worker fed from the bus.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries) – they do **not** block
//!   publishers nor other subscribers.
//! - Each subscriber sees every event published after the notifier was built,
//!   in publish order.
//!
//! ## Example
//! ```rust
//! use statevisor::{ResourceEvent, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, ev: &ResourceEvent) {
//!         let _ = (ev.resource_name(), ev.state_text());
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::ResourceEvent;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &ResourceEvent);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
