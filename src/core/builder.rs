use std::sync::Arc;

use super::{config::Config, lifetime::Lifetime, notifier::ResourceNotifier};
use crate::{
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`ResourceNotifier`] with optional features.
pub struct NotifierBuilder {
    cfg: Config,
    lifetime: Option<Lifetime>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl NotifierBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            lifetime: None,
            subscribers: Vec::new(),
        }
    }

    /// Binds waits to the host's shutdown signal.
    ///
    /// Without this the notifier gets a private [`Lifetime`] that only
    /// stops when [`Lifetime::stop`] is called on `notifier.lifetime()`.
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Sets push-style event subscribers.
    ///
    /// Each subscriber receives every event through a dedicated worker.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the notifier.
    ///
    /// Subscriber workers stop when the lifetime's shutdown signal fires or on
    /// [`ResourceNotifier::shutdown`]. Must be called within a tokio runtime
    /// when subscribers were given.
    pub fn build(self) -> ResourceNotifier {
        let bus = Bus::new();
        let lifetime = self.lifetime.unwrap_or_default();

        let subs = (!self.subscribers.is_empty()).then(|| {
            SubscriberSet::new(
                self.subscribers,
                &bus,
                lifetime.stopping_token().child_token(),
            )
        });

        ResourceNotifier::from_parts(self.cfg, bus, lifetime, subs)
    }
}
