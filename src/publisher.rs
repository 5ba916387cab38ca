//! NamespacedPublisher - namespace-prefixed broadcasting.

use crate::bus::EventBus;
use crate::error::{BoxError, NotifyError};
use crate::event::Payload;

/// Publishes events under a fixed namespace prefix.
///
/// `broadcast("created", ..)` on a publisher with namespace `"user"` publishes
/// `"user.created"`. Composition is a pure string join; a publisher with an
/// empty namespace behaves as the bare bus. Stateless beyond its namespace —
/// many instances may share one.
#[derive(Clone)]
pub struct NamespacedPublisher {
    bus: EventBus,
    namespace: String,
}

impl NamespacedPublisher {
    /// Create a publisher broadcasting into `namespace` on `bus`.
    pub fn new(bus: EventBus, namespace: impl Into<String>) -> Self {
        Self {
            bus,
            namespace: namespace.into(),
        }
    }

    /// The namespace this publisher prefixes onto every event name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn full_name(&self, local_name: &str) -> String {
        if self.namespace.is_empty() {
            local_name.to_string()
        } else {
            format!("{}.{}", self.namespace, local_name)
        }
    }

    /// Broadcast `local_name` under this publisher's namespace.
    pub fn broadcast(&self, local_name: &str, payload: Payload) -> Result<(), NotifyError> {
        self.bus.publish(self.full_name(local_name), payload)
    }

    /// Timed/error-capturing broadcast; see
    /// [`EventBus::publish_timed`](crate::EventBus::publish_timed).
    pub fn broadcast_timed<T, F>(
        &self,
        local_name: &str,
        payload: Payload,
        body: F,
    ) -> Result<T, NotifyError>
    where
        F: FnOnce() -> Result<T, BoxError>,
    {
        self.bus.publish_timed(self.full_name(local_name), payload, body)
    }
}
