//! NotificationQueue - per-entity accumulator of pending notifications.

use std::collections::HashMap;

use crate::event::Payload;

/// A notification queued during pre-commit, awaiting flush.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub local_name: String,
    pub payload: Payload,
}

/// Pending notifications for one entity instance, keyed by namespace.
///
/// Owned exclusively by the entity's [`LifecycleAdapter`](crate::LifecycleAdapter);
/// entities are reused across many save cycles, so the owning namespace's
/// entries are reset at the start of every pre-commit phase — the invariant
/// that prevents a previous cycle's notifications from being re-emitted.
///
/// No de-duplication: enqueuing the same local name twice produces two
/// emissions.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: HashMap<String, Vec<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all pending entries, every namespace.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Discard pending entries for one namespace; others are untouched.
    pub fn reset_namespace(&mut self, namespace: &str) {
        self.pending.remove(namespace);
    }

    /// Append a notification for `namespace`.
    pub fn enqueue(
        &mut self,
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        payload: Payload,
    ) {
        self.pending
            .entry(namespace.into())
            .or_default()
            .push(Notification {
                local_name: local_name.into(),
                payload,
            });
    }

    /// Return and clear pending entries for `namespace`, in enqueue order.
    pub fn drain(&mut self, namespace: &str) -> Vec<Notification> {
        self.pending.remove(namespace).unwrap_or_default()
    }

    /// Number of entries pending for `namespace`.
    pub fn pending_len(&self, namespace: &str) -> usize {
        self.pending.get(namespace).map(Vec::len).unwrap_or(0)
    }
}
