use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::bus::EventBus;
use crate::error::NotifyError;
use crate::event::Payload;
use crate::publisher::NamespacedPublisher;
use crate::queue::NotificationQueue;

use super::attachment::{Attachment, Attachments};
use super::policy::PrepareContext;
use super::Observed;

/// Local names reserved for lifecycle notifications.
const CREATED: &str = "created";
const DESTROYED: &str = "destroyed";

/// Per-namespace lifecycle phase of one entity instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Attached, no cycle run yet.
    Attached,
    /// Pre-commit ran; notifications are queued awaiting flush.
    Prepared,
    /// Post-commit flushed this cycle's notifications.
    Flushed,
    /// Post-destroy ran; terminal.
    Destroyed,
}

/// Drives an entity instance's notification cycle.
///
/// Created lazily on the instance's first lifecycle touch; holds the entity
/// type's shared [`Attachments`] read-only, plus this instance's own
/// [`NotificationQueue`] and per-namespace [`Phase`]. Each attachment is an
/// independent state machine: one namespace's subscriber failure does not
/// prevent a sibling namespace's flush.
///
/// The external lifecycle source calls in at three points:
///
/// - before a write is attempted → [`on_pre_commit`](Self::on_pre_commit)
/// - after a write succeeds → [`on_post_commit`](Self::on_post_commit)
/// - after a delete succeeds → [`on_post_destroy`](Self::on_post_destroy)
pub struct LifecycleAdapter<E> {
    bus: EventBus,
    attachments: Arc<Attachments<E>>,
    queue: NotificationQueue,
    phases: HashMap<String, Phase>,
}

impl<E: Observed> LifecycleAdapter<E> {
    pub fn new(bus: EventBus, attachments: Arc<Attachments<E>>) -> Self {
        let phases = attachments
            .namespaces()
            .map(|ns| (ns.to_string(), Phase::Attached))
            .collect();
        Self {
            bus,
            attachments,
            queue: NotificationQueue::new(),
            phases,
        }
    }

    /// Current phase for `namespace`, if attached.
    pub fn phase(&self, namespace: &str) -> Option<Phase> {
        self.phases.get(namespace).copied()
    }

    /// Notifications queued for `namespace`, awaiting flush.
    pub fn pending_len(&self, namespace: &str) -> usize {
        self.queue.pending_len(namespace)
    }

    /// Run the pre-commit phase for every attached namespace, in attachment
    /// order.
    ///
    /// Per namespace: reset its queue (stale notifications from a previous
    /// cycle must never re-emit), enqueue `created` if this is the entity's
    /// first-ever persisted state, then let the policy inspect the entity and
    /// enqueue the rest. A policy failure propagates immediately — it must
    /// block the write it was meant to observe — leaving sibling namespaces'
    /// already-prepared queues intact.
    pub fn on_pre_commit(&mut self, entity: &E) -> Result<(), NotifyError> {
        let attachments = Arc::clone(&self.attachments);
        for attachment in attachments.entries() {
            self.prepare(attachment, entity)?;
        }
        Ok(())
    }

    /// Pre-commit for a single namespace; unattached namespaces are a no-op.
    pub fn on_pre_commit_namespace(
        &mut self,
        namespace: &str,
        entity: &E,
    ) -> Result<(), NotifyError> {
        let attachments = Arc::clone(&self.attachments);
        match attachments.find(namespace) {
            Some(attachment) => self.prepare(attachment, entity),
            None => Ok(()),
        }
    }

    fn prepare(&mut self, attachment: &Attachment<E>, entity: &E) -> Result<(), NotifyError> {
        let namespace = attachment.namespace.as_str();
        self.guard_not_destroyed(namespace)?;

        self.queue.reset_namespace(namespace);
        if entity.newly_created() {
            self.queue.enqueue(namespace, CREATED, Payload::new());
        }

        let mut ctx = PrepareContext::new(namespace, &mut self.queue);
        attachment
            .policy
            .prepare(&mut ctx, entity)
            .map_err(|source| NotifyError::Policy {
                namespace: namespace.to_string(),
                source,
            })?;

        debug!(
            namespace,
            queued = self.queue.pending_len(namespace),
            "pre-commit prepared"
        );
        self.phases.insert(namespace.to_string(), Phase::Prepared);
        Ok(())
    }

    /// Flush every namespace's queued notifications after a successful write.
    ///
    /// Each entry is broadcast as `namespace.local_name` with the payload
    /// merged with `{"entity": <serialized snapshot>}`. Calling this twice
    /// without an intervening pre-commit drains already-empty queues — a safe
    /// no-op, tolerated for at-least-once lifecycle sources. A subscriber
    /// failure halts that namespace's remaining deliveries but sibling
    /// namespaces still flush; the first failure is returned afterwards.
    pub fn on_post_commit(&mut self, entity: &E) -> Result<(), NotifyError> {
        let snapshot = serde_json::to_value(entity)?;
        let attachments = Arc::clone(&self.attachments);

        let mut first_err = None;
        for attachment in attachments.entries() {
            let result = self.flush(&attachment.namespace, &snapshot, Phase::Flushed);
            if let Err(err) = result {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Post-commit flush for a single namespace; unattached namespaces are a
    /// no-op.
    pub fn on_post_commit_namespace(
        &mut self,
        namespace: &str,
        entity: &E,
    ) -> Result<(), NotifyError> {
        if self.attachments.find(namespace).is_none() {
            return Ok(());
        }
        let snapshot = serde_json::to_value(entity)?;
        self.flush(namespace, &snapshot, Phase::Flushed)
    }

    /// Emit a `destroyed` notification for every namespace and flush
    /// immediately — destroy has no separate "pre" phase because there is no
    /// subsequent write to wait for. Terminal: any later lifecycle call on
    /// this instance is an error.
    pub fn on_post_destroy(&mut self, entity: &E) -> Result<(), NotifyError> {
        let snapshot = serde_json::to_value(entity)?;
        let attachments = Arc::clone(&self.attachments);

        let mut first_err = None;
        for attachment in attachments.entries() {
            let namespace = attachment.namespace.as_str();
            if let Err(err) = self.guard_not_destroyed(namespace) {
                first_err.get_or_insert(err);
                continue;
            }
            self.queue.enqueue(namespace, DESTROYED, Payload::new());
            let result = self.flush(namespace, &snapshot, Phase::Destroyed);
            if let Err(err) = result {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn flush(
        &mut self,
        namespace: &str,
        snapshot: &Value,
        next: Phase,
    ) -> Result<(), NotifyError> {
        self.guard_not_destroyed(namespace)?;

        let entries = self.queue.drain(namespace);
        debug!(namespace, drained = entries.len(), "flush");
        self.phases.insert(namespace.to_string(), next);

        let publisher = NamespacedPublisher::new(self.bus.clone(), namespace);
        for notification in entries {
            let mut payload = notification.payload;
            payload.insert("entity".to_string(), snapshot.clone());
            publisher.broadcast(&notification.local_name, payload)?;
        }
        Ok(())
    }

    fn guard_not_destroyed(&self, namespace: &str) -> Result<(), NotifyError> {
        match self.phases.get(namespace) {
            Some(Phase::Destroyed) => Err(NotifyError::Destroyed {
                namespace: namespace.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
