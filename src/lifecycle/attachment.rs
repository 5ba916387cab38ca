use std::sync::Arc;

use crate::error::NotifyError;

use super::policy::PublisherPolicy;

/// One (namespace, policy) pair registered on an entity type.
pub(crate) struct Attachment<E> {
    pub(crate) namespace: String,
    pub(crate) policy: Arc<dyn PublisherPolicy<E>>,
}

/// Immutable attachment list for an entity type.
///
/// Built once at type-registration time and shared read-only by every
/// instance's adapter; only the per-instance
/// [`NotificationQueue`](crate::NotificationQueue) is mutable.
pub struct Attachments<E> {
    entries: Vec<Attachment<E>>,
}

impl<E> Attachments<E> {
    pub fn builder() -> AttachmentsBuilder<E> {
        AttachmentsBuilder {
            entries: Vec::new(),
        }
    }

    /// Attached namespaces, in attachment order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.namespace.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[Attachment<E>] {
        &self.entries
    }

    pub(crate) fn find(&self, namespace: &str) -> Option<&Attachment<E>> {
        self.entries
            .iter()
            .find(|entry| entry.namespace == namespace)
    }
}

/// Builds an [`Attachments`] list, registered once per entity type.
pub struct AttachmentsBuilder<E> {
    entries: Vec<Attachment<E>>,
}

impl<E> std::fmt::Debug for AttachmentsBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentsBuilder")
            .field(
                "namespaces",
                &self
                    .entries
                    .iter()
                    .map(|entry| entry.namespace.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<E> AttachmentsBuilder<E> {
    /// Attach a policy under `namespace`. Idempotent per namespace:
    /// re-attaching the same namespace replaces the policy.
    pub fn attach(
        mut self,
        namespace: impl Into<String>,
        policy: impl PublisherPolicy<E> + 'static,
    ) -> Self {
        let namespace = namespace.into();
        let policy: Arc<dyn PublisherPolicy<E>> = Arc::new(policy);
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.namespace == namespace)
        {
            Some(entry) => entry.policy = policy,
            None => self.entries.push(Attachment { namespace, policy }),
        }
        self
    }

    /// Like [`attach`](AttachmentsBuilder::attach), but rejects a namespace
    /// that is already taken — for callers composing attachments from
    /// unrelated producers, where a silent replace would swallow one of them.
    pub fn try_attach(
        self,
        namespace: impl Into<String>,
        policy: impl PublisherPolicy<E> + 'static,
    ) -> Result<Self, NotifyError> {
        let namespace = namespace.into();
        if self.entries.iter().any(|entry| entry.namespace == namespace) {
            return Err(NotifyError::DuplicateNamespace(namespace));
        }
        Ok(self.attach(namespace, policy))
    }

    /// Finalize the list. The `Arc` is shared by every instance's adapter.
    pub fn build(self) -> Arc<Attachments<E>> {
        Arc::new(Attachments {
            entries: self.entries,
        })
    }
}
