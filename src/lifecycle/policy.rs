use crate::error::BoxError;
use crate::event::Payload;
use crate::queue::NotificationQueue;

/// Enqueue surface handed to a policy during pre-commit.
///
/// Scoped to the namespace being prepared: a policy cannot enqueue into a
/// sibling namespace's queue.
pub struct PrepareContext<'a> {
    namespace: &'a str,
    queue: &'a mut NotificationQueue,
}

impl<'a> PrepareContext<'a> {
    pub(crate) fn new(namespace: &'a str, queue: &'a mut NotificationQueue) -> Self {
        Self { namespace, queue }
    }

    /// The namespace this context prepares.
    pub fn namespace(&self) -> &str {
        self.namespace
    }

    /// Queue a notification for emission after the write succeeds.
    pub fn enqueue(&mut self, local_name: impl Into<String>, payload: Payload) {
        self.queue.enqueue(self.namespace, local_name, payload);
    }
}

/// Per-entity-type logic deciding which notifications to enqueue at
/// pre-commit, based on inspecting what changed.
///
/// A failing `prepare` blocks the very write it was meant to observe — the
/// failure propagates to whoever triggered the pre-commit hook.
///
/// Closures of the matching shape implement this trait, so simple policies
/// need no named type:
///
/// ```ignore
/// let attachments = Attachments::builder()
///     .attach("user", |ctx: &mut PrepareContext<'_>, user: &User| {
///         if let Some((old, new)) = user.name.change() {
///             ctx.enqueue("name_changed", payload([
///                 ("changes", serde_json::json!({"old": old, "new": new})),
///             ]));
///         }
///         Ok(())
///     })
///     .build();
/// ```
pub trait PublisherPolicy<E>: Send + Sync {
    fn prepare(&self, ctx: &mut PrepareContext<'_>, entity: &E) -> Result<(), BoxError>;
}

impl<E, F> PublisherPolicy<E> for F
where
    F: Fn(&mut PrepareContext<'_>, &E) -> Result<(), BoxError> + Send + Sync,
{
    fn prepare(&self, ctx: &mut PrepareContext<'_>, entity: &E) -> Result<(), BoxError> {
        self(ctx, entity)
    }
}
