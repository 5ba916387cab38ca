//! SubscriberDispatcher - routes a namespace's events onto handler methods.
//!
//! The original pattern behind this is "one handler object per namespace,
//! one method per event". Rather than reflecting over a handler's surface at
//! runtime, a [`Dispatchable`] type declares its operation table statically —
//! a list of (local event name, method pointer) pairs — and the dispatcher
//! registers one bus subscription per operation when it attaches.

use std::sync::Arc;

use tracing::debug;

use crate::bus::{EventBus, SubscriptionHandle};
use crate::error::BoxError;
use crate::event::Event;

/// One entry in a handler's operation table: a local event name and the
/// method handling it.
pub struct Operation<H> {
    pub name: &'static str,
    pub invoke: fn(&mut H, &Event) -> Result<(), BoxError>,
}

impl<H> Operation<H> {
    pub const fn new(
        name: &'static str,
        invoke: fn(&mut H, &Event) -> Result<(), BoxError>,
    ) -> Self {
        Self { name, invoke }
    }
}

impl<H> Clone for Operation<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Operation<H> {}

/// A handler type whose operations can be attached to a namespace.
///
/// # Example
///
/// ```ignore
/// struct UserMailer;
///
/// impl UserMailer {
///     fn created(&mut self, event: &Event) -> Result<(), BoxError> { .. }
/// }
///
/// impl Dispatchable for UserMailer {
///     fn operations() -> &'static [Operation<Self>] {
///         &[Operation::new("created", UserMailer::created)]
///     }
/// }
/// ```
pub trait Dispatchable: Sized {
    /// The operation table: local event names and the methods handling them.
    fn operations() -> &'static [Operation<Self>];
}

/// Attaches handler types to namespaces on a bus.
///
/// Each inbound event constructs a **fresh handler instance** from the
/// factory, so handlers cannot accumulate state across unrelated events and
/// concurrent delivery of two events needs no shared handler state. Handler
/// failures are not caught here; they propagate out of the triggering
/// `publish`.
#[derive(Clone)]
pub struct SubscriberDispatcher {
    bus: EventBus,
}

impl SubscriberDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Register one subscription per operation of `H` under `namespace`.
    ///
    /// Returns the handles, in operation-table order, for later [`detach`].
    ///
    /// [`detach`]: SubscriberDispatcher::detach
    pub fn attach_to<H, F>(&self, namespace: &str, factory: F) -> Vec<SubscriptionHandle>
    where
        H: Dispatchable + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        let namespace = namespace.to_string();
        debug!(
            namespace = %namespace,
            operations = H::operations().len(),
            "attach dispatcher"
        );

        H::operations()
            .iter()
            .map(|op| {
                let factory = Arc::clone(&factory);
                let namespace = namespace.clone();
                let op = *op;
                let pattern = format!("{}.{}", namespace, op.name);
                self.bus.subscribe(pattern, move |event| {
                    // The pattern also prefix-matches deeper names
                    // ("user.created" matches "user.created.audit"); only
                    // dispatch when the recovered local name is the operation.
                    match event.local_name(&namespace) {
                        Some(local) if local == op.name => {
                            let mut handler = factory();
                            (op.invoke)(&mut handler, event)
                        }
                        _ => Ok(()),
                    }
                })
            })
            .collect()
    }

    /// Remove previously attached subscriptions. Idempotent.
    pub fn detach(&self, handles: &[SubscriptionHandle]) {
        for handle in handles {
            self.bus.unsubscribe(*handle);
        }
    }
}
