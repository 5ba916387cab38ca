//! lifebus - a lifecycle-triggered notification bus.
//!
//! An in-process publish/subscribe mechanism whose publishers are bound to
//! the state-transition lifecycle of stateful entities. Derived data and
//! side-effects (mail, cache sync, cross-entity propagation) are produced by
//! independent listeners instead of being hard-coded into the entity's own
//! mutation logic.
//!
//! The cycle: a lifecycle source (an ORM-like persistence layer) calls a
//! [`LifecycleAdapter`] before a write, letting each attached
//! [`PublisherPolicy`] inspect the entity and queue notifications; after the
//! write succeeds the adapter flushes exactly this cycle's notifications
//! through the [`EventBus`] under each attachment's namespace. Consumers
//! integrate solely via [`EventBus::subscribe`] (or a
//! [`SubscriberDispatcher`]); they never call into the adapter.
//!
//! Delivery is synchronous, on the calling thread, in registration order.
//! Nothing is durable and nothing is retried: a notification either flushes
//! in its cycle or is gone.

mod bus;
mod change;
mod dispatcher;
mod error;
mod event;
mod lifecycle;
mod publisher;
mod queue;

pub use bus::{EventBus, HandlerFn, SubscriptionHandle};
pub use change::Tracked;
pub use dispatcher::{Dispatchable, Operation, SubscriberDispatcher};
pub use error::{BoxError, NotifyError};
pub use event::{payload, Event, Payload};
pub use lifecycle::{
    Attachments, AttachmentsBuilder, LifecycleAdapter, Observed, Phase, PrepareContext,
    PublisherPolicy,
};
pub use publisher::NamespacedPublisher;
pub use queue::{Notification, NotificationQueue};
