//! EventBus - synchronous name-keyed publish/subscribe.
//!
//! The bus knows nothing about entities or lifecycles; it matches event names
//! against subscription patterns and invokes handlers on the calling thread,
//! in registration order. Namespacing is plain string composition on top
//! (see [`NamespacedPublisher`](crate::NamespacedPublisher)).

mod event_bus;
mod subscription;

pub use event_bus::EventBus;
pub use subscription::{HandlerFn, SubscriptionHandle};
