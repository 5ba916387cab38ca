use std::sync::Arc;

use crate::error::BoxError;
use crate::event::Event;

/// Handler invoked for every event matching a subscription's pattern.
pub type HandlerFn = Arc<dyn Fn(&Event) -> Result<(), BoxError> + Send + Sync>;

/// Opaque handle identifying a registered subscription.
///
/// Returned by [`EventBus::subscribe`](super::EventBus::subscribe); the only
/// way to remove a subscription by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub(crate) u64);

/// A registered subscription. The registry keeps these in a single `Vec` in
/// registration order, which is also delivery order.
pub(crate) struct Subscription {
    pub(crate) id: u64,
    pub(crate) pattern: String,
    pub(crate) handler: HandlerFn,
}

/// Whether `pattern` matches the event `name`.
///
/// A pattern matches its own name exactly, or any name under it as a
/// namespace: `"user"` matches `"user"` and `"user.created"` but not
/// `"users.created"` — the prefix match requires the `.` separator.
pub(crate) fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern == name {
        return true;
    }
    name.strip_prefix(pattern)
        .map(|rest| rest.starts_with('.'))
        .unwrap_or(false)
}
