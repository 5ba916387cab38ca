use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, trace};

use crate::error::{BoxError, NotifyError};
use crate::event::{Event, Payload};

use super::subscription::{pattern_matches, HandlerFn, Subscription, SubscriptionHandle};

struct Registry {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Synchronous in-process event bus.
///
/// Clone-friendly via `Arc`; all clones share one subscription registry.
/// `publish` invokes every matching handler on the calling thread, in
/// registration order (a single global order across patterns). The total
/// latency of a publish is the sum of every handler's latency — handlers
/// wanting background work must hand it off themselves.
///
/// # Example
///
/// ```ignore
/// let bus = EventBus::new();
/// bus.subscribe_fn("user", |event| println!("{}", event.name));
/// bus.publish("user.created", Payload::new())?;
/// ```
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new bus with no subscriptions.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry {
                next_id: 0,
                subscriptions: Vec::new(),
            })),
        }
    }

    /// Register a handler for every event matching `pattern` (exact name or
    /// namespace prefix). Returns a handle usable to unsubscribe.
    pub fn subscribe<F>(&self, pattern: impl Into<String>, handler: F) -> SubscriptionHandle
    where
        F: Fn(&Event) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe_handler(pattern.into(), Arc::new(handler))
    }

    /// Register an infallible handler.
    pub fn subscribe_fn<F>(&self, pattern: impl Into<String>, handler: F) -> SubscriptionHandle
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(pattern, move |event| {
            handler(event);
            Ok(())
        })
    }

    fn subscribe_handler(&self, pattern: String, handler: HandlerFn) -> SubscriptionHandle {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = registry.next_id;
        registry.next_id += 1;
        trace!(pattern = %pattern, id, "subscribe");
        registry.subscriptions.push(Subscription {
            id,
            pattern,
            handler,
        });
        SubscriptionHandle(id)
    }

    /// Remove a subscription by handle. Removing an already-removed handle is
    /// a no-op.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.subscriptions.retain(|sub| sub.id != handle.0);
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .subscriptions
            .len()
    }

    /// Publish an event, invoking every matching handler synchronously in
    /// registration order.
    ///
    /// No matching subscription is a silent no-op. A failing handler halts
    /// delivery for this call and the failure propagates to the caller.
    pub fn publish(&self, name: impl Into<String>, payload: Payload) -> Result<(), NotifyError> {
        self.dispatch(Event::new(name, payload))
    }

    /// Execute `body`, measure its wall-clock duration, and publish exactly
    /// one event describing the span — carrying `duration` and, if `body`
    /// failed, `error`.
    ///
    /// The body's failure propagates to the caller after the event is
    /// emitted; if both the body and a handler fail, the body's failure wins.
    pub fn publish_timed<T, F>(
        &self,
        name: impl Into<String>,
        payload: Payload,
        body: F,
    ) -> Result<T, NotifyError>
    where
        F: FnOnce() -> Result<T, BoxError>,
    {
        let started = Instant::now();
        let result = body();
        let mut event = Event::new(name, payload).with_duration(started.elapsed());
        if let Err(err) = &result {
            event = event.with_error(err.to_string());
        }
        let delivered = self.dispatch(event);

        match result {
            Err(err) => Err(NotifyError::Body(err)),
            Ok(value) => delivered.map(|_| value),
        }
    }

    fn dispatch(&self, event: Event) -> Result<(), NotifyError> {
        // Snapshot matching handlers and release the lock before invoking
        // them, so a handler may subscribe/unsubscribe without deadlocking.
        let matched: Vec<HandlerFn> = {
            let registry = self
                .registry
                .read()
                .map_err(|_| NotifyError::LockPoisoned("publish"))?;
            registry
                .subscriptions
                .iter()
                .filter(|sub| pattern_matches(&sub.pattern, &event.name))
                .map(|sub| Arc::clone(&sub.handler))
                .collect()
        };

        debug!(event = %event.name, matched = matched.len(), "publish");
        for handler in matched {
            handler(&event).map_err(|source| NotifyError::Handler {
                event: event.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
