use std::time::{Duration, SystemTime};

use serde::Serialize;

/// Event payload: a JSON object keyed by field name.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Build a payload from key/value pairs.
///
/// # Example
///
/// ```ignore
/// let p = payload([("old", "A".into()), ("new", "B".into())]);
/// ```
pub fn payload<I>(entries: I) -> Payload
where
    I: IntoIterator<Item = (&'static str, serde_json::Value)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// An event delivered through the bus.
///
/// Immutable once constructed. `duration` and `error` are populated only when
/// the event wraps a timed execution span (see
/// [`EventBus::publish_timed`](crate::EventBus::publish_timed)).
#[derive(Clone, Debug, Serialize)]
pub struct Event {
    /// Full event name, namespace prefix included (e.g., `"user.created"`).
    pub name: String,
    /// Structured payload.
    pub payload: Payload,
    /// When the event was constructed.
    pub timestamp: SystemTime,
    /// Wall-clock duration of the timed body, if any.
    pub duration: Option<Duration>,
    /// Failure description of the timed body, if it failed.
    pub error: Option<String>,
}

impl Event {
    /// Create a new event with the given name and payload.
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
            timestamp: SystemTime::now(),
            duration: None,
            error: None,
        }
    }

    /// Attach the wall-clock duration of a timed body.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Attach a failure description from a timed body.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The event name with the given namespace prefix stripped, if the event
    /// belongs to that namespace.
    pub fn local_name(&self, namespace: &str) -> Option<&str> {
        if namespace.is_empty() {
            return Some(&self.name);
        }
        self.name
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('.'))
    }
}
