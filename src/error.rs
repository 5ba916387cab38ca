use std::error::Error;
use std::fmt;

/// Boxed error type carried by handlers and timed publish bodies.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error type for bus and lifecycle operations.
///
/// Nothing is caught internally — every failure surfaces to whoever triggered
/// the broadcast or lifecycle transition, and recoverability (retry, ignore,
/// alert) is the embedding system's decision.
#[derive(Debug)]
pub enum NotifyError {
    /// A subscriber's handler failed while processing an event.
    ///
    /// Delivery for the failing publish call halts at that subscriber.
    Handler { event: String, source: BoxError },
    /// The body of a timed publish failed. The span event was still emitted.
    Body(BoxError),
    /// A publisher policy failed while preparing notifications at pre-commit.
    Policy { namespace: String, source: BoxError },
    /// An entity snapshot could not be serialized into a flush payload.
    Serialize(String),
    /// Two unrelated attachments chose the same namespace.
    DuplicateNamespace(String),
    /// A lifecycle transition was requested on an already-destroyed instance.
    Destroyed { namespace: String },
    /// The bus subscription registry lock was poisoned.
    LockPoisoned(&'static str),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Handler { event, source } => {
                write!(f, "handler failed for event {}: {}", event, source)
            }
            NotifyError::Body(source) => write!(f, "timed publish body failed: {}", source),
            NotifyError::Policy { namespace, source } => {
                write!(f, "policy failed for namespace {}: {}", namespace, source)
            }
            NotifyError::Serialize(msg) => write!(f, "entity serialization failed: {}", msg),
            NotifyError::DuplicateNamespace(namespace) => {
                write!(f, "namespace {} is already attached", namespace)
            }
            NotifyError::Destroyed { namespace } => write!(
                f,
                "lifecycle transition on destroyed instance (namespace {})",
                namespace
            ),
            NotifyError::LockPoisoned(operation) => {
                write!(f, "subscription registry lock poisoned during {}", operation)
            }
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NotifyError::Handler { source, .. } => Some(source.as_ref()),
            NotifyError::Body(source) => Some(source.as_ref()),
            NotifyError::Policy { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        NotifyError::Serialize(err.to_string())
    }
}
