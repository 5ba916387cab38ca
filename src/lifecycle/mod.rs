//! Lifecycle orchestration - queue at pre-commit, flush after the write.
//!
//! A [`LifecycleAdapter`] sits between a lifecycle source (an ORM-like
//! persistence layer) and the bus. At pre-commit it asks each attached
//! [`PublisherPolicy`] to inspect the entity and enqueue notifications; after
//! the write succeeds it flushes exactly the notifications enqueued for this
//! cycle and clears the queue. The adapter never observes the write itself —
//! it trusts its caller to invoke `on_post_commit` only after a real,
//! successful state change.

mod adapter;
mod attachment;
mod policy;

pub use adapter::{LifecycleAdapter, Phase};
pub use attachment::{Attachments, AttachmentsBuilder};
pub use policy::{PrepareContext, PublisherPolicy};

use serde::Serialize;

/// Entity snapshot requirements for lifecycle observation.
///
/// `Serialize` feeds the `{"entity": ...}` field merged into every flushed
/// payload; `newly_created` is the lifecycle source's "is this the first-ever
/// persisted state" query that drives the `created` notification.
pub trait Observed: Serialize {
    fn newly_created(&self) -> bool;
}
