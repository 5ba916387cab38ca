//! Tracked - mutation-state inspection for entity fields.

use serde::{Deserialize, Serialize};

/// A field cell that remembers its last committed value.
///
/// Policies inspecting an entity at pre-commit ask a tracked field whether it
/// differs from its pre-transition value and what that prior value was. After
/// a successful write the lifecycle source calls [`settle`](Tracked::settle)
/// so the current value becomes the new baseline.
///
/// # Example
///
/// ```ignore
/// let mut name = Tracked::new("A".to_string());
/// name.set("B".to_string());
/// assert!(name.changed());
/// assert_eq!(name.change(), Some((&"A".to_string(), &"B".to_string())));
/// name.settle();
/// assert!(!name.changed());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tracked<T> {
    current: T,
    #[serde(skip)]
    committed: Option<T>,
}

impl<T> Tracked<T> {
    /// Wrap an already-committed value.
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            committed: None,
        }
    }

    /// The current (possibly uncommitted) value.
    pub fn get(&self) -> &T {
        &self.current
    }

    /// The last committed value, if the field has been modified since.
    pub fn prior(&self) -> Option<&T> {
        self.committed.as_ref()
    }

    /// Mark the current value as committed; the field reads as unchanged
    /// until the next `set`.
    pub fn settle(&mut self) {
        self.committed = None;
    }
}

impl<T: Clone + PartialEq> Tracked<T> {
    /// Replace the current value, remembering the committed one.
    ///
    /// Setting a field back to its committed value reads as unchanged.
    pub fn set(&mut self, value: T) {
        match &self.committed {
            Some(committed) if *committed == value => self.committed = None,
            Some(_) => {}
            None if self.current != value => self.committed = Some(self.current.clone()),
            None => {}
        }
        self.current = value;
    }

    /// Whether the field differs from its last committed value.
    pub fn changed(&self) -> bool {
        self.committed.is_some()
    }

    /// The (old, new) pair when the field changed, `None` otherwise.
    pub fn change(&self) -> Option<(&T, &T)> {
        self.committed.as_ref().map(|old| (old, &self.current))
    }
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
