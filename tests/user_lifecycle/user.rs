use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use lifebus::{payload, Attachments, BoxError, Observed, PrepareContext, Tracked};

/// Entity fixture for lifecycle tests: a user with one tracked field.
#[derive(Serialize)]
pub struct User {
    pub id: String,
    pub name: Tracked<String>,
    #[serde(skip)]
    pub persisted: bool,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Tracked::new(name.into()),
            persisted: false,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    /// What the lifecycle source does after a successful write.
    pub fn mark_persisted(&mut self) {
        self.persisted = true;
        self.name.settle();
    }
}

impl Observed for User {
    fn newly_created(&self) -> bool {
        !self.persisted
    }
}

/// The `user` namespace policy: emit `name_changed` with the old and new
/// values whenever the tracked name differs from its committed value.
pub fn user_attachments() -> Arc<Attachments<User>> {
    Attachments::builder()
        .attach(
            "user",
            |ctx: &mut PrepareContext<'_>, user: &User| -> Result<(), BoxError> {
                if let Some((old, new)) = user.name.change() {
                    ctx.enqueue(
                        "name_changed",
                        payload([("changes", json!({ "old": old, "new": new }))]),
                    );
                }
                Ok(())
            },
        )
        .build()
}
