mod user;

use std::sync::{Arc, Mutex};

use lifebus::{
    payload, Attachments, BoxError, Dispatchable, Event, EventBus, LifecycleAdapter, Operation,
    PrepareContext, SubscriberDispatcher,
};
use serde_json::json;

use user::{user_attachments, User};

fn record_events(bus: &EventBus, pattern: &str) -> Arc<Mutex<Vec<Event>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    bus.subscribe_fn(pattern, move |event| {
        sink.lock().unwrap().push(event.clone());
    });
    log
}

// =============================================================================
// The full scenario: create, rename, destroy
// =============================================================================

#[test]
fn create_then_rename_emits_created_then_name_changed() {
    let bus = EventBus::new();
    let log = record_events(&bus, "user");
    let mut adapter = LifecycleAdapter::new(bus, user_attachments());

    // first save: created
    let mut user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();
    user.mark_persisted();

    // second save: rename A -> B
    user.rename("B");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();
    user.mark_persisted();

    let events = log.lock().unwrap();
    let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["user.created", "user.name_changed"]);

    // payloads carry the serialized entity and the change set
    assert_eq!(events[0].payload["entity"]["id"], json!("u1"));
    assert_eq!(
        events[1].payload["changes"],
        json!({ "old": "A", "new": "B" })
    );
    assert_eq!(events[1].payload["entity"]["name"], json!("B"));
}

#[test]
fn second_cycle_never_replays_first_cycle() {
    let bus = EventBus::new();
    let log = record_events(&bus, "user");
    let mut adapter = LifecycleAdapter::new(bus, user_attachments());

    let mut user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();
    user.mark_persisted();

    // a save with nothing changed emits nothing
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();

    let names: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    assert_eq!(names, vec!["user.created"]);
}

#[test]
fn double_flush_is_a_no_op() {
    let bus = EventBus::new();
    let log = record_events(&bus, "user");
    let mut adapter = LifecycleAdapter::new(bus, user_attachments());

    let user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();

    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn destroy_always_emits_destroyed() {
    let bus = EventBus::new();
    let log = record_events(&bus, "user");
    let mut adapter = LifecycleAdapter::new(bus, user_attachments());

    let mut user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();
    user.mark_persisted();

    // no fields changed since the last save
    adapter.on_post_destroy(&user).unwrap();

    let names: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    assert_eq!(names, vec!["user.created", "user.destroyed"]);
}

#[test]
fn failed_write_means_no_emission() {
    let bus = EventBus::new();
    let log = record_events(&bus, "user");
    let mut adapter = LifecycleAdapter::new(bus, user_attachments());

    // the write failed: the lifecycle source never calls on_post_commit,
    // and the next cycle's reset discards what was queued
    let mut user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();

    user.rename("B");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();

    let events = log.lock().unwrap();
    let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["user.created", "user.name_changed"]);
}

// =============================================================================
// Dispatcher integration: a handler method per event
// =============================================================================

struct UserMailer {
    outbox: Arc<Mutex<Vec<String>>>,
}

impl UserMailer {
    fn created(&mut self, event: &Event) -> Result<(), BoxError> {
        let id = event.payload["entity"]["id"].as_str().unwrap_or("?");
        self.outbox.lock().unwrap().push(format!("welcome:{}", id));
        Ok(())
    }

    fn name_changed(&mut self, event: &Event) -> Result<(), BoxError> {
        let new = event.payload["changes"]["new"].as_str().unwrap_or("?");
        self.outbox.lock().unwrap().push(format!("renamed:{}", new));
        Ok(())
    }
}

impl Dispatchable for UserMailer {
    fn operations() -> &'static [Operation<Self>] {
        const OPS: &[Operation<UserMailer>] = &[
            Operation::new("created", UserMailer::created),
            Operation::new("name_changed", UserMailer::name_changed),
        ];
        OPS
    }
}

#[test]
fn dispatcher_routes_lifecycle_events_to_methods() {
    let bus = EventBus::new();
    let outbox = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::clone(&outbox);
    SubscriberDispatcher::new(bus.clone()).attach_to("user", move || UserMailer {
        outbox: Arc::clone(&shared),
    });

    let mut adapter = LifecycleAdapter::new(bus, user_attachments());
    let mut user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();
    user.mark_persisted();

    user.rename("B");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();

    assert_eq!(*outbox.lock().unwrap(), vec!["welcome:u1", "renamed:B"]);
}

// =============================================================================
// Multiple namespaces: independent state machines, isolated failures
// =============================================================================

fn two_namespace_attachments() -> Arc<Attachments<User>> {
    Attachments::builder()
        .attach(
            "user",
            |_: &mut PrepareContext<'_>, _: &User| -> Result<(), BoxError> { Ok(()) },
        )
        .attach(
            "audit",
            |ctx: &mut PrepareContext<'_>, user: &User| -> Result<(), BoxError> {
                ctx.enqueue("recorded", payload([("id", json!(user.id))]));
                Ok(())
            },
        )
        .build()
}

#[test]
fn namespaces_flush_independently() {
    let bus = EventBus::new();
    let user_log = record_events(&bus, "user");
    let audit_log = record_events(&bus, "audit");
    let mut adapter = LifecycleAdapter::new(bus, two_namespace_attachments());

    let user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();
    adapter.on_post_commit(&user).unwrap();

    let user_names: Vec<_> = user_log
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    let audit_names: Vec<_> = audit_log
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    assert_eq!(user_names, vec!["user.created"]);
    assert_eq!(audit_names, vec!["audit.created", "audit.recorded"]);
}

#[test]
fn one_namespace_failure_does_not_block_the_sibling_flush() {
    let bus = EventBus::new();
    bus.subscribe("user", |_| Err("user listener down".into()));
    let audit_log = record_events(&bus, "audit");

    let mut adapter = LifecycleAdapter::new(bus, two_namespace_attachments());
    let user = User::new("u1", "A");
    adapter.on_pre_commit(&user).unwrap();

    let err = adapter.on_post_commit(&user).unwrap_err();
    assert!(err.to_string().contains("user listener down"));

    // the audit namespace still flushed
    assert_eq!(audit_log.lock().unwrap().len(), 2);
}

#[test]
fn namespaces_can_be_driven_independently() {
    let bus = EventBus::new();
    let user_log = record_events(&bus, "user");
    let audit_log = record_events(&bus, "audit");
    let mut adapter = LifecycleAdapter::new(bus, two_namespace_attachments());

    let user = User::new("u1", "A");
    adapter.on_pre_commit_namespace("audit", &user).unwrap();
    adapter.on_post_commit_namespace("audit", &user).unwrap();

    assert!(user_log.lock().unwrap().is_empty());
    assert_eq!(audit_log.lock().unwrap().len(), 2);
}
