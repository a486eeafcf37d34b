//! End-to-end tests across the facade, replication, and store layers.

use serde_json::json;
use settee_core::{
    AllOptions, CoreError, Database, DocRef, EventKind, ReplicateSpec, ReplicationEvent,
    SetteeOptions,
};
use settee_testkit::{init_tracing, populated_store, EventScript};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn replicating_options() -> SetteeOptions {
    SetteeOptions::new()
        .with_name("todos")
        .with_url("https://db.example.com/todos")
        .with_replicate(ReplicateSpec::shorthand("sync"))
}

#[test]
fn name_only_construction_round_trips_the_name() {
    init_tracing();
    let db = Database::open_in_memory(SetteeOptions::new().with_name("plant-(journal)+log")).unwrap();
    assert_eq!(db.name(), "plant-(journal)+log");
    assert!(db.url().is_none());
    assert!(db.local_path().is_some());
}

#[test]
fn unsafe_name_fails_unless_safety_is_disabled() {
    init_tracing();
    let err = Database::open_in_memory(SetteeOptions::new().with_name("Plant Journal")).unwrap_err();
    assert!(matches!(err, CoreError::UnsafeName { .. }));

    let db = Database::open_in_memory(
        SetteeOptions::new()
            .with_name("Plant Journal")
            .with_couchdb_safe(false),
    )
    .unwrap();
    assert_eq!(db.name(), "Plant Journal");
    assert!(!db.is_couch_safe_enforced());
}

#[test]
fn save_then_all_round_trips_the_body() {
    init_tracing();
    let db = Database::open_in_memory(SetteeOptions::new().with_name("roundtrip")).unwrap();
    let saved = db.save(json!({ "species": "monstera", "watered": true })).unwrap();

    let docs = db.all(AllOptions::default()).unwrap();
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc.get("species"), Some(&json!("monstera")));
    assert_eq!(doc.get("watered"), Some(&json!(true)));
    assert_eq!(doc.id(), saved.id());
    assert_eq!(doc.rev(), saved.rev());
}

#[test]
fn get_many_against_an_empty_store() {
    init_tracing();
    let db = Database::open_in_memory(SetteeOptions::new().with_name("empty")).unwrap();

    assert!(db.get_many(&[]).unwrap().is_empty());

    let err = db.get_many(&[DocRef::latest("missing")]).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { id } if id == "missing"));
}

#[test]
fn repeated_index_creation_succeeds() {
    init_tracing();
    let db = Database::open_in_memory(SetteeOptions::new().with_name("indexed")).unwrap();
    assert_eq!(db.create_indicies(["f"]).unwrap().result, "created");
    assert_eq!(db.create_indicies(["f"]).unwrap().result, "exists");
}

#[test]
fn delete_all_drains_a_populated_store() {
    init_tracing();
    let options = SetteeOptions::new().with_name("fixtures");
    let db = Database::open_with(options, |target| Ok(populated_store(&target.name, 12))).unwrap();

    let outcomes = db.delete_all().unwrap();
    assert_eq!(outcomes.len(), 12);
    assert!(db.all(AllOptions::default()).unwrap().is_empty());
}

#[test]
fn likely_synced_fires_on_the_debounce_window() {
    init_tracing();
    let db = Database::open_in_memory(replicating_options()).unwrap();
    let emitter = db.replication_emitter().unwrap();
    let synced = emitter.subscribe_filtered(&[EventKind::HasLikelySynced]);

    // The memory session emits its catch-up events at start; settlement
    // follows the 150ms debounce, well short of the 500ms ceiling.
    let started = Instant::now();
    synced.recv_timeout(Duration::from_secs(2)).unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_millis(450), "settled late: {elapsed:?}");
    assert!(db.has_likely_synced());

    emitter.unsubscribe(synced.id);
    db.destroy().unwrap();
}

#[test]
fn bursty_stream_postpones_the_likely_synced_signal() {
    init_tracing();
    let db = Database::open_in_memory(replicating_options()).unwrap();
    let emitter = db.replication_emitter().unwrap();
    let synced = emitter.subscribe_filtered(&[EventKind::HasLikelySynced]);

    let started = Instant::now();
    EventScript::new()
        .burst(8, Duration::from_millis(60), ReplicationEvent::Change(None))
        .play(Arc::clone(&emitter))
        .join()
        .unwrap();

    synced.recv_timeout(Duration::from_secs(2)).unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(550), "burst ignored: {elapsed:?}");

    emitter.unsubscribe(synced.id);
    db.destroy().unwrap();
}

#[test]
fn destroy_tears_down_the_live_session() {
    init_tracing();
    let db = Database::open_in_memory(replicating_options()).unwrap();
    let emitter = db.replication_emitter().unwrap();
    assert!(db.session().is_some());

    db.destroy().unwrap();

    // No drain listener, no detector subscription: every internal timer and
    // listener is gone once destroy returns.
    assert_eq!(emitter.subscriber_count(), 0);
}

#[test]
fn destroy_after_settlement_also_resolves() {
    init_tracing();
    let db = Database::open_in_memory(replicating_options()).unwrap();
    let emitter = db.replication_emitter().unwrap();
    let synced = emitter.subscribe_filtered(&[EventKind::HasLikelySynced]);
    synced.recv_timeout(Duration::from_secs(2)).unwrap();
    emitter.unsubscribe(synced.id);

    db.destroy().unwrap();
    assert_eq!(emitter.subscriber_count(), 0);
}

#[test]
fn non_live_replication_skips_the_detector() {
    init_tracing();
    let options = replicating_options().with_replicate_live(false);
    let db = Database::open_in_memory(options).unwrap();
    let emitter = db.replication_emitter().unwrap();

    let synced = emitter.subscribe_filtered(&[EventKind::HasLikelySynced]);
    assert!(synced.recv_timeout(Duration::from_millis(700)).is_err());
    assert!(!db.has_likely_synced());

    emitter.unsubscribe(synced.id);
    db.destroy().unwrap();
}

#[test]
fn local_path_lands_under_the_configured_root() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let options = SetteeOptions::new().with_name("on-disk").with_path(root.path());
    let db = Database::open_in_memory(options).unwrap();
    assert_eq!(db.local_path().unwrap(), root.path().join("on-disk"));
}
