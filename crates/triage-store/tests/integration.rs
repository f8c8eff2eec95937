//! Integration tests for the triage-store crate.
//!
//! These exercise the full persistence lifecycle against real files on disk
//! (via tempfile): create, advance, save, reload, and sample-data seeding.

use std::fs;

use chrono::{Duration, TimeZone, Utc};

use triage_core::{
    Channel, Classifier, Department, LifecycleState, NewRequest, Priority, RequesterType,
    StepClock, TriageError, WorkflowTracker,
};
use triage_store::{RequestStore, StoreError, load_seeds};

fn tracker() -> WorkflowTracker<StepClock> {
    let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
    WorkflowTracker::with_clock(StepClock::new(start, Duration::minutes(1)))
}

// ═══════════════════════════════════════════════════════════════════════
//  File lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn open_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = RequestStore::open(&dir.path().join("requests.json")).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.next_id().unwrap(), 1);
}

#[test]
fn save_and_reload_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("requests.json");
    let classifier = Classifier::builtin().unwrap();
    let tracker = tracker();

    let mut store = RequestStore::new();
    store.create(
        NewRequest {
            channel: Channel::Phone,
            requester_type: RequesterType::Resident,
            summary: "broken streetlight on Main Street".into(),
            description: String::new(),
        },
        &classifier,
        tracker.clock(),
    )
    .unwrap();
    store.create(
        NewRequest {
            channel: Channel::Email,
            requester_type: RequesterType::Employee,
            summary: "Benefits enrollment".into(),
            description: "Need to add a dependent to my insurance".into(),
        },
        &classifier,
        tracker.clock(),
    )
    .unwrap();
    store.advance(1, &tracker).unwrap();
    store.save(&path).unwrap();

    assert!(!path.with_extension("json.tmp").exists());

    let reloaded = RequestStore::load(&path).unwrap();
    assert_eq!(reloaded.requests(), store.requests());

    let first = reloaded.get(1).unwrap();
    assert_eq!(first.status(), LifecycleState::Triage);
    assert_eq!(first.priority(), Priority::Medium);
    assert_eq!(first.department(), Department::PublicWorks);
    assert!(first.updated_at() > first.created_at());
}

#[test]
fn saved_file_uses_display_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    let classifier = Classifier::builtin().unwrap();

    let mut store = RequestStore::new();
    store.create(
        NewRequest {
            channel: Channel::WalkIn,
            requester_type: RequesterType::Resident,
            summary: "Pothole on Oak Avenue".into(),
            description: String::new(),
        },
        &classifier,
        tracker().clock(),
    )
    .unwrap();
    store.save(&path).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let record = &raw[0];
    assert_eq!(record["channel"], "Walk-in");
    assert_eq!(record["department"], "Public Works");
    assert_eq!(record["status"], "NEW");
    assert_eq!(record["requester_type"], "Resident");
}

#[test]
fn corrupt_status_surfaces_invalid_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    fs::write(
        &path,
        r#"[{
            "id": 1,
            "channel": "Phone",
            "requester_type": "Resident",
            "summary": "Pothole",
            "description": "",
            "priority": "Low",
            "department": "Public Works",
            "category": "Infrastructure",
            "status": "REOPENED",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z"
        }]"#,
    )
    .unwrap();

    let err = RequestStore::load(&path).unwrap_err();
    match err {
        StoreError::Core(TriageError::InvalidState { value }) => assert_eq!(value, "REOPENED"),
        other => panic!("expected InvalidState, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    fs::write(&path, "{ not an array").unwrap();
    assert!(matches!(
        RequestStore::load(&path),
        Err(StoreError::Json(_))
    ));
}

fn record_json(id: u64, status: &str) -> String {
    format!(
        r#"[{{
            "id": {id},
            "channel": "Phone",
            "requester_type": "Resident",
            "summary": "Pothole",
            "description": "",
            "priority": "Low",
            "department": "Public Works",
            "category": "Infrastructure",
            "status": "{status}",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z"
        }}]"#
    )
}

#[test]
fn loose_status_spelling_is_not_reinterpreted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    fs::write(&path, record_json(1, "in progress")).unwrap();

    match RequestStore::load(&path).unwrap_err() {
        StoreError::Core(TriageError::InvalidState { value }) => assert_eq!(value, "in progress"),
        other => panic!("expected InvalidState, got {other:?}"),
    }
}

#[test]
fn loaded_max_id_blocks_create() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    fs::write(&path, record_json(u64::MAX, "NEW")).unwrap();

    let mut store = RequestStore::load(&path).unwrap();
    let err = store
        .create(
            NewRequest {
                channel: Channel::Email,
                requester_type: RequesterType::Resident,
                summary: "Sidewalk cracked".into(),
                description: String::new(),
            },
            &Classifier::builtin().unwrap(),
            tracker().clock(),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::IdExhausted));
}

#[test]
fn failed_rename_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory in the way makes the final rename fail.
    let path = dir.path().join("requests.json");
    fs::create_dir(&path).unwrap();

    let err = RequestStore::new().save(&path).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(!path.with_extension("json.tmp").exists());
}

// ═══════════════════════════════════════════════════════════════════════
//  Seeding
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn seed_file_imports_and_classifies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.json");
    fs::write(
        &path,
        r#"[
            {"id": 1, "channel": "Resident Portal", "requester_type": "Resident",
             "summary": "Pothole on Main Street",
             "description": "Large pothole near the Oak Avenue intersection",
             "status": "NEW"},
            {"id": 2, "channel": "Phone", "requester_type": "Employee",
             "summary": "VPN not working",
             "description": "Cannot reach the network from home",
             "status": "IN_PROGRESS"}
        ]"#,
    )
    .unwrap();

    let seeds = load_seeds(&path).unwrap();
    let mut store = RequestStore::new();
    let added = store
        .import(seeds, &Classifier::builtin().unwrap(), tracker().clock())
        .unwrap();
    assert_eq!(added, 2);

    let vpn = store.get(2).unwrap();
    assert_eq!(vpn.department(), Department::It);
    assert_eq!(vpn.priority(), Priority::Medium);
    assert_eq!(vpn.status(), LifecycleState::InProgress);
    assert_eq!(vpn.channel(), Channel::Phone);
}
