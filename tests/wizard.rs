//! Controller-level tests: gating through the public API, record selection
//! against a real store, and the generate safety property.
mod common;

use std::sync::Arc;

use common::{MemTemplateStore, RecordingMirror};
use sitedocs::mapping::ProjectField;
use sitedocs::{Database, DocKind, GenerationError, WizardController, WizardStep};

fn open_database(dir: &tempfile::TempDir) -> Database {
    Database::new(dir.path().join("sitedocs.sqlite3")).expect("open database")
}

fn atp_controller(db: Database) -> WizardController {
    let templates = Arc::new(MemTemplateStore::new().with("atp", common::atp_template()));
    let mirror = Arc::new(RecordingMirror::default());
    WizardController::new(DocKind::Atp, db, templates, mirror).expect("controller")
}

#[tokio::test]
async fn candidates_are_filtered_by_pending_status() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);

    let pending = common::make_record("JKT001");
    let mut done = common::make_record("JKT002");
    done.atp_status = sitedocs::DocStatus::Done;
    db.insert_record(&pending).await.unwrap();
    db.insert_record(&done).await.unwrap();

    let controller = atp_controller(db);
    let candidates = controller.list_candidates().await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].site_id, "JKT001");
}

#[tokio::test]
async fn next_is_a_noop_until_the_gate_passes() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let record = common::make_record("JKT001");
    db.insert_record(&record).await.unwrap();

    let controller = atp_controller(db);
    assert!(!controller.next().await);
    assert_eq!(controller.current_step().await, WizardStep::SelectSite);

    controller.select_record(&record.id).await.unwrap();
    assert!(controller.next().await);
    assert_eq!(controller.current_step().await, WizardStep::ProjectDetails);

    // Scalar fields are prefilled except project name and serials.
    assert!(!controller.next().await);
    controller
        .set_project_field(ProjectField::ProjectName, "Power Upgrade Phase 2".into())
        .await;
    assert!(!controller.next().await);
    controller
        .set_project_field(ProjectField::SnModule, "AB12".into())
        .await;
    assert!(controller.next().await);
    assert_eq!(controller.current_step().await, WizardStep::Measurements);
}

#[tokio::test]
async fn selecting_a_record_prefills_the_project() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let record = common::make_record("JKT001");
    db.insert_record(&record).await.unwrap();

    let controller = atp_controller(db);
    controller.select_record(&record.id).await.unwrap();

    let session = controller.snapshot().await;
    assert_eq!(session.project.site_id, "JKT001");
    assert_eq!(session.project.rectifier_type, "NetSure 731");
}

#[tokio::test]
async fn photo_upload_decodes_and_can_be_removed() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let controller = atp_controller(db);

    let preview = controller
        .attach_photo(sitedocs::PhotoSlot::TowerProfile, common::tiny_png(), "png")
        .await
        .unwrap();
    assert!(preview.starts_with("data:image/png;base64,"));

    assert!(controller.remove_photo(sitedocs::PhotoSlot::TowerProfile).await);
    assert!(!controller.remove_photo(sitedocs::PhotoSlot::TowerProfile).await);
}

#[tokio::test]
async fn photo_upload_rejects_unknown_formats() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let controller = atp_controller(db);

    let result = controller
        .attach_photo(sitedocs::PhotoSlot::TowerProfile, common::tiny_png(), "webp")
        .await;
    assert!(matches!(result, Err(sitedocs::DecodeError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn generate_refuses_incomplete_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let record = common::make_record("JKT001");
    db.insert_record(&record).await.unwrap();

    let controller = atp_controller(db.clone());

    // Nothing selected at all.
    match controller.generate().await {
        Err(GenerationError::Incomplete { step }) => assert_eq!(step, "select-site"),
        other => panic!("expected incomplete error, got {other:?}"),
    }

    // Selected but no photos: still refused, and the record is untouched.
    controller.select_record(&record.id).await.unwrap();
    common::fill_atp_session(&controller).await;
    controller.remove_photo(sitedocs::PhotoSlot::TeamPhoto).await;

    match controller.generate().await {
        Err(GenerationError::Incomplete { step }) => assert_eq!(step, "photos"),
        other => panic!("expected incomplete error, got {other:?}"),
    }

    let stored = db.get_record(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.atp_status, sitedocs::DocStatus::Pending);
}

#[tokio::test]
async fn reset_returns_to_the_first_step() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let record = common::make_record("JKT001");
    db.insert_record(&record).await.unwrap();

    let controller = atp_controller(db);
    controller.select_record(&record.id).await.unwrap();
    common::fill_atp_session(&controller).await;
    while controller.next().await {}
    assert_eq!(controller.current_step().await, WizardStep::Review);

    controller.reset().await;
    let session = controller.snapshot().await;
    assert_eq!(session.current_step(), WizardStep::SelectSite);
    assert!(session.record.is_none());
    assert!(session.photos.is_empty());
}

#[tokio::test]
async fn gate_summary_reflects_per_step_state() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let record = common::make_record("JKT001");
    db.insert_record(&record).await.unwrap();

    let controller = atp_controller(db);
    controller.select_record(&record.id).await.unwrap();

    let summary = controller.gate_summary().await;
    assert_eq!(summary.len(), 5);
    assert_eq!(summary[0], (WizardStep::SelectSite, true));
    assert_eq!(summary[3], (WizardStep::Photos, false));
    assert_eq!(summary[4], (WizardStep::Review, true));
}
