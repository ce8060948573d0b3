use super::*;
use crate::api::fake::FakeApi;
use crate::api::types::ProcessingStatus;
use crate::notify::NotificationKind;
use crate::poll::PollEvent;

const CASE: CaseId = 42;

async fn loaded() -> (Arc<FakeApi>, ReviewWorkspace<FakeApi>) {
    let api = Arc::new(FakeApi::new());
    let mut ws = ReviewWorkspace::new(api.clone(), CASE, Duration::from_millis(5));
    assert!(ws.load().await.is_complete());
    (api, ws)
}

fn palo_count(ws: &ReviewWorkspace<FakeApi>) -> usize {
    ws.core().items().len(ItemKind::Palo)
}

// =========================================================================
// load
// =========================================================================

#[tokio::test]
async fn load_populates_core() {
    let (_api, mut ws) = loaded().await;
    assert_eq!(ws.core().image_url(), Some("http://files.test/sheet-42.png"));
    assert_eq!(palo_count(&ws), 12);
    assert_eq!(ws.core().items().len(ItemKind::Mark), 5);
    assert_eq!(ws.core().backend_mm_per_px(), Some(0.0847));
    assert_eq!(ws.core().override_counts(), [10, 12, 9, 11, 8]);
    assert!(ws.notification().is_none());
}

#[tokio::test]
async fn failed_piece_leaves_prior_state() {
    let (api, mut ws) = loaded().await;
    api.fail("detections");
    api.state.lock().unwrap().file_url = "http://files.test/new.png".into();

    let report = ws.load().await;
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "detections");
    assert_eq!(ws.core().image_url(), Some("http://files.test/new.png"));
    assert_eq!(palo_count(&ws), 12);

    let toast = ws.notification().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.message, crate::error::CONNECTION_ERROR_MESSAGE);
}

#[tokio::test]
async fn load_report_yields_first_error() {
    let api = Arc::new(FakeApi::new());
    api.fail("file");
    api.fail("metrics");
    let mut ws = ReviewWorkspace::new(api, CASE, Duration::from_millis(5));
    let report = ws.load().await;
    assert!(!report.is_complete());
    assert!(matches!(report.into_result(), Err(ApiError::Network(_))));
}

// =========================================================================
// delete / undo
// =========================================================================

#[tokio::test]
async fn delete_then_undo_restores_palo_7() {
    let (api, mut ws) = loaded().await;
    let id = ItemId::Int(7);
    let original = ws.core().item(&id, ItemKind::Palo).cloned().unwrap();

    assert!(ws.delete(&id, ItemKind::Palo).await.unwrap());
    assert_eq!(palo_count(&ws), 11);
    assert!(ws.core().item(&id, ItemKind::Palo).is_none());
    assert_eq!(ws.core().undo_depth(), 1);
    assert_eq!(ws.notification().unwrap().message, "Palo removed.");

    assert!(ws.undo().await.unwrap());
    assert_eq!(palo_count(&ws), 12);
    assert_eq!(ws.core().item(&id, ItemKind::Palo), Some(&original));
    assert_eq!(ws.core().undo_depth(), 0);

    let calls = api.calls();
    assert!(calls.contains(&"delete".to_owned()));
    assert!(calls.contains(&"restore".to_owned()));
}

#[tokio::test]
async fn delete_unknown_item_is_noop() {
    let (api, mut ws) = loaded().await;
    assert!(!ws.delete(&ItemId::Int(99), ItemKind::Palo).await.unwrap());
    assert!(!api.calls().contains(&"delete".to_owned()));
    assert_eq!(ws.core().undo_depth(), 0);
}

#[tokio::test]
async fn failed_delete_changes_nothing() {
    let (api, mut ws) = loaded().await;
    api.fail("delete");
    let err = ws.delete(&ItemId::Int(3), ItemKind::Palo).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(palo_count(&ws), 12);
    assert_eq!(ws.core().undo_depth(), 0);
    assert_eq!(ws.notification().unwrap().kind, NotificationKind::Error);
}

#[tokio::test]
async fn undo_on_empty_stack_is_noop() {
    let (api, mut ws) = loaded().await;
    assert!(!ws.undo().await.unwrap());
    assert!(!api.calls().contains(&"restore".to_owned()));
}

#[tokio::test]
async fn failed_restore_keeps_undo_entry() {
    let (api, mut ws) = loaded().await;
    ws.delete(&ItemId::from("mark_2"), ItemKind::Mark).await.unwrap();
    api.fail("restore");

    assert!(ws.undo().await.is_err());
    assert_eq!(ws.core().undo_depth(), 1);
    assert_eq!(ws.core().items().len(ItemKind::Mark), 4);

    api.heal();
    assert!(ws.undo().await.unwrap());
    assert_eq!(ws.core().items().len(ItemKind::Mark), 5);
}

// =========================================================================
// input routing
// =========================================================================

#[tokio::test]
async fn click_in_edit_mode_deletes_hit_item() {
    let (_api, mut ws) = loaded().await;
    ws.core_mut().set_edit_mode(true);

    let action = ws.click(Point::new(278.0, 320.0)).await.unwrap();
    assert_eq!(action, Action::DeleteRequested { id: ItemId::Int(7), kind: ItemKind::Palo });
    assert_eq!(palo_count(&ws), 11);
}

#[tokio::test]
async fn click_outside_edit_mode_deletes_nothing() {
    let (api, mut ws) = loaded().await;
    let action = ws.click(Point::new(278.0, 320.0)).await.unwrap();
    assert_eq!(action, Action::None);
    assert!(!api.calls().contains(&"delete".to_owned()));
}

#[tokio::test]
async fn calibration_clicks_report_scale() {
    let (_api, mut ws) = loaded().await;
    ws.core_mut().arm_calibration();
    ws.click(Point::new(100.0, 100.0)).await.unwrap();
    let action = ws.click(Point::new(100.0, 200.0)).await.unwrap();

    assert_eq!(action, Action::Calibrated { mm_per_px: 1.0 });
    assert_eq!(ws.core().manual_mm_per_px(), Some(1.0));
    assert!(!ws.core().is_calibrating());
    assert!(ws.notification().unwrap().message.contains("1.0000 mm/px"));
}

#[tokio::test]
async fn ctrl_z_undoes_last_delete() {
    let (_api, mut ws) = loaded().await;
    ws.delete(&ItemId::Int(1), ItemKind::Palo).await.unwrap();

    let mods = Modifiers { ctrl: true, ..Modifiers::default() };
    let action = ws.key(&Key::new("z"), mods).await.unwrap();
    assert_eq!(action, Action::UndoRequested);
    assert_eq!(palo_count(&ws), 12);
    assert_eq!(ws.notification().unwrap().message, "Deletion undone.");
}

// =========================================================================
// overrides
// =========================================================================

#[tokio::test]
async fn save_overrides_sends_all_five() {
    let (api, mut ws) = loaded().await;
    ws.core_mut().begin_override();
    ws.set_override(2, "99").unwrap();
    ws.save_overrides().await.unwrap();

    assert_eq!(api.state.lock().unwrap().saved_overrides, vec![[10, 12, 99, 11, 8]]);
    assert!(!ws.core().is_overriding());
    assert_eq!(ws.core().override_counts(), [10, 12, 99, 11, 8]);
    assert_eq!(ws.notification().unwrap().message, "Interval counts saved.");
}

#[tokio::test]
async fn set_override_outside_mode_is_rejected() {
    let (_api, mut ws) = loaded().await;
    assert!(matches!(ws.set_override(0, "4"), Err(ApiError::Rejected(_))));
}

#[tokio::test]
async fn failed_save_stays_in_override_mode() {
    let (api, mut ws) = loaded().await;
    api.fail("overrides");
    ws.core_mut().begin_override();
    ws.set_override(0, "abc").unwrap();

    assert!(ws.save_overrides().await.is_err());
    assert!(ws.core().is_overriding());
    assert_eq!(ws.core().override_counts(), [0, 12, 9, 11, 8]);
}

#[tokio::test]
async fn override_counts_in_one_step() {
    let (api, mut ws) = loaded().await;
    ws.override_counts([1, 2, 3, 4, 5]).await.unwrap();
    assert_eq!(api.state.lock().unwrap().saved_overrides, vec![[1, 2, 3, 4, 5]]);
    assert_eq!(ws.core().metrics().unwrap().interval_counts(), [1, 2, 3, 4, 5]);
}

// =========================================================================
// reprocess / approve
// =========================================================================

#[tokio::test]
async fn reprocess_requires_confirmation() {
    let (api, mut ws) = loaded().await;
    assert!(ws.reprocess(false).await.unwrap().is_none());
    assert!(!api.calls().contains(&"reprocess".to_owned()));
}

#[tokio::test]
async fn confirmed_reprocess_hands_off_to_poller() {
    let (api, mut ws) = loaded().await;
    api.push_job(Ok(crate::api::fake::job(ProcessingStatus::Processing, 10)));

    let mut poller = ws.reprocess(true).await.unwrap().unwrap();
    match poller.finished().await {
        PollEvent::Finished(job) => assert_eq!(job.status, ProcessingStatus::Done),
        other => panic!("expected Finished, got {other:?}"),
    }
    assert!(api.calls().contains(&"reprocess".to_owned()));
}

#[tokio::test]
async fn reprocess_drops_local_undo_history() {
    let (api, mut ws) = loaded().await;
    ws.delete(&ItemId::Int(7), ItemKind::Palo).await.unwrap();
    ws.core_mut().begin_override();
    assert_eq!(ws.core().undo_depth(), 1);

    let poller = ws.reprocess(true).await.unwrap();
    assert!(poller.is_some());
    assert_eq!(ws.core().undo_depth(), 0);
    assert!(!ws.core().is_overriding());

    ws.load().await.into_result().unwrap();
    assert!(!ws.undo().await.unwrap());
    assert!(!api.calls().contains(&"restore".to_owned()));
}

#[tokio::test]
async fn failed_reprocess_keeps_undo_history() {
    let (api, mut ws) = loaded().await;
    ws.delete(&ItemId::Int(7), ItemKind::Palo).await.unwrap();
    api.fail("reprocess");

    assert!(ws.reprocess(true).await.is_err());
    assert_eq!(ws.core().undo_depth(), 1);
}

#[tokio::test]
async fn approve_dataset_shows_backend_message() {
    let (_api, mut ws) = loaded().await;
    let message = ws.approve_dataset().await.unwrap();
    assert_eq!(ws.take_notification().unwrap().message, message);
    assert!(ws.notification().is_none());
}
