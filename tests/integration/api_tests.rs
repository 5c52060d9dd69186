//! End-to-end checkout workflow over HTTP

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use equipment_checkout::{
    config::AppConfig,
    error::BackendErrorKind,
    models::{Equipment, EquipmentType, WaiverForm},
    repository::{EquipmentRepository, HttpRepository},
    services::{
        notifications::{ChannelNotifier, Notification},
        waiver::CheckoutOutcome,
    },
    AppError, AppState,
};

use crate::fake_backend::{self, profile, unit, BackendState, Shared};

const QUEST: &str = "Meta Quest 3";

async fn app(state: BackendState) -> (AppState, Shared, UnboundedReceiver<Notification>) {
    let (base_url, backend) = fake_backend::spawn(state).await;

    let mut config = AppConfig::default();
    config.api.base_url = base_url;
    config.api.token = Some("test-token".to_string());

    let (notifier, notifications) = ChannelNotifier::new();
    let app = AppState::from_config(config, Arc::new(notifier)).expect("Failed to build app state");
    (app, backend, notifications)
}

fn inventory() -> Vec<Equipment> {
    vec![
        unit(1, QUEST, false),
        unit(2, QUEST, true),
        unit(3, QUEST, false),
        unit(10, "Arduino Uno", false),
    ]
}

fn quest_type(app: &AppState) -> EquipmentType {
    app.services.catalog.find(QUEST).expect("Quest missing from catalog")
}

fn messages(notifications: &mut UnboundedReceiver<Notification>) -> Vec<String> {
    let mut out = vec![];
    while let Ok(notification) = notifications.try_recv() {
        out.push(notification.message);
    }
    out
}

#[tokio::test]
async fn test_full_checkout_lifecycle() {
    let (app, backend, mut notifications) = app(BackendState::new(inventory(), profile(true))).await;
    let services = &app.services;

    services.equipment.load_profile().await.unwrap();
    services.catalog.refresh().await.unwrap();
    assert_eq!(quest_type(&app).num_available, 2);

    // Student requests a headset
    let outcome = services.checkout.request_checkout(&quest_type(&app)).await.unwrap();
    let request = match outcome {
        CheckoutOutcome::Requested(request) => request,
        other => panic!("expected a submitted request, got {:?}", other),
    };
    assert_eq!(request.user_name, "Sally Student");
    assert_eq!(request.pid, 730000000);

    // Ambassador approves; choices are the units free right now
    let console = &services.ambassador;
    console.refresh_all().await.unwrap();
    assert_eq!(console.snapshot().requests_len(), 1);

    let staged = console.approve(&request).await.unwrap();
    assert_eq!(staged.id_choices, vec![1, 3]);
    let snapshot = console.snapshot();
    assert_eq!(snapshot.requests_len(), 0);
    assert_eq!(snapshot.staged_len(), 1);

    // Pick a unit and finalize
    let selected = console.select_unit(request.pid, QUEST, 3).unwrap();
    assert_eq!(selected.selection(), Some(3));

    let checkout = console.finalize(&selected).await.unwrap();
    assert_eq!(checkout.equipment_id, 3);
    assert!(checkout.is_active);
    assert_eq!(checkout.end_at - checkout.started_at, chrono::Duration::days(3));

    let snapshot = console.snapshot();
    assert_eq!(snapshot.staged_len(), 0);
    assert_eq!(snapshot.checkouts_len(), 1);
    assert!(backend.lock().unwrap().equipment.iter().any(|e| e.equipment_id == 3 && e.is_checked_out));

    services.catalog.refresh().await.unwrap();
    assert_eq!(quest_type(&app).num_available, 1);

    // Return frees the unit again
    let returned = console.return_equipment(&snapshot.checkouts[0]).await.unwrap();
    assert!(!returned.is_active);
    assert_eq!(console.snapshot().checkouts_len(), 0);

    services.catalog.refresh().await.unwrap();
    assert_eq!(quest_type(&app).num_available, 2);

    assert_eq!(
        messages(&mut notifications),
        vec![
            "Sally Student has checked out one Meta Quest 3".to_string(),
            "Sally Student has returned Meta Quest 3 with id 3".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_waiver_gate_then_sign() {
    let (app, backend, mut notifications) = app(BackendState::new(inventory(), profile(false))).await;
    let services = &app.services;

    services.equipment.load_profile().await.unwrap();
    services.catalog.refresh().await.unwrap();

    let outcome = services.checkout.request_checkout(&quest_type(&app)).await.unwrap();
    assert_eq!(outcome, CheckoutOutcome::WaiverRequired);
    assert!(backend.lock().unwrap().requests.is_empty());

    let err = services.checkout.sign_waiver(&WaiverForm::new("  ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(!backend.lock().unwrap().profile.signed_equipment_waiver);

    let signed = services
        .checkout
        .sign_waiver(&WaiverForm::new("Sally Student"))
        .await
        .unwrap();
    assert!(signed.has_signed_waiver());
    assert_eq!(signed.extra["onyen"], "sally");
    assert!(backend.lock().unwrap().profile.signed_equipment_waiver);

    let outcome = services.checkout.request_checkout(&quest_type(&app)).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Requested(_)));
    assert_eq!(backend.lock().unwrap().requests.len(), 1);

    assert_eq!(messages(&mut notifications), vec!["You may now checkout equipment!".to_string()]);
}

#[tokio::test]
async fn test_backend_waiver_rejection_maps_to_waiver_required() {
    // Stale local profile claims the waiver is signed; the backend disagrees
    let (app, _backend, mut notifications) = app(BackendState::new(inventory(), profile(false))).await;
    let services = &app.services;

    services.equipment.set_profile(profile(true)).await;
    services.catalog.refresh().await.unwrap();

    let outcome = services.checkout.request_checkout(&quest_type(&app)).await.unwrap();
    assert_eq!(outcome, CheckoutOutcome::WaiverRequired);
    assert!(messages(&mut notifications).is_empty());
}

#[tokio::test]
async fn test_duplicate_request_surfaces_backend_detail() {
    let (app, _backend, mut notifications) = app(BackendState::new(inventory(), profile(true))).await;
    let services = &app.services;

    services.equipment.load_profile().await.unwrap();
    services.catalog.refresh().await.unwrap();

    services.checkout.request_checkout(&quest_type(&app)).await.unwrap();
    let err = services.checkout.request_checkout(&quest_type(&app)).await.unwrap_err();

    assert_eq!(err.backend_kind(), Some(BackendErrorKind::Duplicate));
    assert_eq!(
        messages(&mut notifications),
        vec!["You already have an active checkout or checkout request for Meta Quest 3".to_string()]
    );
}

#[tokio::test]
async fn test_cancel_missing_request_still_notifies() {
    let (app, backend, mut notifications) = app(BackendState::new(inventory(), profile(true))).await;
    let services = &app.services;

    services.equipment.load_profile().await.unwrap();
    services.catalog.refresh().await.unwrap();
    let request = match services.checkout.request_checkout(&quest_type(&app)).await.unwrap() {
        CheckoutOutcome::Requested(request) => request,
        other => panic!("expected a submitted request, got {:?}", other),
    };

    backend.lock().unwrap().requests.clear();

    let err = services.ambassador.cancel(&request).await.unwrap_err();
    assert_eq!(err.backend_kind(), Some(BackendErrorKind::Unprocessable));
    assert_eq!(
        messages(&mut notifications),
        vec!["Canceled checkout request of Meta Quest 3 by Sally Student".to_string()]
    );
}

#[tokio::test]
async fn test_cancel_staged_request() {
    let (app, backend, mut notifications) = app(BackendState::new(inventory(), profile(true))).await;
    let services = &app.services;

    services.equipment.load_profile().await.unwrap();
    services.catalog.refresh().await.unwrap();
    let request = match services.checkout.request_checkout(&quest_type(&app)).await.unwrap() {
        CheckoutOutcome::Requested(request) => request,
        other => panic!("expected a submitted request, got {:?}", other),
    };

    let staged = services.ambassador.approve(&request).await.unwrap();
    services.ambassador.cancel_staged(&staged).await.unwrap();

    assert!(backend.lock().unwrap().staged.is_empty());
    assert_eq!(services.ambassador.snapshot().staged_len(), 0);
    assert_eq!(
        messages(&mut notifications),
        vec!["Canceled staged checkout request of Meta Quest 3 by Sally Student".to_string()]
    );
}

#[tokio::test]
async fn test_selection_outside_choices_is_rejected() {
    let (app, _backend, _notifications) = app(BackendState::new(inventory(), profile(true))).await;
    let services = &app.services;

    services.equipment.load_profile().await.unwrap();
    services.catalog.refresh().await.unwrap();
    let request = match services.checkout.request_checkout(&quest_type(&app)).await.unwrap() {
        CheckoutOutcome::Requested(request) => request,
        other => panic!("expected a submitted request, got {:?}", other),
    };
    services.ambassador.approve(&request).await.unwrap();

    // Unit 2 is already checked out so it was never offered
    let err = services.ambassador.select_unit(request.pid, QUEST, 2).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Selection survives a refresh
    services.ambassador.select_unit(request.pid, QUEST, 1).unwrap();
    services.ambassador.refresh_staged().await.unwrap();
    assert_eq!(services.ambassador.snapshot().staged[0].selection(), Some(1));
}

#[tokio::test]
async fn test_model_names_are_percent_encoded() {
    let (base_url, _backend) = fake_backend::spawn(BackendState::new(
        vec![unit(5, "Canon EOS R50 / Kit", false), unit(6, "Canon EOS R50", false)],
        profile(true),
    ))
    .await;

    let mut config = AppConfig::default();
    config.api.base_url = base_url;
    let repository = HttpRepository::new(&config.api).unwrap();

    let units = repository
        .get_equipment_for_request("Canon EOS R50 / Kit")
        .await
        .unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].equipment_id, 5);
}

#[tokio::test]
async fn test_bearer_token_forwarded() {
    let (app, backend, _notifications) = app(BackendState::new(inventory(), profile(true))).await;

    app.services.equipment.load_profile().await.unwrap();

    assert_eq!(
        backend.lock().unwrap().last_authorization.as_deref(),
        Some("Bearer test-token")
    );
}

#[tokio::test]
async fn test_condition_update_round_trips() {
    let (app, backend, _notifications) = app(BackendState::new(inventory(), profile(true))).await;

    let unit = app.services.equipment.update_condition(10, 6).await.unwrap();
    assert_eq!(unit.condition, 6);
    assert_eq!(
        backend
            .lock()
            .unwrap()
            .equipment
            .iter()
            .find(|e| e.equipment_id == 10)
            .map(|e| e.condition),
        Some(6)
    );

    let err = app.services.equipment.update_condition(99, 6).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
