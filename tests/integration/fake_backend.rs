//! In-process equipment API used by the integration tests

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use equipment_checkout::models::{
    CheckoutRequest, Equipment, EquipmentCheckout, EquipmentType, Profile, StagedCheckoutRequest,
};

pub struct BackendState {
    pub equipment: Vec<Equipment>,
    pub requests: Vec<CheckoutRequest>,
    pub staged: Vec<StagedCheckoutRequest>,
    pub checkouts: Vec<EquipmentCheckout>,
    pub profile: Profile,
    pub last_authorization: Option<String>,
}

pub type Shared = Arc<Mutex<BackendState>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn error(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail.into() })))
}

pub fn unit(equipment_id: i32, model: &str, is_checked_out: bool) -> Equipment {
    Equipment {
        id: Some(equipment_id),
        equipment_id,
        model: model.to_string(),
        equipment_image: format!("https://img.example/{}.png", model.replace(' ', "-")),
        condition: 10,
        is_checked_out,
        condition_notes: vec![],
        checkout_history: vec![],
    }
}

pub fn profile(signed: bool) -> Profile {
    serde_json::from_value(json!({
        "id": 1,
        "pid": 730000000,
        "onyen": "sally",
        "first_name": "Sally",
        "last_name": "Student",
        "email": "sally@example.edu",
        "signed_equipment_wavier": signed
    }))
    .unwrap()
}

impl BackendState {
    pub fn new(equipment: Vec<Equipment>, profile: Profile) -> Self {
        Self {
            equipment,
            requests: vec![],
            staged: vec![],
            checkouts: vec![],
            profile,
            last_authorization: None,
        }
    }
}

/// Serve the fake API on an ephemeral port; returns its base URL
pub async fn spawn(state: BackendState) -> (String, Shared) {
    let shared = Arc::new(Mutex::new(state));
    let app = router(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), shared)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/equipment/get_all", get(get_all))
        .route("/api/equipment/update", put(update))
        .route("/api/equipment/get_all_types", get(get_all_types))
        .route("/api/equipment/add_request", post(add_request))
        .route("/api/equipment/delete_request", delete(delete_request))
        .route("/api/equipment/get_all_requests", get(get_all_requests))
        .route(
            "/api/equipment/get_equipment_for_request/:model",
            get(get_equipment_for_request),
        )
        .route("/api/equipment/update_waiver_field", put(update_waiver_field))
        .route("/api/equipment/get_all_staged_requests", get(get_all_staged_requests))
        .route("/api/equipment/create_staged_request", post(create_staged_request))
        .route("/api/equipment/delete_staged_request", delete(delete_staged_request))
        .route("/api/equipment/get_all_active_checkouts", get(get_all_active_checkouts))
        .route("/api/equipment/create_checkout", post(create_checkout))
        .route("/api/equipment/return_checkout", put(return_checkout))
        .with_state(state)
}

async fn get_profile(State(state): State<Shared>, headers: HeaderMap) -> Json<Profile> {
    let mut state = state.lock().unwrap();
    state.last_authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(state.profile.clone())
}

async fn get_all(State(state): State<Shared>) -> Json<Vec<Equipment>> {
    Json(state.lock().unwrap().equipment.clone())
}

async fn update(State(state): State<Shared>, Json(item): Json<Equipment>) -> ApiResult<Equipment> {
    let mut state = state.lock().unwrap();
    let existing = state
        .equipment
        .iter_mut()
        .find(|e| e.equipment_id == item.equipment_id)
        .ok_or_else(|| {
            error(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("No Equipment found matching equipment_id: {}", item.equipment_id),
            )
        })?;
    *existing = item.clone();
    Ok(Json(item))
}

async fn get_all_types(State(state): State<Shared>) -> Json<Vec<EquipmentType>> {
    Json(EquipmentType::from_units(&state.lock().unwrap().equipment))
}

async fn add_request(
    State(state): State<Shared>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<CheckoutRequest> {
    let mut state = state.lock().unwrap();
    if !state.profile.signed_equipment_waiver {
        return Err(error(
            StatusCode::from_u16(451).unwrap(),
            "You must sign the liability waiver before you can request an equipment checkout",
        ));
    }

    let duplicate = state.requests.iter().any(|r| r.matches(request.pid, &request.model))
        || state.staged.iter().any(|s| s.matches(request.pid, &request.model))
        || state
            .checkouts
            .iter()
            .any(|c| c.is_active && c.pid == request.pid && c.model == request.model);
    if duplicate {
        return Err(error(
            StatusCode::FORBIDDEN,
            format!(
                "You already have an active checkout or checkout request for {}",
                request.model
            ),
        ));
    }

    state.requests.push(request.clone());
    Ok(Json(request))
}

async fn delete_request(
    State(state): State<Shared>,
    Json(request): Json<CheckoutRequest>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut state = state.lock().unwrap();
    let before = state.requests.len();
    state.requests.retain(|r| !r.matches(request.pid, &request.model));
    if state.requests.len() == before {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Could not find request: {:?}", request),
        ));
    }
    Ok(StatusCode::OK)
}

async fn get_all_requests(State(state): State<Shared>) -> Json<Vec<CheckoutRequest>> {
    Json(state.lock().unwrap().requests.clone())
}

async fn get_equipment_for_request(
    State(state): State<Shared>,
    Path(model): Path<String>,
) -> Json<Vec<Equipment>> {
    let state = state.lock().unwrap();
    Json(
        state
            .equipment
            .iter()
            .filter(|e| e.model == model && !e.is_checked_out)
            .cloned()
            .collect(),
    )
}

async fn update_waiver_field(
    State(state): State<Shared>,
    Json(mut profile): Json<Profile>,
) -> ApiResult<Profile> {
    let mut state = state.lock().unwrap();
    if profile.pid != state.profile.pid {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Could not find user {}", profile.full_name()),
        ));
    }
    profile.signed_equipment_waiver = true;
    state.profile = profile.clone();
    Ok(Json(profile))
}

async fn get_all_staged_requests(State(state): State<Shared>) -> Json<Vec<StagedCheckoutRequest>> {
    Json(state.lock().unwrap().staged.clone())
}

async fn create_staged_request(
    State(state): State<Shared>,
    Json(staged): Json<StagedCheckoutRequest>,
) -> Json<StagedCheckoutRequest> {
    let mut state = state.lock().unwrap();
    let staged = StagedCheckoutRequest {
        selected_id: None,
        ..staged
    };
    state.staged.push(staged.clone());
    Json(staged)
}

async fn delete_staged_request(
    State(state): State<Shared>,
    Json(staged): Json<StagedCheckoutRequest>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut state = state.lock().unwrap();
    let before = state.staged.len();
    state.staged.retain(|s| !s.matches(staged.pid, &staged.model));
    if state.staged.len() == before {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Could not find staged checkout request: {:?}", staged),
        ));
    }
    Ok(StatusCode::OK)
}

async fn get_all_active_checkouts(State(state): State<Shared>) -> Json<Vec<EquipmentCheckout>> {
    let state = state.lock().unwrap();
    Json(state.checkouts.iter().filter(|c| c.is_active).cloned().collect())
}

async fn create_checkout(
    State(state): State<Shared>,
    Json(checkout): Json<EquipmentCheckout>,
) -> ApiResult<EquipmentCheckout> {
    let mut state = state.lock().unwrap();
    let unit = state
        .equipment
        .iter_mut()
        .find(|e| e.equipment_id == checkout.equipment_id)
        .ok_or_else(|| {
            error(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("No Equipment found matching equipment_id: {}", checkout.equipment_id),
            )
        })?;
    if unit.is_checked_out {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Equipment item with id: {} is already checkout out", unit.equipment_id),
        ));
    }
    unit.is_checked_out = true;
    state.checkouts.push(checkout.clone());
    Ok(Json(checkout))
}

async fn return_checkout(
    State(state): State<Shared>,
    Json(checkout): Json<EquipmentCheckout>,
) -> ApiResult<EquipmentCheckout> {
    let mut state = state.lock().unwrap();
    if !checkout.is_active {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The equipment you are trying to return is not checked out",
        ));
    }

    if let Some(unit) = state
        .equipment
        .iter_mut()
        .find(|e| e.equipment_id == checkout.equipment_id)
    {
        unit.is_checked_out = false;
    }

    let row = state
        .checkouts
        .iter_mut()
        .find(|c| c.is_active && c.equipment_id == checkout.equipment_id)
        .ok_or_else(|| {
            error(
                StatusCode::NOT_FOUND,
                format!(
                    "Could not find active checkout for equipment item with id: {}",
                    checkout.equipment_id
                ),
            )
        })?;
    row.is_active = false;
    row.end_at = Utc::now();
    Ok(Json(row.clone()))
}
