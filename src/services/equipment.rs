//! Equipment service: the single entry point views use to reach the backend

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        CheckoutRequest, Equipment, EquipmentCheckout, EquipmentType, LifecycleEvent, Profile,
        RequestState, StagedCheckoutRequest,
    },
    repository::EquipmentRepository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Arc<dyn EquipmentRepository>,
    profile: Arc<RwLock<Option<Profile>>>,
    checkout_duration: Duration,
}

/// Check a lifecycle step before the backend call that performs it
pub(crate) fn transition(
    from: RequestState,
    event: LifecycleEvent,
    pid: i64,
    model: &str,
) -> AppResult<RequestState> {
    let to = from.apply(event)?;
    tracing::info!(pid, model, %from, %to, "Checkout lifecycle transition");
    Ok(to)
}

impl EquipmentService {
    pub fn new(repository: Arc<dyn EquipmentRepository>, checkout_duration: Duration) -> Self {
        Self {
            repository,
            profile: Arc::new(RwLock::new(None)),
            checkout_duration,
        }
    }

    pub fn checkout_duration(&self) -> Duration {
        self.checkout_duration
    }

    /// Fetch the current user's profile and keep it for later requests
    pub async fn load_profile(&self) -> AppResult<Profile> {
        let profile = self.repository.get_profile().await?;
        self.set_profile(profile.clone()).await;
        Ok(profile)
    }

    pub async fn set_profile(&self, profile: Profile) {
        *self.profile.write().await = Some(profile);
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }

    async fn require_profile(&self) -> AppResult<Profile> {
        self.profile()
            .await
            .ok_or_else(|| AppError::Authentication("Only allowed for logged in users.".to_string()))
    }

    pub async fn list_types(&self) -> AppResult<Vec<EquipmentType>> {
        self.repository.get_all_types().await
    }

    pub async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.repository.get_all_equipment().await
    }

    /// Units of `model` that can be assigned right now
    pub async fn available_units(&self, model: &str) -> AppResult<Vec<Equipment>> {
        let units = self.repository.get_equipment_for_request(model).await?;
        Ok(units
            .into_iter()
            .filter(|unit| unit.model == model && unit.is_available())
            .collect())
    }

    pub async fn list_requests(&self) -> AppResult<Vec<CheckoutRequest>> {
        self.repository.get_all_requests().await
    }

    pub async fn list_staged_requests(&self) -> AppResult<Vec<StagedCheckoutRequest>> {
        self.repository.get_all_staged_requests().await
    }

    pub async fn list_active_checkouts(&self) -> AppResult<Vec<EquipmentCheckout>> {
        self.repository.get_all_active_checkouts().await
    }

    /// Submit a checkout request for the logged-in user
    pub async fn add_request(&self, equipment_type: &EquipmentType) -> AppResult<CheckoutRequest> {
        let profile = self.require_profile().await?;
        let request = CheckoutRequest::for_profile(&profile, equipment_type);

        transition(RequestState::None, LifecycleEvent::Submit, request.pid, &request.model)?;
        self.repository.add_request(&request).await
    }

    /// Stage a request with every unit of its model that is free at this moment
    pub async fn approve_request(&self, request: &CheckoutRequest) -> AppResult<StagedCheckoutRequest> {
        transition(RequestState::Requested, LifecycleEvent::Approve, request.pid, &request.model)?;

        let id_choices = self
            .available_units(&request.model)
            .await?
            .into_iter()
            .map(|unit| unit.equipment_id)
            .collect();
        let staged = StagedCheckoutRequest::from_request(request, id_choices);

        self.repository.create_staged_request(&staged).await
    }

    pub async fn delete_request(&self, request: &CheckoutRequest) -> AppResult<()> {
        self.repository.delete_request(request).await
    }

    /// Check out the staged request's selected unit starting now
    pub async fn create_checkout(&self, staged: &StagedCheckoutRequest) -> AppResult<EquipmentCheckout> {
        self.create_checkout_at(staged, Utc::now()).await
    }

    pub async fn create_checkout_at(
        &self,
        staged: &StagedCheckoutRequest,
        started_at: DateTime<Utc>,
    ) -> AppResult<EquipmentCheckout> {
        let checkout = EquipmentCheckout::from_staged(staged, started_at, self.checkout_duration)?;

        transition(RequestState::Staged, LifecycleEvent::Finalize, checkout.pid, &checkout.model)?;
        self.repository.create_checkout(&checkout).await
    }

    pub async fn delete_staged_request(&self, staged: &StagedCheckoutRequest) -> AppResult<()> {
        self.repository.delete_staged_request(staged).await
    }

    pub async fn return_checkout(&self, checkout: &EquipmentCheckout) -> AppResult<EquipmentCheckout> {
        transition(checkout.state(), LifecycleEvent::Return, checkout.pid, &checkout.model)?;
        self.repository.return_checkout(checkout).await
    }

    /// Record that the logged-in user signed the liability waiver
    pub async fn update_waiver_field(&self) -> AppResult<Profile> {
        let mut profile = self.require_profile().await?;
        profile.signed_equipment_waiver = true;

        let updated = self.repository.update_waiver_field(&profile).await?;
        self.set_profile(updated.clone()).await;
        Ok(updated)
    }

    /// Set the condition score of one unit
    pub async fn update_condition(&self, equipment_id: i32, condition: i32) -> AppResult<Equipment> {
        if !(0..=Equipment::MAX_CONDITION).contains(&condition) {
            return Err(AppError::Validation(format!(
                "condition must be between 0 and {}, got {}",
                Equipment::MAX_CONDITION,
                condition
            )));
        }

        let mut unit = self
            .repository
            .get_all_equipment()
            .await?
            .into_iter()
            .find(|unit| unit.equipment_id == equipment_id)
            .ok_or_else(|| AppError::NotFound(format!("No equipment with id {}", equipment_id)))?;

        unit.condition = condition;
        self.repository.update_equipment(&unit).await
    }
}
