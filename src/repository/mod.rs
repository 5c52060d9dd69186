//! Repository layer: access to the remote equipment API
//!
//! Every method maps to exactly one backend endpoint. Nothing is cached,
//! retried or batched here.

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        CheckoutRequest, Equipment, EquipmentCheckout, EquipmentType, Profile,
        StagedCheckoutRequest,
    },
};

pub use http::HttpRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    /// Equipment types with availability counts
    async fn get_all_types(&self) -> AppResult<Vec<EquipmentType>>;

    /// Every equipment unit
    async fn get_all_equipment(&self) -> AppResult<Vec<Equipment>>;

    async fn update_equipment(&self, item: &Equipment) -> AppResult<Equipment>;

    async fn add_request(&self, request: &CheckoutRequest) -> AppResult<CheckoutRequest>;

    async fn delete_request(&self, request: &CheckoutRequest) -> AppResult<()>;

    async fn get_all_requests(&self) -> AppResult<Vec<CheckoutRequest>>;

    async fn create_staged_request(
        &self,
        staged: &StagedCheckoutRequest,
    ) -> AppResult<StagedCheckoutRequest>;

    /// Units of `model` that are not checked out
    async fn get_equipment_for_request(&self, model: &str) -> AppResult<Vec<Equipment>>;

    /// Mark the profile's waiver as signed, returns the updated profile
    async fn update_waiver_field(&self, profile: &Profile) -> AppResult<Profile>;

    async fn get_all_staged_requests(&self) -> AppResult<Vec<StagedCheckoutRequest>>;

    async fn delete_staged_request(&self, staged: &StagedCheckoutRequest) -> AppResult<()>;

    async fn get_all_active_checkouts(&self) -> AppResult<Vec<EquipmentCheckout>>;

    async fn create_checkout(&self, checkout: &EquipmentCheckout) -> AppResult<EquipmentCheckout>;

    /// Mark the checkout inactive and free its unit
    async fn return_checkout(&self, checkout: &EquipmentCheckout) -> AppResult<EquipmentCheckout>;

    /// Profile of the user the token belongs to
    async fn get_profile(&self) -> AppResult<Profile>;
}
