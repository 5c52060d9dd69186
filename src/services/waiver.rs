//! Checkout request flow and the liability waiver gate

use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use super::{
    equipment::EquipmentService,
    notifications::{Notification, Notifier},
};
use crate::{
    error::{AppResult, BackendErrorKind},
    models::{CheckoutRequest, EquipmentType, Profile, WaiverForm},
};

/// Result of asking to check out an equipment type
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Request submitted, waiting for an ambassador
    Requested(CheckoutRequest),
    /// The user has to sign the waiver first
    WaiverRequired,
}

#[derive(Clone)]
pub struct CheckoutFlow {
    equipment: EquipmentService,
    notifier: Arc<dyn Notifier>,
    notification_duration: Duration,
}

impl CheckoutFlow {
    pub fn new(
        equipment: EquipmentService,
        notifier: Arc<dyn Notifier>,
        notification_duration: Duration,
    ) -> Self {
        Self {
            equipment,
            notifier,
            notification_duration,
        }
    }

    fn notify(&self, message: String) {
        self.notifier.notify(Notification {
            message,
            duration: self.notification_duration,
        });
    }

    pub async fn request_checkout(&self, equipment_type: &EquipmentType) -> AppResult<CheckoutOutcome> {
        let signed = self
            .equipment
            .profile()
            .await
            .map(|profile| profile.has_signed_waiver());

        if signed == Some(false) {
            tracing::info!(model = %equipment_type.model, "Waiver not signed, checkout request held back");
            return Ok(CheckoutOutcome::WaiverRequired);
        }

        match self.equipment.add_request(equipment_type).await {
            Ok(request) => {
                tracing::info!(pid = request.pid, model = %request.model, "Checkout request submitted");
                Ok(CheckoutOutcome::Requested(request))
            }
            Err(e) if e.backend_kind() == Some(BackendErrorKind::WaiverNotSigned) => {
                Ok(CheckoutOutcome::WaiverRequired)
            }
            Err(e) => {
                if e.backend_kind().is_some() {
                    self.notify(e.user_message());
                } else {
                    tracing::error!("Failed to submit checkout request: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Sign the waiver for the logged-in user
    pub async fn sign_waiver(&self, form: &WaiverForm) -> AppResult<Profile> {
        form.validate()?;

        let profile = self.equipment.update_waiver_field().await.map_err(|e| {
            tracing::error!("Failed to record signed waiver: {}", e);
            e
        })?;

        self.notify("You may now checkout equipment!".to_string());
        Ok(profile)
    }
}
