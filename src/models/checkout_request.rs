//! Pending checkout request model

use serde::{Deserialize, Serialize};

use super::{equipment::EquipmentType, profile::Profile};

/// A user's request to check out one unit of a model, before approval.
/// The backend identifies it by `pid` and `model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub user_name: String,
    pub model: String,
    pub pid: i64,
}

impl CheckoutRequest {
    pub fn for_profile(profile: &Profile, equipment_type: &EquipmentType) -> Self {
        Self {
            user_name: profile.full_name(),
            model: equipment_type.model.clone(),
            pid: profile.pid,
        }
    }

    pub fn matches(&self, pid: i64, model: &str) -> bool {
        self.pid == pid && self.model == model
    }
}
