//! Staged (approved) checkout request model

use serde::{Deserialize, Serialize};

use super::checkout_request::CheckoutRequest;
use crate::error::{AppError, AppResult};

/// An approved request waiting for an ambassador to assign a concrete unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedCheckoutRequest {
    pub user_name: String,
    pub model: String,
    /// Unit ids that were available when the request was approved
    #[serde(default, deserialize_with = "nullable_ids")]
    pub id_choices: Vec<i32>,
    /// Unit picked by the ambassador
    #[serde(default)]
    pub selected_id: Option<i32>,
    pub pid: i64,
}

fn nullable_ids<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<i32>>::deserialize(deserializer)?.unwrap_or_default())
}

impl StagedCheckoutRequest {
    pub fn from_request(request: &CheckoutRequest, id_choices: Vec<i32>) -> Self {
        Self {
            user_name: request.user_name.clone(),
            model: request.model.clone(),
            id_choices,
            selected_id: None,
            pid: request.pid,
        }
    }

    /// Record the ambassador's unit choice
    pub fn select_id(&mut self, id: i32) -> AppResult<()> {
        if !self.id_choices.contains(&id) {
            return Err(AppError::Validation(format!(
                "unit {} is not one of the choices for {}'s {} request ({:?})",
                id, self.user_name, self.model, self.id_choices
            )));
        }
        self.selected_id = Some(id);
        Ok(())
    }

    /// Selected unit, if one was chosen and it is still a valid choice
    pub fn selection(&self) -> Option<i32> {
        self.selected_id.filter(|id| self.id_choices.contains(id))
    }

    pub fn matches(&self, pid: i64, model: &str) -> bool {
        self.pid == pid && self.model == model
    }
}
