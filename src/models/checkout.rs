//! Equipment checkout model

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lifecycle::RequestState, staged_request::StagedCheckoutRequest};
use crate::error::{AppError, AppResult};

/// Active or historical checkout of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCheckout {
    pub user_name: String,
    pub pid: i64,
    pub equipment_id: i32,
    pub model: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(deserialize_with = "timestamp")]
    pub started_at: DateTime<Utc>,
    /// Due date while active, return time once returned
    #[serde(deserialize_with = "timestamp")]
    pub end_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// RFC 3339, or a naive timestamp taken as UTC (the backend stores naive times)
fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

impl EquipmentCheckout {
    /// Turn a staged request into a checkout of its selected unit
    pub fn from_staged(
        staged: &StagedCheckoutRequest,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> AppResult<Self> {
        let equipment_id = staged.selection().ok_or_else(|| {
            AppError::Validation(format!(
                "select a unit from {:?} before checking out {} to {}",
                staged.id_choices, staged.model, staged.user_name
            ))
        })?;

        Ok(Self {
            user_name: staged.user_name.clone(),
            pid: staged.pid,
            equipment_id,
            model: staged.model.clone(),
            is_active: true,
            started_at,
            end_at: started_at + duration,
        })
    }

    pub fn state(&self) -> RequestState {
        if self.is_active {
            RequestState::Active
        } else {
            RequestState::Returned
        }
    }

    /// Informational; nothing enforces the due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now > self.end_at
    }
}
