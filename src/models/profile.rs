//! Current user profile and waiver form

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile of the logged-in user.
///
/// Fields the client does not use are kept in `extra` so that the profile can
/// be sent back unchanged when the waiver flag is updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub pid: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "signed_equipment_wavier", default)]
    pub signed_equipment_waiver: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Profile {
    /// Name recorded on checkout requests
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_signed_waiver(&self) -> bool {
        self.signed_equipment_waiver
    }
}

/// Liability waiver form; the signature is required.
///
/// Only built through `new`, which trims the signature, so a blank signature
/// always fails validation.
#[derive(Debug, Clone, Validate)]
pub struct WaiverForm {
    #[validate(length(min = 1, message = "signature is required"))]
    signature: String,
}

impl WaiverForm {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into().trim().to_string(),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}
