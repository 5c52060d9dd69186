//! Equipment unit and equipment type models

use serde::{Deserialize, Serialize};

/// One physical equipment unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    /// Row id, not always sent by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Unit id shown to ambassadors and used for checkouts
    pub equipment_id: i32,
    pub model: String,
    pub equipment_image: String,
    /// Condition score from 0 (broken) to 10 (new)
    #[serde(default = "default_condition")]
    pub condition: i32,
    #[serde(default)]
    pub is_checked_out: bool,
    #[serde(default)]
    pub condition_notes: Vec<String>,
    /// PIDs of past borrowers
    #[serde(default)]
    pub checkout_history: Vec<i64>,
}

fn default_condition() -> i32 {
    Equipment::MAX_CONDITION
}

impl Equipment {
    pub const MAX_CONDITION: i32 = 10;

    pub fn is_available(&self) -> bool {
        !self.is_checked_out
    }
}

/// Equipment model with the number of units currently available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub model: String,
    pub num_available: i32,
    #[serde(rename = "equipment_img_URL")]
    pub equipment_img_url: String,
}

impl EquipmentType {
    /// Aggregate units into types, in order of first appearance.
    /// The first unit of a model provides the image.
    pub fn from_units(units: &[Equipment]) -> Vec<EquipmentType> {
        let mut types: Vec<EquipmentType> = Vec::new();

        for unit in units {
            let available = if unit.is_available() { 1 } else { 0 };
            match types.iter_mut().find(|t| t.model == unit.model) {
                Some(existing) => existing.num_available += available,
                None => types.push(EquipmentType {
                    model: unit.model.clone(),
                    num_available: available,
                    equipment_img_url: unit.equipment_image.clone(),
                }),
            }
        }

        types
    }

    pub fn is_available(&self) -> bool {
        self.num_available > 0
    }
}
