//! Data models mirroring the equipment API records

pub mod checkout;
pub mod checkout_request;
pub mod equipment;
pub mod lifecycle;
pub mod profile;
pub mod staged_request;

// Re-export commonly used types
pub use checkout::EquipmentCheckout;
pub use checkout_request::CheckoutRequest;
pub use equipment::{Equipment, EquipmentType};
pub use lifecycle::{LifecycleEvent, RequestState};
pub use profile::{Profile, WaiverForm};
pub use staged_request::StagedCheckoutRequest;
