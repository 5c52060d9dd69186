//! Checkout request lifecycle
//!
//! ```text
//! None -> Requested -> Staged -> Active -> Returned
//!            |           |
//!            +-----------+--> Cancelled
//! ```
//!
//! The backend owns the records; these states only guard the calls the client
//! is about to make. There are no backward transitions.

use std::fmt;

use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    None,
    Requested,
    Staged,
    Active,
    Returned,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// User submits a checkout request
    Submit,
    /// Ambassador approves the request, producing a staged request
    Approve,
    /// Ambassador assigns a unit and creates the checkout
    Finalize,
    /// Unit comes back
    Return,
    /// Request or staged request is dropped
    Cancel,
}

impl RequestState {
    /// Next state for `event`, or an error when the event is not allowed here
    pub fn apply(self, event: LifecycleEvent) -> AppResult<RequestState> {
        use LifecycleEvent::*;
        use RequestState::*;

        match (self, event) {
            (None, Submit) => Ok(Requested),
            (Requested, Approve) => Ok(Staged),
            (Staged, Finalize) => Ok(Active),
            (Active, Return) => Ok(Returned),
            (Requested, Cancel) | (Staged, Cancel) => Ok(Cancelled),
            (state, event) => Err(AppError::InvalidTransition(format!(
                "cannot {} a {} checkout",
                event, state
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Returned | RequestState::Cancelled)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::None => "new",
            RequestState::Requested => "requested",
            RequestState::Staged => "staged",
            RequestState::Active => "active",
            RequestState::Returned => "returned",
            RequestState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleEvent::Submit => "submit",
            LifecycleEvent::Approve => "approve",
            LifecycleEvent::Finalize => "finalize",
            LifecycleEvent::Return => "return",
            LifecycleEvent::Cancel => "cancel",
        };
        f.write_str(name)
    }
}
